//! Integration tests for tag persistence on the real filesystem.
//!
//! 1. Update and strip round trips through temporary directories
//! 2. Configuration files

pub mod config_tests;
pub mod file_tests;
