//! Loading configuration files.

use std::fs;

use ntest::timeout;
use tag_file::{BasicTag, MemoryFileSystem, TagError, TagFile, TagFileConfig};
use tempfile::tempdir;

#[timeout(1000)]
#[test]
fn test_load_partial_config_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("tagging.json");
    fs::write(&path, r#"{ "copy_chunk_size": 512, "sync_on_rewrite": false }"#)?;

    let config = TagFileConfig::load(&path)?;
    assert_eq!(config.copy_chunk_size, 512);
    assert!(!config.sync_on_rewrite);
    assert_eq!(config.temp_suffix_len, TagFileConfig::default().temp_suffix_len);

    let tag = TagFile::with_file_system(BasicTag::new(), MemoryFileSystem::new(), config)?;
    assert_eq!(tag.config().copy_chunk_size, 512);
    Ok(())
}

#[timeout(1000)]
#[test]
fn test_invalid_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tagging.json");
    fs::write(&path, r#"{ "copy_chunk_size": 0 }"#).unwrap();
    assert!(matches!(
        TagFileConfig::load(&path),
        Err(TagError::InvalidConfig(_))
    ));
    assert!(matches!(
        TagFileConfig::load(dir.path().join("missing.json")),
        Err(TagError::InvalidConfig(_))
    ));
}
