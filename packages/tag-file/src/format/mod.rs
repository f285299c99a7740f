//! On-disk layout of the prepended header and the appended trailer.

mod header;
mod trailer;

pub use header::{PrependedHeader, FOOTER_FLAG, HEADER_LEN, MAX_PAYLOAD_SIZE};
pub use trailer::{has_trailer_marker, TrailerFields, TRAILER_LEN, TRAILER_MARKER};
