//! WARC container decoding.
//!
//! Turns the decompressed bytes of one archive into structured records:
//!
//! - **splitter**: cuts the buffer into record spans at each version marker
//! - **encoding**: recovers text from bytes with unreliable charsets
//! - **record**: parses a span's header blocks and content
//!
//! The parser targets the ClueWeb12 dialect (a WARC header block, an HTTP
//! header block and the page body, separated by blank lines). It is not a
//! general WARC implementation.

pub mod encoding;
pub mod record;
pub mod splitter;

pub use encoding::{Decoded, EncodingAttempt, EncodingResolver, EncodingSource};
pub use record::{HeaderGroups, RecordDecoder, WarcDocument};
pub use splitter::{RecordSpans, WarcContainer};
