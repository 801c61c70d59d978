//! Archive decoding tests
//!
//! Whole-archive splitting and decoding, including pages whose charset is
//! missing or wrong.

mod test_charsets;
