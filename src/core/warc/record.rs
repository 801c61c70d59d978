//! Record decoder.
//!
//! A ClueWeb12 response record is three blocks separated by blank lines:
//!
//! ```text
//! WARC/1.0
//! WARC-Type: response
//! WARC-Target-URI: http://example.com/
//! WARC-TREC-ID: clueweb12-0000tw-00-00001
//!
//! HTTP/1.1 200 OK
//! Content-Type: text/html; charset=UTF-8
//!
//! <html>...</html>
//! ```
//!
//! Header lines are grouped into named sections. The section name comes
//! from the last `name/metadata` marker line seen (`WARC/1.0` opens
//! `WARC`, `HTTP/1.1 200 OK` opens `HTTP`), and keys seen before any
//! marker land in `_meta`.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::core::error::{Result, WarcdexError};
use crate::core::warc::encoding::{DecodeInput, EncodingResolver};

/// Section used for keys that precede any marker line
pub const DEFAULT_SECTION: &str = "_meta";

/// Section opened by the `WARC/<version>` line
pub const WARC_SECTION: &str = "WARC";

/// Synthetic key holding the status code of an embedded HTTP status line
pub const RESP_CODE_KEY: &str = "resp_code";

const ID_KEY: &str = "WARC_TREC_ID";
const URL_KEY: &str = "WARC_Target_URI";

// Regex patterns compiled once at startup
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").unwrap());

static STATUS_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d\.\d \d+ \w+").unwrap());

/// Header key/value pairs of one section
pub type HeaderSection = BTreeMap<String, String>;

/// Header sections of a record, keyed by section name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderGroups(BTreeMap<String, HeaderSection>);

impl HeaderGroups {
    /// Look up a key in a section
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.0
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }

    /// One section, if any key was assigned to it
    pub fn section(&self, name: &str) -> Option<&HeaderSection> {
        self.0.get(name)
    }

    /// Names of all sections that received at least one key
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn insert(&mut self, section: &str, key: String, value: String) {
        self.0
            .entry(section.to_string())
            .or_default()
            .insert(key, value);
    }

    /// Parse one header block into sections
    ///
    /// Lines that are neither `key: value` nor a `name/metadata` marker
    /// are ignored.
    pub fn parse_block(&mut self, block: &str) {
        let mut section = DEFAULT_SECTION.to_string();

        for line in block.trim().split('\n') {
            if let Some((key, value)) = line.split_once(": ") {
                self.insert(&section, sanitize(key), value.to_string());
                continue;
            }

            match line.split_once('/') {
                Some((name, metadata)) if !metadata.contains('/') => {
                    section = sanitize(name);
                    if STATUS_LINE.is_match(metadata) {
                        if let Some(code) = metadata.split_whitespace().nth(1) {
                            self.insert(&section, RESP_CODE_KEY.to_string(), code.to_string());
                        }
                    }
                }
                _ => {
                    tracing::trace!("Ignoring malformed header line: {:?}", line);
                }
            }
        }
    }

    /// Value from the WARC section, falling back to `_meta`
    fn record_field(&self, key: &str) -> Option<&str> {
        self.get(WARC_SECTION, key)
            .or_else(|| self.get(DEFAULT_SECTION, key))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Replace runs of non-word characters with `_`
fn sanitize(name: &str) -> String {
    NON_WORD.replace_all(name, "_").into_owned()
}

/// A decoded archive record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarcDocument {
    /// Stable record identifier (`WARC-TREC-ID`)
    pub id: String,

    /// Source URL (`WARC-Target-URI`)
    pub url: String,

    /// Decoded, trimmed page content; may be empty
    pub raw_content: String,

    /// Every header section seen in the record
    pub header_groups: HeaderGroups,
}

impl WarcDocument {
    /// HTTP status code from the embedded status line
    pub fn response_code(&self) -> Option<&str> {
        self.header_groups.get("HTTP", RESP_CODE_KEY)
    }

    pub fn has_content(&self) -> bool {
        !self.raw_content.is_empty()
    }
}

/// Decodes normalized record spans into documents
#[derive(Default)]
pub struct RecordDecoder {
    resolver: EncodingResolver,
}

impl RecordDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(resolver: EncodingResolver) -> Self {
        Self { resolver }
    }

    /// Decode one record span
    ///
    /// Fails with a record-level error when the span lacks its header
    /// blocks or its `id`/`url`.
    pub fn decode(&self, span: &[u8]) -> Result<WarcDocument> {
        let (warc_header, rest) = split_block(span).ok_or_else(|| {
            WarcdexError::MalformedRecord("no blank line after WARC header".to_string())
        })?;
        let (http_header, content) = split_block(rest).ok_or_else(|| {
            WarcdexError::MalformedRecord("no blank line after HTTP header".to_string())
        })?;

        let mut header_groups = HeaderGroups::default();
        header_groups.parse_block(&String::from_utf8_lossy(warc_header));
        header_groups.parse_block(&String::from_utf8_lossy(http_header));

        let id = header_groups
            .record_field(ID_KEY)
            .ok_or(WarcdexError::MissingField("id"))?
            .to_string();
        let url = header_groups
            .record_field(URL_KEY)
            .ok_or(WarcdexError::MissingField("url"))?
            .to_string();

        let decoded = self.resolver.resolve(DecodeInput {
            bytes: content,
            declared_in: span,
        });
        tracing::trace!(
            "Decoded {} via {:?} after {} attempt(s)",
            id,
            decoded.source(),
            decoded.attempts.len()
        );

        Ok(WarcDocument {
            id,
            url,
            raw_content: decoded.text.trim().to_string(),
            header_groups,
        })
    }
}

/// Split at the first blank line
fn split_block(bytes: &[u8]) -> Option<(&[u8], &[u8])> {
    let pos = bytes.windows(2).position(|w| w == b"\n\n")?;
    Some((&bytes[..pos], &bytes[pos + 2..]))
}
