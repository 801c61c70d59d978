//! Encoding resolution for record content.
//!
//! Crawl pages rarely declare their charset correctly, so decoding is an
//! ordered chain of strategies where the first success wins:
//!
//! 1. the `charset=` token declared in the record (HTTP header or meta tag)
//! 2. a statistical guess from the content itself
//! 3. UTF-8 with undecodable sequences dropped
//!
//! The last step cannot fail, so resolution always produces text.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use serde::Serialize;

static CHARSET_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([a-z0-9_-]+)"#).unwrap());

/// Where the encoding used for a decode came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingSource {
    Declared,
    Detected,
    Fallback,
}

/// One step of the resolution chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodingAttempt {
    pub source: EncodingSource,
    /// Encoding that was tried, if the strategy got as far as choosing one
    pub encoding: Option<String>,
    pub succeeded: bool,
}

/// Decoded text plus the attempts that led to it
#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    pub attempts: Vec<EncodingAttempt>,
}

impl Decoded {
    /// Source of the attempt that produced `text`
    pub fn source(&self) -> EncodingSource {
        self.attempts
            .last()
            .map(|a| a.source)
            .unwrap_or(EncodingSource::Fallback)
    }
}

/// Bytes to decode, and where to look for a charset declaration
#[derive(Debug, Clone, Copy)]
pub struct DecodeInput<'a> {
    pub bytes: &'a [u8],
    pub declared_in: &'a [u8],
}

/// A fallible decoding strategy
pub trait DecodeStrategy: Send + Sync {
    fn source(&self) -> EncodingSource;

    /// Encoding this strategy would use for the input
    fn choose(&self, input: &DecodeInput<'_>) -> Option<&'static Encoding>;
}

/// Uses the first `charset=<token>` found in the record
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclaredCharset;

impl DeclaredCharset {
    /// The raw declared label, if any
    pub fn declared_label(bytes: &[u8]) -> Option<&[u8]> {
        CHARSET_TOKEN
            .captures(bytes)
            .and_then(|c| c.get(1))
            .map(|m| m.as_bytes())
    }
}

impl DecodeStrategy for DeclaredCharset {
    fn source(&self) -> EncodingSource {
        EncodingSource::Declared
    }

    fn choose(&self, input: &DecodeInput<'_>) -> Option<&'static Encoding> {
        let label = Self::declared_label(input.declared_in)?;
        let encoding = Encoding::for_label(label);
        if encoding.is_none() {
            tracing::debug!(
                "Unknown declared charset '{}'",
                String::from_utf8_lossy(label)
            );
        }
        encoding
    }
}

/// Guesses the encoding from byte statistics
#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticalDetector;

impl DecodeStrategy for StatisticalDetector {
    fn source(&self) -> EncodingSource {
        EncodingSource::Detected
    }

    fn choose(&self, input: &DecodeInput<'_>) -> Option<&'static Encoding> {
        let mut detector = EncodingDetector::new();
        detector.feed(input.bytes, true);
        Some(detector.guess(None, true))
    }
}

/// Stateless resolver running the strategy chain
pub struct EncodingResolver {
    strategies: Vec<Box<dyn DecodeStrategy>>,
}

impl Default for EncodingResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodingResolver {
    /// Declared charset, then statistical detection, then lossy UTF-8
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(DeclaredCharset),
            Box::new(StatisticalDetector),
        ])
    }

    /// Custom chain; lossy UTF-8 is always appended as the final step
    pub fn with_strategies(strategies: Vec<Box<dyn DecodeStrategy>>) -> Self {
        Self { strategies }
    }

    /// Decode bytes, looking for a charset declaration in the bytes themselves
    pub fn decode(&self, bytes: &[u8]) -> Decoded {
        self.resolve(DecodeInput {
            bytes,
            declared_in: bytes,
        })
    }

    /// Run the chain; never fails
    pub fn resolve(&self, input: DecodeInput<'_>) -> Decoded {
        let mut attempts = Vec::with_capacity(self.strategies.len() + 1);

        for strategy in &self.strategies {
            let Some(encoding) = strategy.choose(&input) else {
                attempts.push(EncodingAttempt {
                    source: strategy.source(),
                    encoding: None,
                    succeeded: false,
                });
                continue;
            };

            let text = decode_strict(encoding, input.bytes);
            attempts.push(EncodingAttempt {
                source: strategy.source(),
                encoding: Some(encoding.name().to_string()),
                succeeded: text.is_some(),
            });

            if let Some(text) = text {
                return Decoded { text, attempts };
            }
        }

        attempts.push(EncodingAttempt {
            source: EncodingSource::Fallback,
            encoding: Some(encoding_rs::UTF_8.name().to_string()),
            succeeded: true,
        });
        Decoded {
            text: decode_utf8_dropping_invalid(input.bytes),
            attempts,
        }
    }
}

/// Decode under `encoding`, failing on any malformed sequence
fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

/// UTF-8 decode that drops invalid sequences instead of replacing them
pub fn decode_utf8_dropping_invalid(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}
