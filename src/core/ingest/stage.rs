//! File extraction stage.
//!
//! One archive at a time: decompress the whole file into memory, split it
//! into record spans, then lazily decode, reduce and emit each record.
//! A bad record is dropped and the next one is attempted; only a failure
//! to read or decompress the file fails the file.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::core::error::{Result, WarcdexError};
use crate::core::extract::{build_document, TextReducer};
use crate::core::types::{ExtractedDocument, ExtractionStats};
use crate::core::warc::{RecordDecoder, RecordSpans, WarcContainer};

/// Turns archive files into document streams
///
/// Stateless between files and shared by all workers.
pub struct FileExtractor {
    version: String,
    decoder: RecordDecoder,
    reducer: TextReducer,
}

impl FileExtractor {
    /// Extractor for archives of the given format version (e.g. `"1.0"`)
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            decoder: RecordDecoder::new(),
            reducer: TextReducer::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Read and decompress one archive
    ///
    /// Fails with a file-level error; the caller leaves the file out of
    /// the ledger so the next run retries it.
    pub fn open(&self, path: &Path) -> Result<FileExtraction<'_>> {
        let content = decompress(path)?;
        tracing::debug!("Decompressed {:?} ({} bytes)", path, content.len());

        Ok(FileExtraction {
            extractor: self,
            path: path.to_path_buf(),
            content,
        })
    }

    /// Extraction over bytes that are already decompressed
    pub fn from_bytes(&self, path: impl Into<PathBuf>, content: Vec<u8>) -> FileExtraction<'_> {
        FileExtraction {
            extractor: self,
            path: path.into(),
            content,
        }
    }
}

/// Decompress a (possibly multi-member) gzip file
pub fn decompress(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path)
        .map_err(|e| WarcdexError::Decompression(format!("Cannot open {path:?}: {e}")))?;

    let mut content = Vec::new();
    MultiGzDecoder::new(BufReader::new(file))
        .read_to_end(&mut content)
        .map_err(|e| WarcdexError::Decompression(format!("{path:?}: {e}")))?;

    Ok(content)
}

/// One decompressed archive held in memory
pub struct FileExtraction<'e> {
    extractor: &'e FileExtractor,
    path: PathBuf,
    content: Vec<u8>,
}

impl FileExtraction<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lazy, single-pass stream of the file's documents in archive order
    pub fn documents(&self) -> ExtractedDocuments<'_> {
        let container = WarcContainer::split(&self.content, &self.extractor.version);
        if container.info().is_none() {
            tracing::debug!("No record marker in {:?}; nothing to extract", self.path);
        }

        ExtractedDocuments {
            path: &self.path,
            spans: container.into_records(),
            decoder: &self.extractor.decoder,
            reducer: &self.extractor.reducer,
            stats: ExtractionStats::default(),
            exhausted: false,
        }
    }
}

/// Documents of one archive, decoded on demand
pub struct ExtractedDocuments<'a> {
    path: &'a Path,
    spans: RecordSpans<'a>,
    decoder: &'a RecordDecoder,
    reducer: &'a TextReducer,
    stats: ExtractionStats,
    exhausted: bool,
}

impl ExtractedDocuments<'_> {
    /// Counters so far
    pub fn stats(&self) -> ExtractionStats {
        self.stats
    }

    /// Whether every record span has been attempted
    ///
    /// Only an exhausted stream may mark its file complete.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl Iterator for ExtractedDocuments<'_> {
    type Item = ExtractedDocument;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(span) = self.spans.next() else {
                self.exhausted = true;
                return None;
            };
            self.stats.records_seen += 1;

            match self.decoder.decode(&span) {
                Ok(record) => {
                    if !record.has_content() {
                        self.stats.empty_documents += 1;
                    }
                    self.stats.documents_emitted += 1;
                    return Some(build_document(record, self.reducer));
                }
                Err(e) => {
                    self.stats.records_dropped += 1;
                    tracing::warn!(
                        "Dropping record {} of {:?}: {}",
                        self.stats.records_seen,
                        self.path,
                        e
                    );
                }
            }
        }
    }
}
