//! Container splitter.
//!
//! A decompressed archive is a concatenation of records, each introduced
//! by the literal version marker (`WARC/1.0`). The splitter yields one
//! byte span per marker occurrence, running up to the next occurrence.
//! Anything before the first marker is discarded, and the first span is
//! the file info record rather than a crawled page.

/// Marker token that introduces every record of the given version
pub fn version_marker(version: &str) -> String {
    format!("WARC/{version}")
}

/// A split archive: the file info record plus the remaining record spans
pub struct WarcContainer<'a> {
    info: Option<Vec<u8>>,
    records: RecordSpans<'a>,
}

impl<'a> WarcContainer<'a> {
    /// Split decompressed archive bytes at every `WARC/{version}` marker
    ///
    /// A buffer with no marker at all yields no info record and an empty
    /// record sequence.
    pub fn split(content: &'a [u8], version: &str) -> Self {
        let mut records = RecordSpans::new(content, &version_marker(version));
        let info = records.next();
        Self { info, records }
    }

    /// The file info record, normalized
    pub fn info(&self) -> Option<&[u8]> {
        self.info.as_deref()
    }

    /// Consume the container, keeping only the document record spans
    pub fn into_records(self) -> RecordSpans<'a> {
        self.records
    }
}

/// Lazy, single-pass sequence of normalized record spans
pub struct RecordSpans<'a> {
    content: &'a [u8],
    marker: Vec<u8>,
    next_start: Option<usize>,
}

impl<'a> RecordSpans<'a> {
    fn new(content: &'a [u8], marker: &str) -> Self {
        let marker = marker.as_bytes().to_vec();
        let next_start = find_from(content, &marker, 0);
        Self {
            content,
            marker,
            next_start,
        }
    }
}

fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

impl Iterator for RecordSpans<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start?;
        let end = find_from(self.content, &self.marker, start + self.marker.len());

        self.next_start = end;
        let span = &self.content[start..end.unwrap_or(self.content.len())];
        Some(normalize_line_endings(span))
    }
}

/// Replace every CRLF with a bare LF
///
/// Blank lines (`\n\n`) are the block delimiter the record decoder relies on.
pub fn normalize_line_endings(span: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(span.len());
    let mut bytes = span.iter().peekable();
    while let Some(&b) = bytes.next() {
        if b == b'\r' && bytes.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(b);
    }
    out
}
