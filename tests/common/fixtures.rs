// Test fixtures: synthetic WARC archives and corpus trees

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for one WARC response record in the ClueWeb12 layout
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct WarcRecord {
    pub version: String,
    pub id: Option<String>,
    pub url: Option<String>,
    pub http_headers: Vec<(String, String)>,
    pub status_line: String,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl WarcRecord {
    pub fn new(id: &str, url: &str) -> Self {
        Self {
            version: "1.0".to_string(),
            id: Some(id.to_string()),
            url: Some(url.to_string()),
            http_headers: vec![("Content-Type".to_string(), "text/html".to_string())],
            status_line: "HTTP/1.1 200 OK".to_string(),
            body: Vec::new(),
        }
    }

    pub fn without_url(mut self) -> Self {
        self.url = None;
        self
    }

    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }

    pub fn html(mut self, html: &str) -> Self {
        self.body = html.as_bytes().to_vec();
        self
    }

    pub fn raw_body(mut self, bytes: &[u8]) -> Self {
        self.body = bytes.to_vec();
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.http_headers.retain(|(k, _)| k != key);
        self.http_headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Serialize with CRLF line endings, as found in the crawl
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("WARC/{}\r\nWARC-Type: response\r\n", self.version);
        if let Some(id) = &self.id {
            out.push_str(&format!("WARC-TREC-ID: {id}\r\n"));
        }
        if let Some(url) = &self.url {
            out.push_str(&format!("WARC-Target-URI: {url}\r\n"));
        }
        out.push_str(&format!("Content-Length: {}\r\n\r\n", self.body.len()));
        out.push_str(&self.status_line);
        out.push_str("\r\n");
        for (k, v) in &self.http_headers {
            out.push_str(&format!("{k}: {v}\r\n"));
        }
        out.push_str("\r\n");

        let mut bytes = out.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes.extend_from_slice(b"\r\n\r\n");
        bytes
    }
}

/// The leading warcinfo record of an archive
#[allow(dead_code)]
pub fn info_record(version: &str) -> Vec<u8> {
    format!(
        "WARC/{version}\r\nWARC-Type: warcinfo\r\nWARC-Date: 2012-02-10T21:47:28Z\r\n\r\n\
         software: Heritrix/3.1.1\r\nisPartOf: ClueWeb12\r\n\r\n"
    )
    .into_bytes()
}

/// Gzip each member separately and concatenate them
#[allow(dead_code)]
pub fn gzip_members(members: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for member in members {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(member).expect("gzip write");
        out.extend(encoder.finish().expect("gzip finish"));
    }
    out
}

/// A corpus root laid out as `{root}/{segment}/{dir}/{file}.warc.gz`
#[allow(dead_code)]
pub struct TestCorpus {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestCorpus {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write an archive holding the info record plus `records`
    pub fn add_archive(&self, relative: &str, records: &[WarcRecord]) -> PathBuf {
        let mut members = vec![info_record("1.0")];
        members.extend(records.iter().map(WarcRecord::to_bytes));
        self.add_raw(relative, &gzip_members(&members))
    }

    /// Write arbitrary bytes at `relative`
    pub fn add_raw(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&path, bytes).expect("Failed to write archive");
        path
    }
}
