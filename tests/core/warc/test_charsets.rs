//! Charset recovery on realistic page bytes

use crate::common::{info_record, WarcRecord};
use warcdex::core::warc::{EncodingResolver, EncodingSource, RecordDecoder, WarcContainer};

fn decode_single(record: WarcRecord) -> String {
    let mut bytes = info_record("1.0");
    bytes.extend(record.to_bytes());
    let span = WarcContainer::split(&bytes, "1.0")
        .into_records()
        .next()
        .unwrap();
    RecordDecoder::new().decode(&span).unwrap().raw_content
}

#[test]
fn test_declared_latin1_in_http_header() {
    let record = WarcRecord::new("a", "http://a.fr/")
        .header("Content-Type", "text/html; charset=windows-1252")
        .raw_body(b"<p>Caf\xe9 cr\xe8me</p>");

    assert_eq!(decode_single(record), "<p>Café crème</p>");
}

#[test]
fn test_wrong_declaration_falls_back_to_detection() {
    let text = "Привет, мир! Это тестовая страница на русском языке.";
    let (cp1251, _, _) = encoding_rs::WINDOWS_1251.encode(text);
    let record = WarcRecord::new("a", "http://a.ru/")
        .header("Content-Type", "text/html; charset=utf-8")
        .raw_body(&cp1251);

    let content = decode_single(record);
    assert!(!content.is_empty());
    assert!(content.contains("Привет"));
}

#[test]
fn test_undeclared_invalid_bytes_still_decode() {
    let resolver = EncodingResolver::with_strategies(vec![]);
    let decoded = resolver.decode(b"ok \xff\xfe still ok");

    assert_eq!(decoded.source(), EncodingSource::Fallback);
    assert!(decoded.text.contains("ok"));
    assert!(decoded.text.contains("still ok"));
}

#[test]
fn test_plain_utf8_page() {
    let record = WarcRecord::new("a", "http://a.jp/").html("<p>日本語のページ</p>");
    assert_eq!(decode_single(record), "<p>日本語のページ</p>");
}
