//! HTML to title/body text reduction.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// Elements whose text never reaches the output
const EXCLUDED_ELEMENTS: &[&str] = &["script", "style", "noscript"];

/// Title and plain-text body of one page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReducedText {
    pub title: String,
    pub body: String,
}

/// Reduces raw page markup to indexable text
///
/// Parsing is best-effort: malformed markup yields whatever text the
/// parser could recover and never an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReducer;

impl TextReducer {
    pub fn new() -> Self {
        Self
    }

    /// Reduce markup to title and body text
    ///
    /// Blank input reduces to empty strings without parsing.
    pub fn reduce(&self, raw: &str) -> ReducedText {
        if raw.trim().is_empty() {
            return ReducedText::default();
        }

        let document = Html::parse_document(&prepare(raw));

        let title = document
            .select(&TITLE)
            .next()
            .map(|el| collapse_whitespace(el.text()))
            .unwrap_or_default();

        let body = match document.select(&BODY).next() {
            Some(body) => visible_text(body),
            None => visible_text(document.root_element()),
        };

        ReducedText { title, body }
    }
}

/// Undo escaped newlines and separate tags written back to back
fn prepare(raw: &str) -> String {
    raw.replace("\\n", "\n").replace("><", "> <")
}

/// Text of every node under `root` that is not inside an excluded element
///
/// Only text nodes are read, so attribute values never appear.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();

    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let excluded = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| EXCLUDED_ELEMENTS.contains(&el.name()))
        });
        if excluded {
            continue;
        }

        push_words(&mut out, text.split_whitespace());
    }

    out
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for part in parts {
        push_words(&mut out, part.split_whitespace());
    }
    out
}

fn push_words<'a>(out: &mut String, words: impl Iterator<Item = &'a str>) {
    for word in words {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
}
