//! Document extraction.
//!
//! Reduces a decoded [`WarcDocument`] to the indexable
//! [`ExtractedDocument`]: page markup becomes title and body text, and the
//! URL yields a normalized domain.

pub mod domain;
pub mod reducer;

pub use domain::domain_of;
pub use reducer::{ReducedText, TextReducer};

use crate::core::types::ExtractedDocument;
use crate::core::warc::WarcDocument;

/// Build the indexable form of a decoded record
///
/// Documents without content keep empty `title` and `body`.
pub fn build_document(doc: WarcDocument, reducer: &TextReducer) -> ExtractedDocument {
    let ReducedText { title, body } = if doc.has_content() {
        reducer.reduce(&doc.raw_content)
    } else {
        ReducedText::default()
    };

    ExtractedDocument {
        domain: domain_of(&doc.url),
        id: doc.id,
        url: doc.url,
        title,
        body,
    }
}
