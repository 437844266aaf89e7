//! Document types and the document-source contract.

use serde::{Deserialize, Serialize};

/// One document from the source: an opaque identifier plus an ordered
/// sequence of tokens. The core never parses `doc_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub doc_id: String,
    pub tokens: Vec<String>,
}

impl Document {
    pub fn new(doc_id: impl Into<String>, tokens: Vec<String>) -> Self {
        Document { doc_id: doc_id.into(), tokens }
    }
}

/// A finite, restartable producer of documents. Any `Iterator<Item =
/// Document>` qualifies; the driver (C4) traverses it exactly once per
/// build. Empty token lists are permitted.
pub trait DocumentSource: Iterator<Item = Document> {}

impl<T> DocumentSource for T where T: Iterator<Item = Document> {}

/// An in-memory document source, mainly useful for tests and small
/// collections where the whole corpus already lives in memory.
pub struct InMemorySource {
    docs: std::vec::IntoIter<Document>,
}

impl InMemorySource {
    pub fn new(docs: Vec<Document>) -> Self {
        InMemorySource { docs: docs.into_iter() }
    }
}

impl Iterator for InMemorySource {
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        self.docs.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_source_yields_in_order() {
        let docs = vec![
            Document::new("d1", vec!["apple".into()]),
            Document::new("d2", vec!["banana".into()]),
        ];
        let mut src = InMemorySource::new(docs);
        assert_eq!(src.next().unwrap().doc_id, "d1");
        assert_eq!(src.next().unwrap().doc_id, "d2");
        assert!(src.next().is_none());
    }
}
