//! Block Buffer (C1): the in-memory partial dictionary SPIMI fills before
//! each flush.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Per-term overhead charged against the size estimate for the outer
/// `HashMap` entry itself, independent of the term's own byte length.
const TERM_OVERHEAD_BYTES: usize = 48;

/// One `(term, posting list)` entry as it is drained from a Block Buffer
/// and later read back from a block file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockEntry {
    pub term: String,
    pub postings: BTreeMap<String, u32>,
}

/// Holds `term -> doc_id -> tf` for the documents folded in since the
/// last drain. The size estimate is monotone in both the number of
/// distinct terms and the cumulative size of posting entries, so it
/// cannot shrink except via `drain_sorted`.
#[derive(Debug, Default)]
pub struct BlockBuffer {
    terms: HashMap<String, BTreeMap<String, u32>>,
    size_estimate: usize,
}

impl BlockBuffer {
    pub fn new() -> Self {
        BlockBuffer::default()
    }

    /// Folds one document's tokens into the buffer, incrementing
    /// `terms[t][doc_id]` for every token `t`.
    pub fn add(&mut self, doc_id: &str, tokens: &[String]) {
        for term in tokens {
            let is_new_term = !self.terms.contains_key(term);
            if is_new_term {
                self.size_estimate += TERM_OVERHEAD_BYTES + term.len();
            }
            let postings = self.terms.entry(term.clone()).or_insert_with(BTreeMap::new);
            match postings.get_mut(doc_id) {
                Some(tf) => {
                    *tf += 1;
                    self.size_estimate += std::mem::size_of::<u32>();
                }
                None => {
                    postings.insert(doc_id.to_string(), 1);
                    self.size_estimate += doc_id.len() + std::mem::size_of::<u32>();
                }
            }
        }
    }

    pub fn size_estimate(&self) -> usize {
        self.size_estimate
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Sorts the buffered terms ascending and returns them as a `Vec`,
    /// resetting the buffer to empty.
    pub fn drain_sorted(&mut self) -> Vec<BlockEntry> {
        let terms = std::mem::take(&mut self.terms);
        self.size_estimate = 0;
        let mut entries: Vec<BlockEntry> = terms
            .into_iter()
            .map(|(term, postings)| BlockEntry { term, postings })
            .collect();
        entries.sort_unstable_by(|a, b| a.term.cmp(&b.term));
        entries
    }
}
