//! Collection Stats Recorder (C3).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Collection-wide statistics accumulated across a build, per spec:
/// `N`, `total_length`, `avgdl`, and a `doc_id -> length` map.
///
/// `doc_lengths` is a `BTreeMap` rather than a `HashMap` so that a full
/// rebuild from identical input serializes to identical bytes (a
/// `HashMap`'s default hasher is randomly seeded per instance, so its
/// iteration order cannot be relied on across builds).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CollectionStats {
    pub n: u64,
    pub total_length: u64,
    pub avgdl: f64,
    pub doc_lengths: BTreeMap<String, u32>,
}

impl CollectionStats {
    pub fn new() -> Self {
        CollectionStats::default()
    }

    /// Records one document. Duplicate `doc_id`s are trusted as-is: the
    /// last length wins in `doc_lengths`, but every observation still
    /// increments `n` and `total_length` (documented source behaviour,
    /// deduplication is the document source's responsibility).
    pub fn observe(&mut self, doc_id: &str, token_count: usize) {
        self.n += 1;
        self.total_length += token_count as u64;
        self.doc_lengths.insert(doc_id.to_string(), token_count as u32);
    }

    /// Computes `avgdl` from the accumulated totals. Call once, after the
    /// document stream is exhausted.
    pub fn finalize(&mut self) {
        self.avgdl = if self.n == 0 { 0.0 } else { self.total_length as f64 / self.n as f64 };
    }

    pub fn save(&self, path: &Path) -> Result<(), BuildError> {
        let file = File::create(path)
            .map_err(|e| BuildError::io("stats.save", path, e))?;
        let writer = BufWriter::new(file);
        bincode::serialize_into(writer, self).map_err(|e| BuildError::serde("stats.save", e))
    }

    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let file = File::open(path)
            .map_err(|e| BuildError::io("stats.load", path, e))?;
        let reader = BufReader::new(file);
        bincode::deserialize_from(reader).map_err(|e| BuildError::serde("stats.load", e))
    }
}
