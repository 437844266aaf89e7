//! Lexicon (C6): term -> (byte offset, byte length) directory into the
//! final postings file. Persisted once, loaded wholly into memory at
//! reader startup.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LexiconEntry {
    pub offset: u64,
    pub length: u64,
}

/// A `BTreeMap` rather than a `HashMap` so that two lexicons built from
/// identical input serialize to identical bytes: `HashMap`'s default
/// hasher is randomly seeded per instance, so its iteration order (and
/// therefore derived-serialize order) is not reproducible across builds.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Lexicon {
    entries: BTreeMap<String, LexiconEntry>,
}

impl Lexicon {
    pub fn new() -> Self {
        Lexicon::default()
    }

    pub fn insert(&mut self, term: String, offset: u64, length: u64) {
        self.entries.insert(term, LexiconEntry { offset, length });
    }

    pub fn get(&self, term: &str) -> Option<LexiconEntry> {
        self.entries.get(term).copied()
    }

    pub fn terms(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn entries_sorted_by_offset(&self) -> Vec<(u64, u64)> {
        let mut v: Vec<(u64, u64)> =
            self.entries.values().map(|e| (e.offset, e.length)).collect();
        v.sort_by_key(|(offset, _)| *offset);
        v
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<(), BuildError> {
        let file = File::create(path).map_err(|e| BuildError::io("lexicon.save", path, e))?;
        bincode::serialize_into(BufWriter::new(file), self)
            .map_err(|e| BuildError::serde("lexicon.save", e))
    }

    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let file = File::open(path).map_err(|e| BuildError::io("lexicon.load", path, e))?;
        bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| BuildError::serde("lexicon.load", e))
    }
}
