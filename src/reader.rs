//! Index Reader (C7): opens the final postings file, resolves a term via
//! the Lexicon, and returns its deserialised posting list. Reads are
//! positional so that concurrent queries never race on a shared file
//! cursor.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::QueryError;
use crate::lexicon::Lexicon;

#[cfg(unix)]
use std::os::unix::fs::FileExt;

#[cfg(not(unix))]
use std::io::{Read, Seek, SeekFrom};
#[cfg(not(unix))]
use std::sync::Mutex;

pub struct IndexReader {
    #[cfg(unix)]
    file: File,
    #[cfg(not(unix))]
    file: Mutex<File>,
    lexicon: Lexicon,
}

impl IndexReader {
    /// Opens `final_index_path` and loads `lexicon_path` wholly into
    /// memory. A missing file at construction is fatal.
    pub fn open(final_index_path: &Path, lexicon_path: &Path) -> Result<Self, QueryError> {
        if !final_index_path.exists() {
            return Err(QueryError::IndexNotFound(final_index_path.display().to_string()));
        }
        if !lexicon_path.exists() {
            return Err(QueryError::IndexNotFound(lexicon_path.display().to_string()));
        }
        let lexicon = Lexicon::load(lexicon_path)
            .map_err(|e| QueryError::IndexNotFound(format!("{}: {e}", lexicon_path.display())))?;
        let file = File::open(final_index_path)?;

        #[cfg(unix)]
        {
            Ok(IndexReader { file, lexicon })
        }
        #[cfg(not(unix))]
        {
            Ok(IndexReader { file: Mutex::new(file), lexicon })
        }
    }

    /// Returns the posting list for `term`, or an empty map if the term is
    /// not in the lexicon; an unknown term is not an error.
    pub fn get_postings(&self, term: &str) -> Result<BTreeMap<String, u32>, QueryError> {
        let Some(entry) = self.lexicon.get(term) else {
            return Ok(BTreeMap::new());
        };

        let mut buf = vec![0u8; entry.length as usize];
        self.read_at(entry.offset, &mut buf)?;

        bincode::deserialize(&buf).map_err(|e| QueryError::Serde { term: term.to_string(), source: e })
    }

    #[cfg(unix)]
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), QueryError> {
        self.file.read_exact_at(buf, offset)?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), QueryError> {
        let mut file = self.file.lock().expect("postings file lock poisoned");
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockBuffer;
    use crate::block_io::BlockWriter;
    use crate::merge::KWayMerger;

    fn build_tiny_index(dir: &Path) -> (PathBuf, PathBuf) {
        let mut buf = BlockBuffer::new();
        buf.add("d1", &["apple".into(), "banana".into(), "apple".into()]);
        buf.add("d3", &["banana".into(), "banana".into(), "date".into()]);
        let entries = buf.drain_sorted();
        let block_path = dir.join("block_1");
        BlockWriter::create(&block_path).unwrap().write_all(&entries).unwrap();

        let final_path = dir.join("final_index.bin");
        let lexicon_path = dir.join("lexicon.dat");
        KWayMerger::merge(dir, &final_path, &lexicon_path).unwrap();
        (final_path, lexicon_path)
    }

    #[test]
    fn returns_posting_list_for_known_term() {
        let dir = tempfile::tempdir().unwrap();
        let (final_path, lexicon_path) = build_tiny_index(dir.path());
        let reader = IndexReader::open(&final_path, &lexicon_path).unwrap();
        let postings = reader.get_postings("banana").unwrap();
        assert_eq!(postings.get("d1"), Some(&1));
        assert_eq!(postings.get("d3"), Some(&2));
    }

    #[test]
    fn unknown_term_returns_empty_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let (final_path, lexicon_path) = build_tiny_index(dir.path());
        let reader = IndexReader::open(&final_path, &lexicon_path).unwrap();
        let postings = reader.get_postings("kiwi").unwrap();
        assert!(postings.is_empty());
    }

    #[test]
    fn missing_files_are_fatal_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        let result = IndexReader::open(&dir.path().join("missing_final"), &dir.path().join("missing_lexicon"));
        assert!(result.is_err());
    }

    #[test]
    fn reopening_the_reader_returns_the_same_postings() {
        let dir = tempfile::tempdir().unwrap();
        let (final_path, lexicon_path) = build_tiny_index(dir.path());
        let first = IndexReader::open(&final_path, &lexicon_path).unwrap();
        let first_postings = first.get_postings("banana").unwrap();
        drop(first);
        let second = IndexReader::open(&final_path, &lexicon_path).unwrap();
        let second_postings = second.get_postings("banana").unwrap();
        assert_eq!(first_postings, second_postings);
    }
}
