//! K-Way Merger (C5): streams sorted block entries through a min-heap
//! keyed on `(term, stream_index)`, concatenates postings for equal
//! terms, and writes the final postings file plus the lexicon.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::block::BlockEntry;
use crate::block_io::BlockEntryReader;
use crate::error::BuildError;
use crate::lexicon::Lexicon;

struct HeapItem {
    term: String,
    stream_idx: usize,
    postings: BTreeMap<String, u32>,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term && self.stream_idx == other.stream_idx
    }
}
impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.term.cmp(&other.term).then_with(|| self.stream_idx.cmp(&other.stream_idx))
    }
}

pub struct KWayMerger;

impl KWayMerger {
    /// Discovers block files in `block_dir` (all files whose name starts
    /// with `block_`), assigns stream indices by sorting their file names
    /// lexicographically, and merges them into `final_index_path` plus a
    /// `Lexicon` persisted at `lexicon_path`.
    pub fn merge(
        block_dir: &Path,
        final_index_path: &Path,
        lexicon_path: &Path,
    ) -> Result<Lexicon, BuildError> {
        let mut block_paths: Vec<PathBuf> = std::fs::read_dir(block_dir)
            .map_err(|e| BuildError::io("merge", block_dir, e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("block_"))
                    .unwrap_or(false)
            })
            .collect();
        block_paths.sort();

        let mut readers: Vec<BlockEntryReader> = block_paths
            .iter()
            .map(|p| BlockEntryReader::open(p))
            .collect::<Result<_, _>>()?;

        let mut heap: BinaryHeap<Reverse<HeapItem>> = BinaryHeap::new();
        for (idx, reader) in readers.iter_mut().enumerate() {
            Self::push_next(reader, idx, &mut heap)?;
        }

        let out_file =
            File::create(final_index_path).map_err(|e| BuildError::io("merge", final_index_path, e))?;
        let mut writer = BufWriter::new(out_file);
        let mut lexicon = Lexicon::new();
        let mut offset: u64 = 0;

        let mut current_term: Option<String> = None;
        let mut accumulator: BTreeMap<String, u32> = BTreeMap::new();

        while let Some(Reverse(item)) = heap.pop() {
            match &current_term {
                Some(term) if *term == item.term => {
                    for (doc_id, tf) in item.postings {
                        let entry = accumulator.entry(doc_id.clone()).or_insert(0);
                        if *entry != 0 {
                            log::warn!(
                                "merge collision: term {:?} doc_id {:?} appears in more than one block; summing tf",
                                term, doc_id
                            );
                        }
                        *entry += tf;
                    }
                }
                _ => {
                    if let Some(term) = current_term.take() {
                        offset = Self::flush_term(
                            &mut writer,
                            &mut lexicon,
                            &term,
                            &accumulator,
                            offset,
                            final_index_path,
                        )?;
                    }
                    current_term = Some(item.term.clone());
                    accumulator = item.postings;
                }
            }

            Self::push_next(&mut readers[item.stream_idx], item.stream_idx, &mut heap)?;
        }

        if let Some(term) = current_term.take() {
            Self::flush_term(&mut writer, &mut lexicon, &term, &accumulator, offset, final_index_path)?;
        }

        writer.flush().map_err(|e| BuildError::io("merge", final_index_path, e))?;
        lexicon.save(lexicon_path)?;

        Ok(lexicon)
    }

    fn push_next(
        reader: &mut BlockEntryReader,
        idx: usize,
        heap: &mut BinaryHeap<Reverse<HeapItem>>,
    ) -> Result<(), BuildError> {
        if let Some(next) = reader.next() {
            let BlockEntry { term, postings } = next?;
            heap.push(Reverse(HeapItem { term, stream_idx: idx, postings }));
        }
        Ok(())
    }

    fn flush_term(
        writer: &mut BufWriter<File>,
        lexicon: &mut Lexicon,
        term: &str,
        postings: &BTreeMap<String, u32>,
        offset: u64,
        final_index_path: &Path,
    ) -> Result<u64, BuildError> {
        let payload =
            bincode::serialize(postings).map_err(|e| BuildError::serde("merge", e))?;
        writer
            .write_all(&payload)
            .map_err(|e| BuildError::io("merge", final_index_path, e))?;
        lexicon.insert(term.to_string(), offset, payload.len() as u64);
        Ok(offset + payload.len() as u64)
    }
}
