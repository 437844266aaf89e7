//! Block Writer (C2) and the streaming reader K-Way Merger (C5) pulls
//! block entries from.
//!
//! On-disk format: a sequence of `[u64 LE entry_len][bincode(BlockEntry)]`
//! records, term-ascending. The length prefix is what lets a reader walk
//! the file one entry at a time instead of deserialising the whole block
//! at once.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::block::BlockEntry;
use crate::error::BuildError;

pub struct BlockWriter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl BlockWriter {
    pub fn create(path: &Path) -> Result<Self, BuildError> {
        let file = File::create(path).map_err(|e| BuildError::io("block_write", path, e))?;
        Ok(BlockWriter { writer: BufWriter::new(file), path: path.to_path_buf() })
    }

    /// Writes a sorted slice of entries as one block file.
    pub fn write_all(mut self, entries: &[BlockEntry]) -> Result<(), BuildError> {
        for entry in entries {
            self.write_entry(entry)?;
        }
        self.writer
            .flush()
            .map_err(|e| BuildError::io("block_write", &self.path, e))
    }

    fn write_entry(&mut self, entry: &BlockEntry) -> Result<(), BuildError> {
        let payload = bincode::serialize(entry).map_err(|e| BuildError::serde("block_write", e))?;
        let len = payload.len() as u64;
        self.writer
            .write_all(&len.to_le_bytes())
            .map_err(|e| BuildError::io("block_write", &self.path, e))?;
        self.writer
            .write_all(&payload)
            .map_err(|e| BuildError::io("block_write", &self.path, e))
    }
}

/// Streams `BlockEntry` records one at a time out of a block file,
/// without loading the whole file into memory.
pub struct BlockEntryReader {
    reader: BufReader<File>,
    path: PathBuf,
}

impl BlockEntryReader {
    pub fn open(path: &Path) -> Result<Self, BuildError> {
        let file = File::open(path).map_err(|e| BuildError::io("block_read", path, e))?;
        Ok(BlockEntryReader { reader: BufReader::new(file), path: path.to_path_buf() })
    }
}

impl Iterator for BlockEntryReader {
    type Item = Result<BlockEntry, BuildError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut len_bytes = [0u8; 8];
        match self.reader.read_exact(&mut len_bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return None,
            Err(e) => return Some(Err(BuildError::io("block_read", &self.path, e))),
        }
        let len = u64::from_le_bytes(len_bytes) as usize;
        let mut payload = vec![0u8; len];
        if let Err(e) = self.reader.read_exact(&mut payload) {
            return Some(Err(BuildError::CorruptedBlock {
                path: self.path.clone(),
                reason: format!("truncated entry: {e}"),
            }));
        }
        match bincode::deserialize::<BlockEntry>(&payload) {
            Ok(entry) => Some(Ok(entry)),
            Err(e) => Some(Err(BuildError::CorruptedBlock {
                path: self.path.clone(),
                reason: format!("bincode decode failed: {e}"),
            })),
        }
    }
}
