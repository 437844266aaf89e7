//! SPIMI Driver (C4): consumes the document stream, feeds the Block
//! Buffer, flushes blocks, and finalises collection statistics.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use crate::block::BlockBuffer;
use crate::block_io::BlockWriter;
use crate::document::Document;
use crate::error::BuildError;
use crate::stats::CollectionStats;

/// Result of a successful build, returned for logging/diagnostics by the
/// caller; the durable outputs are the files on disk.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub block_count: u32,
    pub stats: CollectionStats,
}

pub struct SpimiIndexer {
    block_dir: PathBuf,
    block_size_limit_bytes: usize,
}

impl SpimiIndexer {
    pub fn new(block_dir: impl Into<PathBuf>, block_size_limit_bytes: usize) -> Self {
        SpimiIndexer { block_dir: block_dir.into(), block_size_limit_bytes }
    }

    /// Drives `source` to completion, writing `block_<n>` files (n from 1)
    /// and a `metadata` file into `block_dir`. `cancel` is polled between
    /// documents and between flushes; once it returns `true` the build
    /// stops and returns `BuildError::Cancelled`, leaving whatever partial
    /// files already exist for the caller to clean up.
    pub fn build(
        &self,
        mut source: impl Iterator<Item = Document>,
        cancel: &dyn Fn() -> bool,
    ) -> Result<BuildReport, BuildError> {
        std::fs::create_dir_all(&self.block_dir)
            .map_err(|e| BuildError::io("spimi.build", &self.block_dir, e))?;

        let mut buffer = BlockBuffer::new();
        let mut stats = CollectionStats::new();
        let mut block_count: u32 = 0;

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::with_template("{spinner} indexed {pos} documents, {msg}").unwrap(),
        );

        let mut docs_seen: u64 = 0;
        loop {
            if cancel() {
                return Err(BuildError::Cancelled);
            }
            let Some(doc) = source.next() else { break };
            buffer.add(&doc.doc_id, &doc.tokens);
            stats.observe(&doc.doc_id, doc.tokens.len());
            docs_seen += 1;
            progress.set_position(docs_seen);

            if buffer.size_estimate() >= self.block_size_limit_bytes {
                if cancel() {
                    return Err(BuildError::Cancelled);
                }
                block_count += 1;
                progress.set_message(format!("flushing block {block_count}"));
                self.flush_block(&mut buffer, block_count)?;
                log::info!(
                    "flushed block {} after {} documents",
                    block_count,
                    docs_seen
                );
            }
        }

        if !buffer.is_empty() {
            block_count += 1;
            self.flush_block(&mut buffer, block_count)?;
            log::info!("flushed final block {} at end of stream", block_count);
        }

        stats.finalize();
        let metadata_path = self.block_dir.join("metadata");
        stats.save(&metadata_path)?;
        progress.finish_with_message(format!(
            "done: {} documents, {} blocks",
            docs_seen, block_count
        ));

        Ok(BuildReport { block_count, stats })
    }

    fn flush_block(&self, buffer: &mut BlockBuffer, block_number: u32) -> Result<(), BuildError> {
        let entries = buffer.drain_sorted();
        let path = self.block_path(block_number);
        BlockWriter::create(&path)?.write_all(&entries)
    }

    pub fn block_path(&self, block_number: u32) -> PathBuf {
        self.block_dir.join(format!("block_{block_number}"))
    }

    pub fn block_dir(&self) -> &Path {
        &self.block_dir
    }
}
