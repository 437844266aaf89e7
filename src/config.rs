//! CLI configuration: a single command with two mutually exclusive modes,
//! `--index` and `--search`, plus the tunable paths and BM25 parameters.
//! No process-wide state: every value here is passed explicitly into the
//! build and reader constructors by `main.rs`.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "catalog-search", about = "Disk-based full-text search over a product catalogue")]
pub struct Cli {
    /// Run the full build pipeline: ingest, SPIMI blocks, merge.
    #[arg(long, conflicts_with = "search")]
    pub index: bool,

    /// Load the reader and ranker and enter the interactive query loop.
    #[arg(long, conflicts_with = "index")]
    pub search: bool,

    /// Directory (or file) of `.jsonl` documents to ingest. Required with --index.
    #[arg(long)]
    pub input: Option<PathBuf>,

    #[arg(long, default_value = "block_dir")]
    pub block_dir: PathBuf,

    #[arg(long, default_value = "final_index.bin")]
    pub final_index_path: PathBuf,

    #[arg(long, default_value = "lexicon.dat")]
    pub lexicon_path: PathBuf,

    /// Soft threshold, in megabytes, on the in-memory buffer before a flush.
    #[arg(long, default_value_t = 100)]
    pub block_size_limit_mb: usize,

    #[arg(long, default_value_t = 1.5)]
    pub k1: f64,

    #[arg(long, default_value_t = 0.75)]
    pub b: f64,

    #[arg(long, default_value_t = 10)]
    pub top_k: usize,
}

impl Cli {
    pub fn block_size_limit_bytes(&self) -> usize {
        self.block_size_limit_mb * 1_000_000
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.block_dir.join("metadata")
    }
}
