use std::path::PathBuf;

/// Errors raised while building an index (document ingestion, SPIMI block
/// construction, external merge).
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("io error during {stage} at {path}: {source}")]
    Io {
        stage: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupted block {path}: {reason}")]
    CorruptedBlock { path: PathBuf, reason: String },

    #[error("indexing cancelled")]
    Cancelled,

    #[error("serialization error at {stage}: {source}")]
    Serde {
        stage: &'static str,
        #[source]
        source: bincode::Error,
    },
}

impl BuildError {
    pub fn io(stage: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io { stage, path: path.into(), source }
    }

    pub fn serde(stage: &'static str, source: bincode::Error) -> Self {
        BuildError::Serde { stage, source }
    }
}

/// Errors raised while answering a query against an already-built index.
#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    #[error("index not found: {0}")]
    IndexNotFound(String),

    #[error("io error reading postings: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted postings entry for term {term}: {reason}")]
    CorruptedPostings { term: String, reason: String },

    #[error("serialization error reading postings for term {term}: {source}")]
    Serde {
        term: String,
        #[source]
        source: bincode::Error,
    },
}
