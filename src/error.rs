use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Malformed feature cache: {0}")]
    CacheFormat(#[from] serde_json::Error),

    #[error("Mailbox API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Mailbox request failed: {0}")]
    Transport(String),

    #[error("Unparseable message {id}: {reason}")]
    UnparseableMessage { id: String, reason: String },

    #[error("Invalid record at {}:{line_no}: {line:?}", .path.display())]
    InvalidLabelLine {
        path: PathBuf,
        line_no: usize,
        line: String,
    },

    #[error("Invalid statistics file {}: {reason}", .path.display())]
    InvalidStatistics { path: PathBuf, reason: String },

    #[error("No training records to fit a model on")]
    EmptyTrainingSet,

    #[error("Training record {index} has {found} features, expected {expected}")]
    RaggedFeatures {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Got {features} feature vectors but {labels} labels")]
    LabelCountMismatch { features: usize, labels: usize },

    #[error("Model was fitted on {expected} features, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
}
