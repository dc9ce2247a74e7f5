use thiserror::Error;

/// Errors raised by the filtering engine and its storage/file collaborators.
///
/// The first three variants follow the engine's failure classes: configuration
/// problems abort a single topic, model update and classification failures are
/// recovered where they happen.
#[derive(Error, Debug)]
pub enum FilterError {
    /// Malformed topic, unusable query or invalid tuning parameter
    #[error("configuration error: {0}")]
    Config(String),

    /// A model could not absorb a training example; the previous state is kept
    #[error("model update error: {0}")]
    ModelUpdate(String),

    /// No prediction could be produced for a tweet
    #[error("classification error: {0}")]
    Classification(String),

    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Line-oriented input (qrels, run files) that could not be parsed
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, FilterError>;
