use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MotifError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Invalid motif matrix for {id}: {message}")]
    InvalidMatrix { id: String, message: String },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Invalid parameter: {name} = {value}, {message}")]
    InvalidParameter {
        name: String,
        value: String,
        message: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Score map keys differ for motif {id}: expected {expected} scores, found {found}")]
    KeyMismatch {
        id: String,
        expected: usize,
        found: usize,
    },

    #[error("No score recorded for {first} compared to {second}")]
    MissingScore { first: String, second: String },

    #[error("Cannot cluster {n} motif(s): at least two are required for linkage")]
    DegenerateClustering { n: usize },

    #[error("Invalid cluster state: {0} has no member motifs")]
    InvalidClusterState(String),

    #[error("Duplicate motif identifier: {0}")]
    DuplicateMotifId(String),

    #[error("No motifs given")]
    EmptyMotifSet,
}

/// Type alias for Result with MotifError
pub type Result<T> = std::result::Result<T, MotifError>;

impl MotifError {
    /// Create a new InvalidMatrix error
    pub fn invalid_matrix(id: impl Into<String>, message: impl Into<String>) -> Self {
        MotifError::InvalidMatrix {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Create a new InvalidParameter error
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        MotifError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            message: message.into(),
        }
    }

    /// Create a new KeyMismatch error
    pub fn key_mismatch(id: impl Into<String>, expected: usize, found: usize) -> Self {
        MotifError::KeyMismatch {
            id: id.into(),
            expected,
            found,
        }
    }

    /// Create a new MissingScore error
    pub fn missing_score(first: impl Into<String>, second: impl Into<String>) -> Self {
        MotifError::MissingScore {
            first: first.into(),
            second: second.into(),
        }
    }
}

impl From<polars::prelude::PolarsError> for MotifError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        MotifError::DataError(err.to_string())
    }
}

impl From<serde_yaml::Error> for MotifError {
    fn from(err: serde_yaml::Error) -> Self {
        MotifError::DataError(err.to_string())
    }
}
