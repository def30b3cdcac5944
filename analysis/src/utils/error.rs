use gs2_common::CommonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Error in common: {err}")]
    Common {
        #[from]
        err: CommonError,
    },

    #[error("netCDF error: {err}")]
    NetCdf {
        #[from]
        err: netcdf::error::Error,
    },

    #[error("I/O error: {err}")]
    Io {
        #[from]
        err: std::io::Error,
    },

    #[error("Variable {name} not found in source file")]
    MissingVariable { name: String },

    #[error("Species index {index} out of range for {name} ({count} species)")]
    SpeciesOutOfRange {
        name: String,
        index: usize,
        count: usize,
    },

    #[error("Variable {name} has shape {found:?}, expected {expected}")]
    UnexpectedShape {
        name: String,
        expected: String,
        found: Vec<usize>,
    },

    #[error("Precondition failed: {msg}")]
    Precondition { msg: String },

    #[error("Failed to draw frame: {msg}")]
    Plot { msg: String },

    #[error("Video encoder failed: {msg}")]
    Encoder { msg: String },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
