use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommonError {
    #[error("Unable to read run description {path}: {err}")]
    RunFileUnreadable {
        path: String,
        #[source]
        err: std::io::Error,
    },

    #[error("Invalid run description {path}: {msg}")]
    RunFileInvalid { path: String, msg: String },
}
