use thiserror::Error;

/// Errors that prevent the runner from executing code at all
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("failed to start interpreter '{interpreter}': {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while running code: {0}")]
    Io(#[from] std::io::Error),

    #[error("runner unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
