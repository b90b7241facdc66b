use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResourceError>;

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Failed to run inventory command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Inventory command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("Inventory command timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Malformed inventory output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid transition: {0}")]
    InvalidTransition(&'static str),

    #[error("Type '{0}' is not one of the offered resource types")]
    UnknownType(String),
}
