use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between reading a network and getting
/// communities back from the external tool.
#[derive(Debug, Error)]
pub enum OslomError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to launch '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to execute command: '{command}' (status {status:?}): {stderr}")]
    ToolFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("No output files found: {}", .path.display())]
    MissingOutput { path: PathBuf },

    #[error("Index {index} in tool output was never assigned to a node")]
    IndexLookup { index: usize },
}

impl OslomError {
    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        OslomError::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, OslomError>;
