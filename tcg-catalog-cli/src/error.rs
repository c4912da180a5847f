use tcg_catalog_import::{PipelineError, Stage};
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Remote client could not be set up
    #[error("Remote error: {0}")]
    Remote(String),

    /// The build pipeline failed in one of its stages
    #[error("Build failed during {stage}: {source}")]
    Pipeline {
        stage: Stage,
        #[source]
        source: PipelineError,
    },
}

impl CliError {
    pub(crate) fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }
}

impl From<PipelineError> for CliError {
    fn from(source: PipelineError) -> Self {
        Self::Pipeline {
            stage: source.stage(),
            source,
        }
    }
}
