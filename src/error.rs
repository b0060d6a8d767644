use thiserror::Error;

/// Fatal errors that abort a run. Everything here is reported once, with a
/// human-readable message, and the process exits non-zero.
#[derive(Debug, Error)]
pub enum DescbotError {
    /// Bad input: unknown mode, out-of-range number, malformed marker or glob,
    /// missing credentials. Raised before any network I/O.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The pull request, its files, or its commits could not be read.
    #[error("failed to fetch {what}: {message}")]
    Fetch { what: &'static str, message: String },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Writing the new description back to the host failed.
    #[error("failed to update pull request description: {0}")]
    Persist(String),
}

impl DescbotError {
    pub fn config(message: impl Into<String>) -> Self {
        DescbotError::Configuration(message.into())
    }

    pub fn fetch(what: &'static str, err: &anyhow::Error) -> Self {
        DescbotError::Fetch {
            what,
            message: format!("{err:#}"),
        }
    }
}

/// Failures of the generator call, after the retry loop has had its say.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A failure that did not match any transient signature.
    #[error("generation failed: {0}")]
    Permanent(String),

    /// The backend answered, but with no usable text.
    #[error("generation failed: the model returned an empty response")]
    EmptyResponse,

    /// Every attempt hit a transient failure.
    #[error("generation failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}
