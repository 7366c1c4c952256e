use std::path::PathBuf;

use thiserror::Error;

use crate::confed::Confederation;

/// Failures the engine surfaces to its caller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("match history unavailable at {path}: {source}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("match history at {path} is unusable: {reason}")]
    MalformedInput { path: PathBuf, reason: String },
    #[error("invalid tournament format ({context}): {reason}")]
    InvalidFormat { context: String, reason: String },
    #[error("confederation {0:?} has no member teams in the membership table")]
    EmptyConfederation(Confederation),
    #[error("strongest confederation composite is not positive; cannot normalize")]
    InvalidComposite,
}

impl EngineError {
    pub(crate) fn format(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
