//! Error taxonomy for the remote collaborators.
//!
//! Every variant of `RemoteError` triggers local fallback on the evaluation
//! and history-load paths; only mission generation and transcription surface
//! these to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
  /// Transport-level failure: connect error, timeout, DNS, TLS.
  #[error("remote service unreachable: {0}")]
  Unavailable(String),

  /// The service answered with a non-success HTTP status.
  #[error("remote service HTTP {status}: {message}")]
  Status { status: u16, message: String },

  /// Transport succeeded but the payload failed schema validation.
  #[error("malformed remote payload: {0}")]
  Malformed(String),
}

impl RemoteError {
  /// Short tag used in log fields.
  pub fn kind(&self) -> &'static str {
    match self {
      RemoteError::Unavailable(_) => "unavailable",
      RemoteError::Status { .. } => "status",
      RemoteError::Malformed(_) => "malformed",
    }
  }
}

impl From<reqwest::Error> for RemoteError {
  fn from(e: reqwest::Error) -> Self {
    RemoteError::Unavailable(e.to_string())
  }
}
