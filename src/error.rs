//! Error types for synchronization operations

use thiserror::Error;

pub type SyncResult<T> = Result<T, SyncError>;

/// Failures raised by the entity stores and target resolution
#[derive(Debug, Error)]
pub enum SyncError {
    /// A mutating or listing call was attempted without credentials
    #[error(
        "You are not authenticated. You need to provide a personal access token using the \
         \"--token\" option. Create a token at https://github.com/settings/tokens"
    )]
    AuthenticationRequired,

    /// GitHub refused the operation (validation, conflict, not found)
    #[error("GitHub rejected the request (status {status}): {message}")]
    RemoteRejected { status: u16, message: String },

    /// A repository identifier that is not `owner/name`
    #[error("Invalid repository identifier '{0}', expected owner/name")]
    MalformedRepository(String),

    /// The store does not support this operation for the entity kind
    #[error("{0} is not supported")]
    UnsupportedOperation(String),

    /// Network or response decoding failure
    #[error("GitHub request failed: {0}")]
    Transport(String),
}

impl SyncError {
    /// Whether this error is the missing-credentials condition
    pub fn is_authentication_required(&self) -> bool {
        matches!(self, SyncError::AuthenticationRequired)
    }
}

impl From<octocrab::Error> for SyncError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => {
                let status = source.status_code.as_u16();
                if status == 401 {
                    SyncError::AuthenticationRequired
                } else {
                    SyncError::RemoteRejected {
                        status,
                        message: source.message.clone(),
                    }
                }
            }
            other => SyncError::Transport(other.to_string()),
        }
    }
}
