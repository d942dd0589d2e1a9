use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single generate call.
///
/// `Rejected` means the service answered but reported `success=false`; every
/// other variant is a transport failure. The `Display` output is what the user
/// sees.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Request failed: {}", .0.as_u16())]
    Status(StatusCode),

    #[error("Something went wrong: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Something went wrong: invalid response body")]
    InvalidBody(#[source] reqwest::Error),

    #[error("Something went wrong")]
    Interrupted,

    #[error("{0}")]
    Rejected(String),
}

impl GenerateError {
    pub fn is_transport(&self) -> bool {
        !matches!(self, GenerateError::Rejected(_))
    }
}
