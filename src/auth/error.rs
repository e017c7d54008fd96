use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The server rejected the credentials; carries the server-reported
    /// message for display.
    #[error("{0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
