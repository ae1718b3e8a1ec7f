use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Browser session already closed")]
    Closed,

    #[error("Page error: {0}")]
    Page(String),
}

impl From<chromiumoxide::error::CdpError> for SessionError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        SessionError::Page(err.to_string())
    }
}
