use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitLabError {
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, GitLabError>;

impl From<GitLabError> for marge_core::Error {
    fn from(err: GitLabError) -> Self {
        use marge_core::Error as CoreError;

        match err {
            GitLabError::Http(e) => CoreError::Http(e.to_string()),
            GitLabError::Parse(e) => CoreError::Parse(e.to_string()),
            GitLabError::Api { status, message } => CoreError::from_status(status, message),
        }
    }
}
