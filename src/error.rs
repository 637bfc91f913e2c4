use thiserror::Error;

pub type Result<T> = std::result::Result<T, MergeError>;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid hex color: \"{0}\"")]
    InvalidColor(String),
    #[error("Server misconfigured: {0}")]
    Config(String),
    #[error("HTTP error: {0}")]
    Http(#[from] Box<ureq::Error>),
    #[error("{0}")]
    Upstream(String),
    #[error("User \"{0}\" not found")]
    UserNotFound(String),
    #[error("Theme error: {0}")]
    Theme(String),
}

impl From<ureq::Error> for MergeError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => {
                MergeError::Upstream(format!("GitHub API error: {code}"))
            }
            other => MergeError::Http(Box::new(other)),
        }
    }
}

impl MergeError {
    /// HTTP-style status used when this error is surfaced as an error graphic.
    pub fn status(&self) -> u16 {
        match self {
            MergeError::Validation(_) | MergeError::InvalidColor(_) | MergeError::Theme(_) => 400,
            MergeError::Config(_) => 500,
            MergeError::Http(_) | MergeError::Upstream(_) | MergeError::UserNotFound(_) => 502,
        }
    }
}
