#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to fetch data: {0}")]
    FetchError(String),

    #[error("Unexpected status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Blocked by anti-bot challenge at {0}")]
    Challenge(String),

    #[error("Error parsing content: {0}")]
    ParseError(String),

    #[error("Could not decode content with any supported encoding")]
    DecodeError,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Notification delivery failed: {0}")]
    NotifyError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::FetchError(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
