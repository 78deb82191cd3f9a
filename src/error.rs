use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    /// The service answered with an `error` field.
    #[error("{0}")]
    Service(String),
    /// Client-side rejection before anything is sent or written.
    #[error("{0}")]
    Validation(String),
    #[error("no data to export")]
    NoData,
    #[error("operation cancelled by user")]
    Cancelled,
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        AppError::Validation(msg.into())
    }

    /// Text shown in the UI for a failed `action` (e.g. "Upload").
    pub fn user_message(&self, action: &str) -> String {
        match self {
            AppError::Service(msg) | AppError::Validation(msg) => msg.clone(),
            AppError::NoData => "No data to export.".to_string(),
            AppError::Cancelled => format!("{action} cancelled."),
            _ => format!("{action} failed. Please try again."),
        }
    }
}
