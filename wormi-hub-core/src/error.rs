use thiserror::Error;

use crate::forms::FormKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date/time parsing failed: {0}")]
    DateTime(#[from] chrono::ParseError),

    #[error("Data source error: {dataset} - {message}")]
    DataSource { dataset: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Download refused: {0}")]
    Download(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Form relay rejected {kind} submission: HTTP {status}")]
    Relay { kind: FormKind, status: u16 },

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
