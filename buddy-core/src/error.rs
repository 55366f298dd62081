//! Error types shared by the forecast pipeline and the voice assistant.

use thiserror::Error;

/// A query that cannot be issued. Recovered locally; no request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("{0} does not exist in the local time zone")]
    NonexistentLocalTime(String),
}

impl ValidationError {
    /// Message for the transient notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingField(_) => "Please fill location, date and time.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Failure of a forecast source.
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Backend {status}: {status_text}")]
    Backend { status: u16, status_text: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Could not decode forecast: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ForecastError {
    /// Message for the transient notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend { .. } => self.to_string(),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::Decode(_) => "The forecast service sent an unexpected response.".to_string(),
        }
    }
}

/// Failure to open a capture session on the speech platform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    #[error("a capture session is already active")]
    CaptureBusy,

    #[error("speech recognition unavailable: {0}")]
    Unavailable(String),
}
