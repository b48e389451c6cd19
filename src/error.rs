//! Error taxonomy for the crawler.
//!
//! Only [`Error::InvalidParameter`] aborts a run before any record exists.
//! [`Error::ParseFailure`] and [`Error::FetchFailure`] are recovered where
//! they occur, and [`Error::NavigationFailure`] ends pagination while keeping
//! the records gathered so far.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("could not parse article: {0}")]
    ParseFailure(String),

    #[error("failed to fetch image {reference}: {reason}")]
    FetchFailure { reference: String, reason: String },

    #[error("navigation failed: {0}")]
    NavigationFailure(String),

    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
