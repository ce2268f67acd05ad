//! Failures the command distinguishes.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlmError {
    #[error("Invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("No GLM files found under {bucket} for {date}")]
    NoFiles { bucket: String, date: String },

    #[error("Variable `{0}` not found in dataset")]
    MissingVariable(String),

    #[error("Event variables differ in length: lat {lat}, lon {lon}, energy {energy}")]
    LengthMismatch { lat: usize, lon: usize, energy: usize },

    #[error("Failed to list `{prefix}`: {reason}")]
    Listing {
        prefix: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("Failed to download `{url}`: {status}")]
    Download {
        url: String,
        status: reqwest::StatusCode,
    },
}
