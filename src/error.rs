//! Failures of a single generation attempt.

use thiserror::Error;

/// Why a call to the generation API did not produce a usable result.
///
/// None of these are retried automatically; the revision loop ends the session
/// when one of them comes back.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The request could not be sent, timed out, or the body could not be read.
    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The endpoint answered with a non-success HTTP status.
    ///
    /// `detail` is the start of the response body as the provider sent it.
    #[error("API error: HTTP {status} {reason}{}", detail_suffix(.detail))]
    Api {
        status: u16,
        reason: String,
        detail: String,
    },

    /// The reply was not the JSON shape we asked for.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

fn detail_suffix(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!(" ({detail})")
    }
}

impl GenerationError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        GenerationError::MalformedResponse(detail.into())
    }
}
