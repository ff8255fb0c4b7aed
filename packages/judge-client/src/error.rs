use thiserror::Error;

/// Errors raised while talking to the judge service.
#[derive(Debug, Error)]
pub enum JudgeClientError {
    #[error("failed to reach the judge service")]
    Transport(#[from] reqwest::Error),
    #[error("invalid judge base url")]
    InvalidUrl(#[from] url::ParseError),
    #[error("judge returned an unexpected response: {0}")]
    UnexpectedResponse(String),
}
