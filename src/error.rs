use crate::models::CodeLanguage;

/// Failures on the road from prompt to assistant text. Everything here is
/// converted into the extractor's fallback payload plus a user-facing
/// message at the command boundary; none of it is fatal.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Could not reach the LLM endpoint: {0}")]
    Network(#[from] reqwest::Error),

    #[error("LLM endpoint returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("Completion response contained no choices")]
    EmptyChoices,
}

impl GenerateError {
    /// Short message suitable for a toast. Network failures get the
    /// CORS/connectivity hint since a local inference server that is down
    /// or misconfigured is by far the most common cause.
    pub fn user_message(&self) -> String {
        match self {
            GenerateError::Network(_) => {
                "Cannot connect to the LLM endpoint. Check that your local \
                 inference server is running and allows requests from this app."
                    .to_string()
            }
            GenerateError::Status { status, .. } => {
                format!("The LLM endpoint rejected the request (HTTP {status}).")
            }
            GenerateError::MalformedResponse(_) | GenerateError::EmptyChoices => {
                "The LLM endpoint returned an unexpected response.".to_string()
            }
        }
    }
}

/// Endpoint configuration failures, surfaced field-level in the config
/// dialog without touching persisted state.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API endpoint cannot be empty")]
    Empty,

    #[error("Please enter a valid URL")]
    InvalidUrl(#[from] url::ParseError),
}

/// Preview construction failure. The only typed case is a language the
/// wrapper has no runtime for; mount failures happen inside the frame and
/// are rendered there as an inline banner.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("No preview runtime for {0:?} code")]
    UnsupportedLanguage(CodeLanguage),
}
