use thiserror::Error;

/// askgpt errors
#[derive(Debug, Error)]
pub enum AskError {
    #[error("OPENAI_API_KEY env variable is not set")]
    MissingApiKey,
    #[error("No prompt given. Pass it as arguments or pipe it through stdin.")]
    EmptyPrompt,
    #[error("Invalid value for {key}: {value}")]
    InvalidSetting { key: String, value: String },
    #[error("OpenAI API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    StdioError(#[from] std::io::Error),
}
