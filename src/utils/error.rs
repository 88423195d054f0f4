use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeaverError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    // 驗證訊息直接呈現給使用者，不加前綴
    #[error("{message}")]
    ValidationError { message: String },

    #[error("Could not process image: {source}")]
    EncodingError {
        #[source]
        source: std::io::Error,
    },

    #[error("API request failed with status {status}: {body}")]
    RemoteCallError {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Retries exhausted after {attempts} attempts: {source}")]
    RetriesExhaustedError {
        attempts: u32,
        #[source]
        source: Box<WeaverError>,
    },

    #[error("{message}")]
    ResponseParseError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, WeaverError>;
