use mysfits_core::CoreError;

/// Errors looking a mysfit up through the public API.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// HTTP transport error.
    #[error("mysfits API HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// A successful response whose body is not a mysfit.
    #[error("mysfits API returned an unreadable mysfit: {0}")]
    Decode(reqwest::Error),
    /// The API has no such mysfit.
    #[error("mysfit {0} not found")]
    NotFound(String),
    /// The API returned an unexpected status.
    #[error("mysfits API returned status {0}")]
    Status(reqwest::StatusCode),
}

impl LookupError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LookupError::Http(_) => true,
            LookupError::Decode(_) | LookupError::NotFound(_) => false,
            LookupError::Status(status) => status.is_server_error() || status.as_u16() == 429,
        }
    }
}

/// Errors handling a submitted question.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("request body is missing")]
    MissingBody,
    #[error("request body is not valid base64")]
    BadEncoding,
    #[error("request body is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(&'static str),
    #[error("question store error: {0}")]
    Store(#[from] CoreError),
}

/// Errors turning stream records into notifications.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("stream record {record} has an unreadable NewImage: {source}")]
    Image {
        record: String,
        source: serde_dynamo::Error,
    },
    #[error("stream record {record} is missing {attribute}")]
    MissingAttribute {
        record: String,
        attribute: &'static str,
    },
    #[error("SNS publish error: {0}")]
    Publish(String),
}
