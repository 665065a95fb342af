/// Errors from the archive REST client and URL parser.
#[derive(Debug, thiserror::Error)]
pub enum DandiError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// API returned an error response
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },
    /// Target does not exist on the server
    #[error("not found: {0}")]
    NotFound(String),
    /// Missing or rejected credentials
    #[error("authentication failed: {0}")]
    Auth(String),
    /// JSON deserialization error
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    /// URL does not match any recognized archive URL shape
    #[error("unsupported URL: {0}")]
    UnsupportedUrl(String),
}

impl DandiError {
    /// Stable short name of the error category, used when capturing a
    /// failure into a per-asset status record.
    pub fn kind(&self) -> &'static str {
        match self {
            DandiError::Http(_) => "HttpError",
            DandiError::Api { .. } => "ApiError",
            DandiError::NotFound(_) => "NotFoundError",
            DandiError::Auth(_) => "AuthError",
            DandiError::Deserialize(_) => "DeserializeError",
            DandiError::UnsupportedUrl(_) => "UnsupportedUrlError",
        }
    }
}
