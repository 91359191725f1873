/// Errors from the subtitle service gateway.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No usable response was received (connection, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("API call failed: {status} {status_text}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status, empty if unknown.
        status_text: String,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response whose body was not the JSON we expected.
    #[error("Invalid JSON response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    /// A request body could not be encoded.
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The call was abandoned because its cancellation token fired.
    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// HTTP status code, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
