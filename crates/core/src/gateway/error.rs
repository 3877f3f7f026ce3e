use thiserror::Error;

/// Failure talking to the analysis service, tagged with the endpoint that
/// produced it.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never completed: connection refused, DNS failure, timeout.
    #[error("request to {endpoint} failed")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: u16,
        /// Human-readable detail extracted from the error body, when present.
        detail: Option<String>,
    },

    /// The response body was not the JSON shape this client expects.
    #[error("failed to decode {endpoint} response")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body decoded but violated a documented invariant.
    #[error("{endpoint} response violated its contract: {detail}")]
    Contract { endpoint: String, detail: String },
}

impl GatewayError {
    /// Server-provided detail message, when the service sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Message to surface to the user: the service's own detail if it sent
    /// one, otherwise the caller's fallback text.
    pub fn display_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }

    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode { .. } | Self::Contract { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_detail_feeds_display_message() {
        let err = GatewayError::Status {
            endpoint: "POST /upload-csv".into(),
            status: 400,
            detail: Some("No file uploaded".into()),
        };
        assert_eq!(err.display_message("Failed to upload CSV"), "No file uploaded");
        assert_eq!(err.to_string(), "POST /upload-csv returned HTTP 400");
    }

    #[test]
    fn missing_detail_falls_back() {
        let err = GatewayError::Status {
            endpoint: "POST /analyze".into(),
            status: 502,
            detail: None,
        };
        assert_eq!(
            err.display_message("Failed to analyze campaigns"),
            "Failed to analyze campaigns"
        );
    }

    #[test]
    fn retry_classification() {
        let transient = GatewayError::Status {
            endpoint: "GET /recommendations".into(),
            status: 503,
            detail: None,
        };
        let throttled = GatewayError::Status {
            endpoint: "GET /recommendations".into(),
            status: 429,
            detail: None,
        };
        let client_error = GatewayError::Status {
            endpoint: "GET /benchmarks/{id}".into(),
            status: 404,
            detail: None,
        };
        let malformed = GatewayError::Contract {
            endpoint: "GET /recommendations".into(),
            detail: "confidence must be between 0 and 1".into(),
        };
        assert!(transient.is_retryable());
        assert!(throttled.is_retryable());
        assert!(!client_error.is_retryable());
        assert!(!malformed.is_retryable());
    }
}
