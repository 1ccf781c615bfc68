//! SL client error types.

/// Errors from fetching a site's departures.
///
/// Every variant is recoverable: the fetcher keeps serving the last good
/// payload and the health tracker decides what to report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlError {
    /// Request never produced a response (connection refused, DNS, timeout)
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Server answered with a non-200 status
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// Body was not the expected JSON payload
    #[error("JSON parse error: {message}")]
    Decode {
        message: String,
        body: Option<String>,
    },

    /// SL answered 200 but with a non-zero application status code
    #[error("API error {code}: {message}")]
    Api { code: i32, message: String },
}

impl SlError {
    /// Whether this is an SL quota error (1006 per-minute, 1007 per-month).
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, SlError::Api { code: 1006 | 1007, .. })
    }
}

impl From<reqwest::Error> for SlError {
    fn from(err: reqwest::Error) -> Self {
        // The URL carries the API key
        let err = err.without_url();
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else {
            err.to_string()
        };
        SlError::Transport { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SlError::Transport {
            message: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "transport error: connection refused");

        let err = SlError::Http {
            status: 503,
            body: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "HTTP error 503: Service Unavailable");

        let err = SlError::Decode {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("expected value"));

        let err = SlError::Api {
            code: 1007,
            message: "Monthly quota exceeded".into(),
        };
        assert_eq!(err.to_string(), "API error 1007: Monthly quota exceeded");
    }

    #[test]
    fn quota_codes() {
        let api = |code| SlError::Api {
            code,
            message: String::new(),
        };
        assert!(api(1006).is_quota_exceeded());
        assert!(api(1007).is_quota_exceeded());
        assert!(!api(1001).is_quota_exceeded());
        assert!(
            !SlError::Http {
                status: 429,
                body: String::new()
            }
            .is_quota_exceeded()
        );
    }
}
