use thiserror::Error;

/// A convenience `Result` alias using [`TruthGuardError`].
pub type TruthGuardResult<T> = Result<T, TruthGuardError>;

/// Top-level error type for TruthGuard.
///
/// Transport failures, server-reported failures and precondition failures
/// each get their own variant so callers can tell them apart when turning
/// them into user-visible state.
#[derive(Error, Debug)]
pub enum TruthGuardError {
    /// The request never produced a usable response (connect, timeout, decode).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status.
    #[error("Server error {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// A precondition on the caller's input did not hold.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Authentication was refused or the credential store failed.
    #[error("Auth error: {0}")]
    Auth(String),

    /// A conversation storage backend failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration could not be parsed or validated.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TruthGuardError {
    /// Human-readable message suitable for showing to the end user.
    ///
    /// Server-reported failures surface the server's own text; everything
    /// else uses the full display form.
    pub fn user_message(&self) -> String {
        match self {
            TruthGuardError::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err = TruthGuardError::Server {
            status: 500,
            message: "model offline".into(),
        };
        assert_eq!(err.to_string(), "Server error 500: model offline");
        assert_eq!(err.user_message(), "model offline");
    }

    #[test]
    fn test_http_error_user_message() {
        let err = TruthGuardError::Http("connection refused".into());
        assert_eq!(err.user_message(), "HTTP error: connection refused");
    }
}
