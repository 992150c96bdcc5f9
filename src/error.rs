use thiserror::Error;

/// Shown whenever the telemetry API cannot be reached at all.
pub const CONNECTION_ERROR: &str = "Erro ao conectar com a API. Verifique a conexão.";

/// Failure of a single call to the telemetry API.
///
/// Every variant is terminal for the fetch attempt that produced it: callers
/// render an error panel instead of partial data.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout.
    #[error("telemetry API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx status whose body carried no usable envelope message.
    #[error("telemetry API returned status {0}")]
    Status(u16),

    /// Body was not a valid response envelope.
    #[error("malformed telemetry API response: {0}")]
    Decode(String),

    /// Request URL could not be built from the configured base URL.
    #[error("invalid telemetry API URL: {0}")]
    Url(String),

    /// Envelope with `success: false`.
    #[error("telemetry API call failed: {}", .message.as_deref().unwrap_or("(no message)"))]
    Unsuccessful { message: Option<String> },
}

impl ApiError {
    /// Localized text for the error panel.
    ///
    /// `fallback` is the view-specific generic message used when the server
    /// did not provide one.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Transport(_) => CONNECTION_ERROR.to_owned(),
            ApiError::Unsuccessful {
                message: Some(message),
            } => message.clone(),
            ApiError::Unsuccessful { message: None }
            | ApiError::Status(_)
            | ApiError::Url(_)
            | ApiError::Decode(_) => fallback.to_owned(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsuccessful_with_message_uses_server_text() {
        let err = ApiError::Unsuccessful {
            message: Some("x".to_owned()),
        };
        assert_eq!(err.user_message("fallback"), "x");
    }

    #[test]
    fn unsuccessful_without_message_uses_fallback() {
        let err = ApiError::Unsuccessful { message: None };
        assert_eq!(err.user_message("Erro ao carregar histórico"), "Erro ao carregar histórico");
    }

    #[test]
    fn status_and_decode_use_fallback() {
        assert_eq!(ApiError::Status(502).user_message("fb"), "fb");
        assert_eq!(ApiError::Decode("eof".to_owned()).user_message("fb"), "fb");
    }

    #[test]
    fn unsuccessful_display_without_message() {
        let err = ApiError::Unsuccessful { message: None };
        assert_eq!(err.to_string(), "telemetry API call failed: (no message)");
    }
}
