use thiserror::Error;

/// Fallback shown when a rejected response carries no usable `error` field.
pub const GENERIC_REQUEST_ERROR: &str = "Ошибка запроса";
/// Shown when an action requires an authenticated session.
pub const AUTH_REQUIRED: &str = "Нужна авторизация";
/// Shown when an action requires administrator rights.
pub const ADMIN_REQUIRED: &str = "Нужны права администратора";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status. The message comes from
    /// the response body's `error` field, or [`GENERIC_REQUEST_ERROR`].
    #[error("{message}")]
    Rejected { message: String },

    /// The request never produced a usable response.
    #[error("request transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response did not match the expected shape.
    #[error("malformed server response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A privileged action was attempted while the session does not carry
    /// the required rights; checked before any network call is issued.
    #[error("{message}")]
    AuthorizationRequired { message: &'static str },

    /// A destructive action was declined at the confirmation gate.
    #[error("действие отменено")]
    Cancelled,
}

impl ClientError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
