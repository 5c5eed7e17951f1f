use thiserror::Error;

/// Failures raised by the MessMate backend or caught before a request
/// is ever sent. Nothing here is fatal: the listing store and session
/// stay coherent on every path.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input rejected locally, before any network call.
    #[error("{0}")]
    Validation(String),

    /// Email/password did not match a stored account.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    DuplicateAccount,

    /// The operation needs a valid login and the session has none.
    #[error("not authorized - please log in")]
    Unauthorized,

    /// The targeted mess listing does not exist on the server.
    #[error("mess not found")]
    NotFound,

    /// Transport-level failure talking to the backend.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a status we have no mapping for.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
