use crate::error::ApiError;
use crate::models::{Mess, User};
use crate::session::Session;
use async_trait::async_trait;

use super::types::{NewMess, NewReview, RegisterForm};

/// Common trait over the MessMate backend.
/// The HTTP client implements it against the real server; tests swap in
/// an in-memory double.
#[async_trait]
pub trait MessApi: Send + Sync {
    /// Fetch the full listing set.
    async fn fetch_messes(&self) -> Result<Vec<Mess>, ApiError>;

    /// Create a listing. Requires an authenticated session; the server
    /// echoes the created record back.
    async fn create_mess(&self, session: &Session, new_mess: &NewMess) -> Result<Mess, ApiError>;

    /// Append a review to a listing. Anonymous callers are allowed.
    /// Returns the updated parent listing with its full review collection.
    async fn add_review(
        &self,
        session: &Session,
        mess_id: &str,
        review: &NewReview,
    ) -> Result<Mess, ApiError>;

    /// Exchange email/password for a bearer credential stored on the
    /// session.
    async fn login(&self, session: &mut Session, email: &str, password: &str)
        -> Result<User, ApiError>;

    /// Create an account; behaves like `login` on success.
    async fn register(&self, session: &mut Session, form: &RegisterForm) -> Result<User, ApiError>;

    /// Clear the local credential and tell the server on a best-effort
    /// basis. Always succeeds from the caller's perspective.
    async fn logout(&self, session: &mut Session) -> Result<(), ApiError>;

    /// Resolve the current user. Falls back to anonymous (and discards
    /// the dead credential) when the server rejects it.
    async fn profile(&self, session: &mut Session) -> Result<Option<User>, ApiError>;
}
