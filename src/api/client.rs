use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::models::{Mess, User};
use crate::session::{extract_callback_token, Credential, Session};

use super::traits::MessApi;
use super::types::{AuthDoc, ErrorBody, MessDoc, NewMess, NewReview, RegisterForm};

/// HTTP client for the MessMate REST backend.
pub struct HttpApi {
    http: Client,
    base_url: String,
}

impl HttpApi {
    /// Create a client for the backend at `base_url` (e.g.
    /// `http://localhost:5000/api`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_auth(request: RequestBuilder, session: &Session) -> RequestBuilder {
        match session.credential() {
            Some(credential) => request.bearer_auth(credential.as_str()),
            None => request,
        }
    }

    /// URL to hand the user off to for the Google round trip. Control
    /// returns via a redirect carrying a `token` query parameter, which
    /// [`HttpApi::complete_external_auth`] consumes.
    pub fn begin_external_auth(&self) -> String {
        self.endpoint("/auth/google")
    }

    /// Second phase of the Google flow: extract the credential from the
    /// callback URL, store it, and resolve the profile. A token the
    /// server rejects leaves the session anonymous.
    pub async fn complete_external_auth(
        &self,
        session: &mut Session,
        callback_url: &str,
    ) -> Result<User, ApiError> {
        let credential = extract_callback_token(callback_url)?;
        session.set_credential(credential);
        match self.profile(session).await? {
            Some(user) => Ok(user),
            None => Err(ApiError::Unauthorized),
        }
    }
}

/// Best-effort read of the server's `{ "message": ... }` error body.
async fn response_message(response: Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    }
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let message = response_message(response).await;
    ApiError::Server { status, message }
}

#[async_trait]
impl MessApi for HttpApi {
    async fn fetch_messes(&self) -> Result<Vec<Mess>, ApiError> {
        let url = self.endpoint("/messes");
        debug!("Fetching {}", url);

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let docs: Vec<MessDoc> = response.json().await?;
        info!("Fetched {} mess listings", docs.len());
        Ok(docs.into_iter().map(MessDoc::normalize).collect())
    }

    async fn create_mess(&self, session: &Session, new_mess: &NewMess) -> Result<Mess, ApiError> {
        if !session.is_authenticated() {
            return Err(ApiError::Unauthorized);
        }
        new_mess.validate()?;

        let response = Self::with_auth(self.http.post(self.endpoint("/messes")), session)
            .json(new_mess)
            .send()
            .await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized),
            StatusCode::BAD_REQUEST => Err(ApiError::Validation(response_message(response).await)),
            status if status.is_success() => {
                let created = response.json::<MessDoc>().await?.normalize();
                info!("Created mess listing {}", created.id);
                Ok(created)
            }
            _ => Err(error_from_response(response).await),
        }
    }

    async fn add_review(
        &self,
        session: &Session,
        mess_id: &str,
        review: &NewReview,
    ) -> Result<Mess, ApiError> {
        review.validate()?;

        let url = self.endpoint(&format!("/messes/{mess_id}/reviews"));
        let response = Self::with_auth(self.http.post(&url), session)
            .json(review)
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            StatusCode::BAD_REQUEST => Err(ApiError::Validation(response_message(response).await)),
            status if status.is_success() => Ok(response.json::<MessDoc>().await?.normalize()),
            _ => Err(error_from_response(response).await),
        }
    }

    async fn login(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let response = self
            .http
            .post(self.endpoint("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::InvalidCredentials),
            status if status.is_success() => {
                let doc: AuthDoc = response.json().await?;
                let token = doc.token.clone().ok_or_else(|| ApiError::Server {
                    status: status.as_u16(),
                    message: "login response did not include a token".to_string(),
                })?;
                session.set_credential(Credential::new(token));
                info!("Logged in as {}", email);
                Ok(doc.into_user())
            }
            _ => Err(error_from_response(response).await),
        }
    }

    async fn register(&self, session: &mut Session, form: &RegisterForm) -> Result<User, ApiError> {
        form.validate()?;

        let response = self
            .http
            .post(self.endpoint("/auth/register"))
            .json(form)
            .send()
            .await?;
        match response.status() {
            // the server reports a taken email as a plain 400
            StatusCode::BAD_REQUEST => Err(ApiError::DuplicateAccount),
            status if status.is_success() => {
                let doc: AuthDoc = response.json().await?;
                let token = doc.token.clone().ok_or_else(|| ApiError::Server {
                    status: status.as_u16(),
                    message: "register response did not include a token".to_string(),
                })?;
                session.set_credential(Credential::new(token));
                info!("Registered account for {}", form.email);
                Ok(doc.into_user())
            }
            _ => Err(error_from_response(response).await),
        }
    }

    async fn logout(&self, session: &mut Session) -> Result<(), ApiError> {
        // clear first so the caller is logged out no matter what the
        // server says; the notification is best-effort
        let request = Self::with_auth(self.http.post(self.endpoint("/auth/logout")), session);
        session.clear();
        if let Err(err) = request.send().await {
            warn!("Logout notification failed: {err}");
        }
        Ok(())
    }

    async fn profile(&self, session: &mut Session) -> Result<Option<User>, ApiError> {
        if !session.is_authenticated() {
            return Ok(None);
        }

        let response = Self::with_auth(self.http.get(self.endpoint("/auth/me")), session)
            .send()
            .await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("Stored token was rejected; clearing it");
                session.clear();
                Ok(None)
            }
            status if status.is_success() => {
                let doc: AuthDoc = response.json().await?;
                Ok(Some(doc.into_user()))
            }
            _ => Err(error_from_response(response).await),
        }
    }
}
