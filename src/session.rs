use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use url::Url;

use crate::error::ApiError;

/// Opaque bearer token identifying the current actor to the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    // Tokens must never end up in logs
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Who this client is talking to the backend as. Anonymous until a login,
/// a registration or a completed Google round trip stores a credential;
/// logout or a rejected credential takes it back to anonymous. There are
/// no other transitions.
///
/// Optionally backed by a token file so the credential survives between
/// runs, the way the browser client kept it in local storage.
#[derive(Debug, Default)]
pub struct Session {
    credential: Option<Credential>,
    token_file: Option<PathBuf>,
}

impl Session {
    /// Session with no credential and no persistence.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session backed by a token file, picking up a credential left by a
    /// previous run if the file holds one.
    pub fn with_token_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let credential = match fs::read_to_string(&path) {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    None
                } else {
                    debug!("Loaded stored token from {}", path.display());
                    Some(Credential::new(token))
                }
            }
            Err(_) => None,
        };
        Self {
            credential,
            token_file: Some(path),
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    /// Store a fresh credential, replacing any previous one wholesale.
    /// Persistence is best-effort: an unwritable token file is logged and
    /// the login still succeeds.
    pub fn set_credential(&mut self, credential: Credential) {
        if let Some(path) = &self.token_file {
            if let Err(err) = fs::write(path, credential.as_str()) {
                warn!("Failed to persist token to {}: {err}", path.display());
            }
        }
        self.credential = Some(credential);
    }

    /// Drop the held credential, returning the session to anonymous.
    pub fn clear(&mut self) {
        self.credential = None;
        if let Some(path) = &self.token_file {
            if let Err(err) = fs::remove_file(path) {
                if err.kind() != io::ErrorKind::NotFound {
                    debug!("Could not remove token file {}: {err}", path.display());
                }
            }
        }
    }
}

/// Pull the credential out of the URL the identity provider redirects
/// back to. The backend embeds it as a `token` query parameter.
pub fn extract_callback_token(callback_url: &str) -> Result<Credential, ApiError> {
    let url = Url::parse(callback_url)
        .map_err(|err| ApiError::validation(format!("invalid callback URL: {err}")))?;
    url.query_pairs()
        .find(|(key, value)| key.as_ref() == "token" && !value.is_empty())
        .map(|(_, value)| Credential::new(value.into_owned()))
        .ok_or_else(|| ApiError::validation("callback URL does not carry a token"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_anonymous_and_transitions_on_credential_changes() {
        let mut session = Session::anonymous();
        assert!(!session.is_authenticated());

        session.set_credential(Credential::new("tok-1"));
        assert!(session.is_authenticated());
        assert_eq!(session.credential().unwrap().as_str(), "tok-1");

        // login replaces the credential wholesale
        session.set_credential(Credential::new("tok-2"));
        assert_eq!(session.credential().unwrap().as_str(), "tok-2");

        session.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn token_survives_between_sessions_via_the_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");

        let mut session = Session::with_token_file(&path);
        assert!(!session.is_authenticated());
        session.set_credential(Credential::new("persisted-token"));

        let restored = Session::with_token_file(&path);
        assert_eq!(restored.credential().unwrap().as_str(), "persisted-token");
    }

    #[test]
    fn clear_removes_the_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");

        let mut session = Session::with_token_file(&path);
        session.set_credential(Credential::new("short-lived"));
        assert!(path.exists());

        session.clear();
        assert!(!path.exists());
        assert!(!Session::with_token_file(&path).is_authenticated());
    }

    #[test]
    fn debug_output_never_contains_the_token() {
        let session = Session {
            credential: Some(Credential::new("super-secret")),
            token_file: None,
        };
        let printed = format!("{session:?}");
        assert!(!printed.contains("super-secret"));
    }

    #[test]
    fn callback_token_extraction() {
        let cred =
            extract_callback_token("http://localhost:5173/?token=abc123&state=xyz").unwrap();
        assert_eq!(cred.as_str(), "abc123");

        assert!(matches!(
            extract_callback_token("http://localhost:5173/?state=xyz"),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            extract_callback_token("http://localhost:5173/?token="),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            extract_callback_token("not a url at all"),
            Err(ApiError::Validation(_))
        ));
    }
}
