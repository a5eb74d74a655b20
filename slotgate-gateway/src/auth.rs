//! HTTP Basic authentication against the single configured credential.
//!
//! The password is hashed with Argon2id once at startup; requests are
//! verified against that hash and never reach an executor when they fail.

use std::sync::Arc;

use argon2::Argon2;
use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderMap, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use subtle::ConstantTimeEq;

const REALM_CHALLENGE: &str = "Basic realm=\"Authentication Required\"";

/// Error returned when the configured credential cannot be prepared.
#[derive(Debug, thiserror::Error)]
#[error("failed to hash gateway password: {0}")]
pub struct CredentialError(String);

/// The one username/password pair the gateway accepts.
pub struct Credential {
    username: String,
    /// Argon2id PHC string with its own random salt.
    password_hash: String,
}

impl Credential {
    /// Hash `password` with a fresh salt and keep it for verification.
    ///
    /// # Errors
    /// Returns [`CredentialError`] if hashing fails.
    pub fn new(username: impl Into<String>, password: &str) -> Result<Self, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError(e.to_string()))?
            .to_string();
        Ok(Self {
            username: username.into(),
            password_hash,
        })
    }

    /// Return `true` if both the username and the password match.
    ///
    /// The password hash is checked even when the username is wrong, so the
    /// time taken does not reveal which half failed.
    #[must_use]
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let username_ok: bool = self.username.as_bytes().ct_eq(username.as_bytes()).into();
        let password_ok = PasswordHash::new(&self.password_hash)
            .is_ok_and(|hash| Argon2::default().verify_password(password.as_bytes(), &hash).is_ok());
        username_ok & password_ok
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Rejection sent for every authentication failure.
#[derive(Debug)]
pub struct Unauthorized;

impl IntoResponse for Unauthorized {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [(WWW_AUTHENTICATE, REALM_CHALLENGE)],
            "Unauthorized Access",
        )
            .into_response()
    }
}

/// Extract `(username, password)` from a `Basic` authorization header.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_owned(), password.to_owned()))
}

/// Middleware guarding every command route.
///
/// Argon2 verification is CPU-bound, so it runs on the blocking pool.
pub async fn require_basic_auth(
    State(credential): State<Arc<Credential>>,
    request: Request,
    next: Next,
) -> Response {
    let Some((username, password)) = basic_credentials(request.headers()) else {
        tracing::debug!("request without usable basic credentials");
        return Unauthorized.into_response();
    };

    let verified = tokio::task::spawn_blocking(move || credential.verify(&username, &password)).await;
    match verified {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            tracing::warn!("rejected request with wrong credentials");
            Unauthorized.into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "credential verification task failed");
            Unauthorized.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn credential() -> Credential {
        match Credential::new("gateway", "s3cret") {
            Ok(c) => c,
            Err(e) => panic!("hashing failed: {e}"),
        }
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        match HeaderValue::from_str(value) {
            Ok(v) => {
                headers.insert(AUTHORIZATION, v);
            }
            Err(e) => panic!("bad header value: {e}"),
        }
        headers
    }

    #[test]
    fn credential_accepts_only_exact_pair() {
        let cred = credential();
        assert!(cred.verify("gateway", "s3cret"));
        assert!(!cred.verify("gateway", "S3cret"), "password is case-sensitive");
        assert!(!cred.verify("other", "s3cret"), "unknown username must be rejected");
        assert!(!cred.verify("", ""));
    }

    #[test]
    fn credential_stores_salted_hash_not_password() {
        let a = credential();
        let b = credential();
        assert!(!a.password_hash.contains("s3cret"));
        assert!(a.password_hash.starts_with("$argon2id$"));
        assert_ne!(a.password_hash, b.password_hash, "each hash gets its own salt");
        assert!(!format!("{a:?}").contains("argon2"), "Debug must not print the hash");
    }

    #[test]
    fn basic_credentials_decodes_header() {
        let encoded = STANDARD.encode("gateway:pa:ss");
        let parsed = basic_credentials(&headers_with(&format!("Basic {encoded}")));
        assert_eq!(parsed, Some(("gateway".to_owned(), "pa:ss".to_owned())), "password may contain ':'");

        let lower = basic_credentials(&headers_with(&format!("basic {encoded}")));
        assert!(lower.is_some(), "scheme is case-insensitive");
    }

    #[test]
    fn basic_credentials_rejects_malformed_headers() {
        assert_eq!(basic_credentials(&HeaderMap::new()), None);
        assert_eq!(basic_credentials(&headers_with("Bearer abc")), None);
        assert_eq!(basic_credentials(&headers_with("Basic !!!not-base64")), None);
        let no_colon = STANDARD.encode("gateway");
        assert_eq!(basic_credentials(&headers_with(&format!("Basic {no_colon}"))), None);
    }

    #[test]
    fn unauthorized_response_carries_basic_challenge() {
        let resp = Unauthorized.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let challenge = resp.headers().get(WWW_AUTHENTICATE).and_then(|v| v.to_str().ok());
        assert_eq!(challenge, Some(REALM_CHALLENGE));
    }
}
