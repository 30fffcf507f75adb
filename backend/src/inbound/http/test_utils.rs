//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

use crate::domain::{AccessToken, Identity, UserEmail};

/// Build a session middleware configured for tests.
///
/// Generates a fresh signing key per invocation and disables the `Secure`
/// flag so plain-HTTP test requests round-trip the cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Identity fixture for handler tests.
pub fn test_identity(email: &str) -> Identity {
    Identity::new(
        UserEmail::new(email).expect("valid test email"),
        None,
        None,
    )
}

/// Identity fixture carrying a provider name and token.
pub fn test_identity_with_token(email: &str, name: &str, token: &str) -> Identity {
    Identity::new(
        UserEmail::new(email).expect("valid test email"),
        Some(name.to_owned()),
        Some(AccessToken::new(token)),
    )
}
