//! Resolved caller identity.
//!
//! The OAuth collaborator hands this backend a resolved `{email, name,
//! access token}` triple; nothing here issues or validates provider
//! credentials. The email is the stable account key for the ledger.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Validation errors returned when constructing identity components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityValidationError {
    /// Email is empty after trimming whitespace.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email has no `@` separating a local part from a domain.
    #[error("email must contain a local part and a domain")]
    MalformedEmail,
}

/// Stable account identifier supplied by the identity provider.
///
/// ## Invariants
/// - Non-empty, no surrounding whitespace, contains `local@domain`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserEmail(String);

impl UserEmail {
    /// Validate and construct a [`UserEmail`].
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(IdentityValidationError::EmptyEmail);
        }
        if raw.trim() != raw {
            return Err(IdentityValidationError::MalformedEmail);
        }
        let Some((local, domain)) = raw.split_once('@') else {
            return Err(IdentityValidationError::MalformedEmail);
        };
        if local.is_empty() || domain.is_empty() {
            return Err(IdentityValidationError::MalformedEmail);
        }
        Ok(Self(raw))
    }

    /// Borrow the address as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for UserEmail {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<UserEmail> for String {
    fn from(value: UserEmail) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserEmail {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Provider access token carried through the session.
///
/// Treated as a secret: the debug representation is redacted and the
/// backing memory is wiped on drop. The raw value is only read when
/// embedding credentials for the rewrite worker or calling the provider's
/// profile endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl Drop for AccessToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl AccessToken {
    /// Wrap a raw provider token.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret for outbound use.
    pub fn reveal(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Caller identity resolved by the identity gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    email: UserEmail,
    name: Option<String>,
    access_token: Option<AccessToken>,
}

impl Identity {
    /// Build an identity from validated components.
    pub fn new(email: UserEmail, name: Option<String>, access_token: Option<AccessToken>) -> Self {
        Self {
            email,
            name,
            access_token,
        }
    }

    /// The stable account key.
    pub fn email(&self) -> &UserEmail {
        &self.email
    }

    /// Display name from the provider, when one was supplied.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Provider access token, when the session carries one.
    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ada@example.com")]
    #[case("dev+coins@gitghost.dev")]
    fn valid_emails_are_accepted(#[case] raw: &str) {
        let email = UserEmail::new(raw).expect("valid email");
        assert_eq!(email.as_str(), raw);
    }

    #[rstest]
    #[case("", IdentityValidationError::EmptyEmail)]
    #[case("   ", IdentityValidationError::EmptyEmail)]
    #[case("no-at-sign", IdentityValidationError::MalformedEmail)]
    #[case("@example.com", IdentityValidationError::MalformedEmail)]
    #[case("ada@", IdentityValidationError::MalformedEmail)]
    #[case(" ada@example.com", IdentityValidationError::MalformedEmail)]
    fn invalid_emails_are_rejected(#[case] raw: &str, #[case] expected: IdentityValidationError) {
        assert_eq!(UserEmail::new(raw), Err(expected));
    }

    #[rstest]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("gho_secret_value");
        assert_eq!(format!("{token:?}"), "AccessToken(<redacted>)");
    }
}
