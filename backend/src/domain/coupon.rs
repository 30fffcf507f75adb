//! Single-use coupon codes redeemable for coins.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Human-readable prefix on every generated code.
pub const CODE_PREFIX: &str = "DEV";

/// Number of random bytes backing a generated code.
const CODE_ENTROPY_BYTES: usize = 9;

/// Validation errors returned when constructing a [`CouponCode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponCodeValidationError {
    /// Code is empty after trimming whitespace.
    #[error("coupon code must not be empty")]
    Empty,
}

/// Coupon code token.
///
/// Generated codes follow `DEV-XXXX-XXXX-XXXX` (three groups of four
/// uppercase hex characters). User-supplied codes are only trimmed and
/// required to be non-empty; unknown shapes simply fail the registry
/// lookup rather than leaking format hints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    /// Validate and construct a code from user input, trimming whitespace.
    pub fn new(value: impl AsRef<str>) -> Result<Self, CouponCodeValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CouponCodeValidationError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Generate a fresh unguessable code from the supplied entropy source.
    pub fn generate(rng: &mut dyn RngCore) -> Self {
        let mut bytes = [0u8; CODE_ENTROPY_BYTES];
        rng.fill_bytes(&mut bytes);
        let hex = hex::encode_upper(bytes);
        // 9 bytes encode to 18 hex chars; the code uses the first 12 in
        // three groups of four.
        let groups: Vec<&str> = [hex.get(0..4), hex.get(4..8), hex.get(8..12)]
            .into_iter()
            .flatten()
            .collect();
        Self(format!("{CODE_PREFIX}-{}", groups.join("-")))
    }

    /// Borrow the code as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CouponCode> for String {
    fn from(value: CouponCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for CouponCode {
    type Error = CouponCodeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A coupon redeemable exactly once for a fixed coin amount.
///
/// ## Invariants
/// - Once `is_redeemed` is true, `coins` may never again be credited for
///   this code, and `redeemed_by`/`redeemed_at` are set exactly once.
/// - Deletable only while unredeemed.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon {
    /// Registry identifier.
    pub id: Uuid,
    /// Unique unguessable token.
    pub code: CouponCode,
    /// Coin value credited on redemption.
    pub coins: i64,
    /// Redemption state; flips to true exactly once.
    pub is_redeemed: bool,
    /// Email of the redeemer, set together with `redeemed_at`.
    pub redeemed_by: Option<String>,
    /// Redemption time, set together with `redeemed_by`.
    pub redeemed_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry; redemption requires `expires_at` strictly in the future.
    pub expires_at: DateTime<Utc>,
    /// Email of the admin who generated the coupon.
    pub created_by: String,
}
