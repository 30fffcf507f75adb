//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses; the domain only cares about the failure category and the
//! structured details a caller needs to act on the failure.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// No identity could be resolved from the session.
    Unauthenticated,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// A numeric amount is out of range (zero or negative).
    InvalidAmount,
    /// A batch count is out of range.
    InvalidCount,
    /// A required field is missing or blank.
    MissingField,
    /// The destination repository does not belong to the requester.
    OwnershipMismatch,
    /// The coupon code is unknown, already redeemed, or expired.
    ///
    /// Deliberately undifferentiated so callers cannot enumerate codes.
    CouponInvalidOrExpired,
    /// The account balance cannot cover the requested cost.
    InsufficientCoins,
    /// The targeted user account does not exist.
    UserNotFound,
    /// The coupon does not exist or has already been redeemed.
    NotFoundOrRedeemed,
    /// The external rewrite worker rejected or never received the request.
    UpstreamSubmissionFailed,
    /// The persistence layer is unavailable or failed.
    PersistenceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use gitghost_backend::domain::{Error, ErrorCode};
///
/// let err = Error::user_not_found();
/// assert_eq!(err.code(), ErrorCode::UserNotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    #[schema(example = "insufficient_coins")]
    code: ErrorCode,
    #[schema(example = "Not enough coins for this operation")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorValidationError {
    EmptyMessage,
}

impl std::fmt::Display for ErrorValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be empty"),
        }
    }
}

impl std::error::Error for ErrorValidationError {}

impl Error {
    /// Create a new error, panicking if validation fails.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Merge an extra key into the error's details object.
    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        let mut details = match self.details.take() {
            Some(Value::Object(map)) => map,
            Some(other) => {
                let mut map = serde_json::Map::new();
                map.insert("payload".to_owned(), other);
                map
            }
            None => serde_json::Map::new(),
        };
        details.insert(key.to_owned(), value);
        self.details = Some(Value::Object(details));
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthenticated`].
    pub fn unauthenticated() -> Self {
        Self::new(ErrorCode::Unauthenticated, "Unauthorized")
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden() -> Self {
        Self::new(ErrorCode::Forbidden, "Forbidden")
    }

    /// Convenience constructor for [`ErrorCode::InvalidAmount`].
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAmount, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidCount`].
    pub fn invalid_count(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCount, message)
    }

    /// Convenience constructor for [`ErrorCode::MissingField`].
    pub fn missing_field(field: &str) -> Self {
        Self::new(ErrorCode::MissingField, format!("{field} is required"))
            .with_details(json!({ "field": field }))
    }

    /// Convenience constructor for [`ErrorCode::OwnershipMismatch`].
    pub fn ownership_mismatch() -> Self {
        Self::new(
            ErrorCode::OwnershipMismatch,
            "Destination repository must belong to your GitHub account",
        )
    }

    /// Convenience constructor for [`ErrorCode::CouponInvalidOrExpired`].
    ///
    /// The message is identical for unknown, redeemed, and expired codes.
    pub fn coupon_invalid_or_expired() -> Self {
        Self::new(
            ErrorCode::CouponInvalidOrExpired,
            "Invalid or expired coupon code",
        )
    }

    /// Convenience constructor for [`ErrorCode::InsufficientCoins`], carrying
    /// the numbers a client needs to explain the shortfall.
    pub fn insufficient_coins(required: i64, current: i64) -> Self {
        Self::new(
            ErrorCode::InsufficientCoins,
            format!("Not enough coins. You need {required} coins for this operation."),
        )
        .with_details(json!({
            "requiredCoins": required,
            "currentCoins": current,
        }))
    }

    /// Convenience constructor for [`ErrorCode::UserNotFound`].
    pub fn user_not_found() -> Self {
        Self::new(ErrorCode::UserNotFound, "User not found")
    }

    /// Convenience constructor for [`ErrorCode::NotFoundOrRedeemed`].
    pub fn not_found_or_redeemed() -> Self {
        Self::new(
            ErrorCode::NotFoundOrRedeemed,
            "Coupon not found or already redeemed",
        )
    }

    /// Convenience constructor for [`ErrorCode::UpstreamSubmissionFailed`],
    /// attaching the worker's error payload when one was decoded.
    pub fn upstream_submission_failed(payload: Option<Value>) -> Self {
        let error = Self::new(
            ErrorCode::UpstreamSubmissionFailed,
            "Failed to trigger rewrite process",
        );
        match payload {
            Some(value) => error.with_detail("upstream", value),
            None => error,
        }
    }

    /// Convenience constructor for [`ErrorCode::PersistenceUnavailable`].
    pub fn persistence_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PersistenceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            code,
            message,
            details,
        } = value;

        let mut error = Error::try_new(code, message)?;
        error.details = details;
        Ok(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::unauthenticated(), ErrorCode::Unauthenticated)]
    #[case(Error::forbidden(), ErrorCode::Forbidden)]
    #[case(Error::coupon_invalid_or_expired(), ErrorCode::CouponInvalidOrExpired)]
    #[case(Error::not_found_or_redeemed(), ErrorCode::NotFoundOrRedeemed)]
    fn constructors_set_expected_codes(#[case] error: Error, #[case] expected: ErrorCode) {
        assert_eq!(error.code(), expected);
    }

    #[rstest]
    fn insufficient_coins_carries_shortfall_numbers() {
        let error = Error::insufficient_coins(5, 3);

        let details = error.details().expect("details present");
        assert_eq!(details["requiredCoins"], 5);
        assert_eq!(details["currentCoins"], 3);
        assert!(error.message().contains("5 coins"));
    }

    #[rstest]
    fn upstream_failure_preserves_worker_payload() {
        let payload = json!({ "message": "worker exploded" });
        let error = Error::upstream_submission_failed(Some(payload.clone()));

        assert_eq!(error.code(), ErrorCode::UpstreamSubmissionFailed);
        let details = error.details().expect("details present");
        assert_eq!(details["upstream"], payload);
    }

    #[rstest]
    fn with_detail_merges_into_existing_details() {
        let error = Error::upstream_submission_failed(Some(json!({ "message": "boom" })))
            .with_detail("refundFailed", json!(true));

        let details = error.details().expect("details present");
        assert_eq!(details["refundFailed"], json!(true));
        assert_eq!(details["upstream"]["message"], "boom");
    }

    #[rstest]
    fn serialisation_round_trips_code_and_details() {
        let error = Error::insufficient_coins(7, 2);
        let encoded = serde_json::to_string(&error).expect("serialise");
        let decoded: Error = serde_json::from_str(&encoded).expect("deserialise");

        assert_eq!(decoded, error);
    }

    #[rstest]
    fn blank_messages_are_rejected() {
        let result = Error::try_new(ErrorCode::InternalError, "   ");
        assert_eq!(result, Err(ErrorValidationError::EmptyMessage));
    }
}
