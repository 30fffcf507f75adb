//! Append-only coin transaction log entries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One entry in the append-only transaction log.
///
/// Immutable once created. The sum of a user's `amount`s plus the starting
/// grant equals their current balance.
#[derive(Debug, Clone, PartialEq)]
pub struct CoinTransaction {
    /// Log entry identifier.
    pub id: Uuid,
    /// Email of the account the entry belongs to.
    pub user_id: String,
    /// Signed delta: positive for credits, negative for debits.
    pub amount: i64,
    /// Free-text cause of the change.
    pub reason: String,
    /// Back-reference to the coupon that caused a credit, if any.
    pub coupon_id: Option<Uuid>,
    /// Email of the admin who caused the change, if any.
    pub admin_id: Option<String>,
    /// Entry creation time.
    pub created_at: DateTime<Utc>,
}

/// Cause linkage recorded alongside a ledger mutation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TransactionLink {
    /// Organic mutation with no correlated cause record.
    #[default]
    None,
    /// Credit caused by redeeming the referenced coupon.
    Coupon(Uuid),
    /// Adjustment performed by the referenced admin.
    Admin(String),
}

impl TransactionLink {
    /// Coupon back-reference, when this link is a coupon.
    pub fn coupon_id(&self) -> Option<Uuid> {
        match self {
            Self::Coupon(id) => Some(*id),
            _ => None,
        }
    }

    /// Admin back-reference, when this link is an admin action.
    pub fn admin_id(&self) -> Option<&str> {
        match self {
            Self::Admin(email) => Some(email.as_str()),
            _ => None,
        }
    }
}
