//! User account aggregate.

use chrono::{DateTime, Utc};

use super::identity::UserEmail;

/// Per-user ledger account.
///
/// ## Invariants
/// - `coins` is only ever changed through a ledger mutation that also
///   appends a [`super::transaction::CoinTransaction`] in the same logical
///   operation.
/// - Created lazily with the starting grant; never deleted by this
///   subsystem.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    /// Stable account key from the identity provider.
    pub email: UserEmail,
    /// Display name captured at account creation, when known.
    pub name: Option<String>,
    /// Current balance.
    pub coins: i64,
    /// Grants access to the admin adjustment interface.
    pub is_admin: bool,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}
