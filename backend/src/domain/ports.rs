//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the PostgreSQL stores, the rewrite worker, the provider profile
//! endpoint). Each trait exposes strongly typed errors so adapters map
//! their failures into predictable variants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::account::UserAccount;
use super::coupon::{Coupon, CouponCode};
use super::identity::{AccessToken, Identity, UserEmail};
use super::transaction::CoinTransaction;
use super::transfer::{TransferJob, TransferRequest};

/// Errors surfaced by the persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Database connectivity, pool checkout, or transaction failures.
    #[error("store connection failed: {message}")]
    Connection { message: String },
    /// Query construction or execution failures.
    #[error("store query failed: {message}")]
    Query { message: String },
}

impl StoreError {
    /// Helper for connection related adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

impl From<StoreError> for super::Error {
    /// Storage failures are logged with their full context here and
    /// reported generically so storage details never leak to callers.
    fn from(error: StoreError) -> Self {
        tracing::error!(error = %error, "persistence operation failed");
        Self::persistence_unavailable("Storage is temporarily unavailable")
    }
}

/// A balance change paired with its transaction log entry.
///
/// Adapters must apply the balance delta as an atomic relative adjustment
/// and insert the log row in the same database transaction; a plain
/// read-modify-write across two round trips is a correctness bug.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerMutation {
    /// Email of the account to adjust.
    pub user_id: UserEmail,
    /// Signed delta applied to the balance.
    pub amount: i64,
    /// Free-text cause recorded in the log.
    pub reason: String,
    /// Coupon back-reference, when the mutation came from a redemption.
    pub coupon_id: Option<Uuid>,
    /// Admin back-reference, when the mutation is an admin adjustment.
    pub admin_id: Option<String>,
}

/// Persistence port for balances and the append-only transaction log.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Create the account with the starting grant if it does not exist.
    ///
    /// Must be a conditional insert: concurrent first touches may race, but
    /// exactly one wins, and the welcome transaction is recorded only by
    /// the winner. Returns whether this call created the account.
    async fn ensure_account(
        &self,
        identity: &Identity,
        welcome: &LedgerMutation,
    ) -> Result<bool, StoreError>;

    /// Fetch an account by email.
    async fn find_account(&self, email: &UserEmail) -> Result<Option<UserAccount>, StoreError>;

    /// Apply a balance delta and append its transaction atomically.
    ///
    /// Fails with [`StoreError::Query`] when the account does not exist.
    async fn apply_mutation(&self, mutation: &LedgerMutation) -> Result<(), StoreError>;

    /// Most recent transactions for one account, newest first.
    async fn recent_transactions(
        &self,
        email: &UserEmail,
        limit: i64,
    ) -> Result<Vec<CoinTransaction>, StoreError>;
}

/// Persistence port for the coupon registry.
#[async_trait]
pub trait CouponRegistry: Send + Sync {
    /// Insert a freshly generated batch.
    async fn insert_batch(&self, coupons: &[Coupon]) -> Result<(), StoreError>;

    /// Atomically redeem a live coupon.
    ///
    /// Must be a single compare-and-set update conditioned on
    /// `is_redeemed = false` and an unexpired `expires_at`; returns the
    /// redeemed coupon, or `None` when no live coupon matched (unknown,
    /// expired, or lost a concurrent race — indistinguishable by design).
    async fn redeem(
        &self,
        code: &CouponCode,
        redeemed_by: &UserEmail,
        redeemed_at: DateTime<Utc>,
    ) -> Result<Option<Coupon>, StoreError>;

    /// Delete a coupon only while it is unredeemed.
    ///
    /// Returns whether a row was deleted; `false` covers both missing and
    /// already-redeemed coupons.
    async fn delete_unredeemed(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Page through all coupons, newest first.
    async fn list(&self, page: &PageRequest) -> Result<Page<Coupon>, StoreError>;
}

/// Persistence port for transfer request records.
#[async_trait]
pub trait TransferRequestStore: Send + Sync {
    /// Persist a new `pending` record before the worker is invoked.
    async fn insert(&self, request: &TransferRequest) -> Result<(), StoreError>;
}

/// Recognized filters for the admin user listing.
///
/// An explicit enumeration: `search` is a case-insensitive substring match
/// on email and display name; anything else is not a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Substring matched against email and name.
    pub search: Option<String>,
    /// One-based page number.
    pub page: u32,
}

/// Recognized filters for the admin transaction listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Substring matched against user id and reason.
    pub search: Option<String>,
    /// One-based page number.
    pub page: u32,
}

/// Fixed-size page request, one-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// One-based page number; zero is clamped to one.
    pub page: u32,
    /// Rows per page.
    pub per_page: u32,
}

impl PageRequest {
    /// Build a request, clamping the page number to at least one.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page,
        }
    }

    /// Row offset for the underlying query.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

/// One page of results plus the pagination envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// One-based page number served.
    pub page: u32,
    /// Total page count for the filter.
    pub total_pages: u32,
    /// Total row count for the filter.
    pub total: u64,
}

impl<T> Page<T> {
    /// Assemble a page, deriving `total_pages` from the row count.
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(u64::from(per_page)) as u32
        };
        Self {
            items,
            page,
            total_pages,
            total,
        }
    }
}

/// A transaction row enriched with the subject's display name for the
/// admin listing.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTransaction {
    /// The underlying log entry.
    pub transaction: CoinTransaction,
    /// Display name of the account the entry belongs to, when known.
    pub user_name: Option<String>,
}

/// Aggregate totals for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerTotals {
    /// Number of accounts.
    pub users: u64,
    /// Number of coupons ever generated.
    pub coupons: u64,
    /// Number of unredeemed coupons.
    pub active_coupons: u64,
    /// Sum of all balances.
    pub coins_in_circulation: i64,
    /// Number of transfer requests.
    pub transfers: u64,
}

/// Admin-side queries and mutations over the directory of accounts.
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    /// Search accounts, newest first, page size fixed by the caller's
    /// endpoint contract.
    async fn search_users(
        &self,
        filter: &UserFilter,
        per_page: u32,
    ) -> Result<Page<UserAccount>, StoreError>;

    /// Set an account's admin flag. Returns whether a row matched.
    async fn set_admin(&self, email: &UserEmail, is_admin: bool) -> Result<bool, StoreError>;

    /// Search the transaction log, newest first, enriched with display
    /// names.
    async fn search_transactions(
        &self,
        filter: &TransactionFilter,
        per_page: u32,
    ) -> Result<Page<EnrichedTransaction>, StoreError>;

    /// Aggregate dashboard totals.
    async fn totals(&self) -> Result<LedgerTotals, StoreError>;
}

/// Errors surfaced by the rewrite worker adapter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RewriteWorkerError {
    /// The worker answered with a non-success status.
    #[error("rewrite worker rejected the request with status {status}")]
    Rejected {
        status: u16,
        /// Decoded error payload, when the worker returned JSON.
        payload: Option<serde_json::Value>,
    },
    /// The request never completed (DNS, connect, timeout, ...).
    #[error("rewrite worker transport failure: {message}")]
    Transport { message: String },
}

impl RewriteWorkerError {
    /// Decoded upstream payload, when one is available.
    pub fn payload(&self) -> Option<serde_json::Value> {
        match self {
            Self::Rejected { payload, .. } => payload.clone(),
            Self::Transport { .. } => None,
        }
    }
}

/// Outbound port to the external rewrite worker.
#[async_trait]
pub trait RewriteWorker: Send + Sync {
    /// Submit a transfer job; success means the worker accepted it.
    async fn submit(&self, job: &TransferJob) -> Result<(), RewriteWorkerError>;
}

/// Errors surfaced by the provider profile adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderProfileError {
    /// The profile endpoint could not be reached or decoded.
    #[error("provider profile lookup failed: {message}")]
    Lookup { message: String },
}

impl ProviderProfileError {
    /// Helper for lookup failures.
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            message: message.into(),
        }
    }
}

/// Outbound port resolving the caller's provider username.
#[async_trait]
pub trait ProviderProfile: Send + Sync {
    /// Resolve the login name for an access token.
    ///
    /// `Ok(None)` means the endpoint answered but rejected the token;
    /// callers decide how unresolved usernames are treated.
    async fn username(&self, token: &AccessToken) -> Result<Option<String>, ProviderProfileError>;
}
