//! Domain primitives, services, and ports.
//!
//! Purpose: the transport-agnostic core of the coin ledger. Entities are
//! strongly typed with documented invariants; services orchestrate the
//! workflows over ports; adapters live under `inbound`/`outbound`.
//!
//! Public surface:
//! - [`Error`]/[`ErrorCode`] — the failure taxonomy adapters map to HTTP.
//! - [`Identity`]/[`UserEmail`]/[`AccessToken`] — resolved caller identity.
//! - [`LedgerService`], [`CouponService`], [`TransferService`],
//!   [`AdminService`] — the four workflow entry points.

pub mod account;
pub mod admin;
pub mod coupon;
pub mod coupons;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod ports;
pub mod pricing;
pub mod transaction;
pub mod transfer;
pub mod transfers;

pub use self::account::UserAccount;
pub use self::admin::AdminService;
pub use self::coupon::{Coupon, CouponCode};
pub use self::coupons::CouponService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identity::{AccessToken, Identity, IdentityValidationError, UserEmail};
pub use self::ledger::{LedgerService, STARTING_COINS, WELCOME_REASON};
pub use self::transaction::{CoinTransaction, TransactionLink};
pub use self::transfer::{TransferJob, TransferRequest, TransferStatus};
pub use self::transfers::{TransferReceipt, TransferService, TransferSubmission};

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;
