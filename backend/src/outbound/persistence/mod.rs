//! PostgreSQL persistence adapters built on Diesel.
//!
//! All cross-request coordination lives here: conditional inserts for
//! lazy account creation, relative balance adjustments, and the
//! compare-and-set coupon redemption. Nothing above this layer holds
//! locks across I/O.

mod diesel_admin_directory;
mod diesel_coupon_registry;
mod diesel_ledger_store;
mod diesel_transfer_store;
mod error_mapping;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_admin_directory::DieselAdminDirectory;
pub use diesel_coupon_registry::DieselCouponRegistry;
pub use diesel_ledger_store::DieselLedgerStore;
pub use diesel_transfer_store::DieselTransferStore;
pub use pool::{DbPool, PoolConfig, PoolError};
