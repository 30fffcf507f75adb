//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend
//! only on the domain services and remain testable without I/O: tests
//! build the same services over stub ports.

use std::sync::Arc;

use crate::domain::{AdminService, CouponService, LedgerService, TransferService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Balance reads, history, and every balance mutation.
    pub ledger: Arc<LedgerService>,
    /// Coupon redemption workflow.
    pub coupons: Arc<CouponService>,
    /// Transfer request workflow.
    pub transfers: Arc<TransferService>,
    /// Privileged adjustments and listings.
    pub admin: Arc<AdminService>,
}

impl HttpState {
    /// Bundle the four workflow services.
    pub fn new(
        ledger: Arc<LedgerService>,
        coupons: Arc<CouponService>,
        transfers: Arc<TransferService>,
        admin: Arc<AdminService>,
    ) -> Self {
        Self {
            ledger,
            coupons,
            transfers,
            admin,
        }
    }
}
