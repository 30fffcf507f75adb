//! Wiring from configuration to the HTTP dependency bundle.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use gitghost_backend::domain::{
    AdminService, CouponService, LedgerService, TransferService,
};
use gitghost_backend::inbound::http::state::HttpState;
use gitghost_backend::outbound::github::GithubProfileClient;
use gitghost_backend::outbound::persistence::{
    DieselAdminDirectory, DieselCouponRegistry, DieselLedgerStore, DieselTransferStore,
};
use gitghost_backend::outbound::rewrite::HttpRewriteWorker;

use super::ServerConfig;

/// Build the full service graph over the Diesel adapters.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let pool = config.db_pool.clone();
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let store = Arc::new(DieselLedgerStore::new(pool.clone()));
    let registry = Arc::new(DieselCouponRegistry::new(pool.clone()));
    let ledger = Arc::new(LedgerService::new(store.clone()));

    let worker = HttpRewriteWorker::new(config.worker_endpoint.clone())
        .map_err(|err| std::io::Error::other(format!("rewrite worker client failed: {err}")))?;
    let profile = GithubProfileClient::new()
        .map_err(|err| std::io::Error::other(format!("profile client failed: {err}")))?;

    let coupons = Arc::new(CouponService::new(
        registry.clone(),
        ledger.clone(),
        clock.clone(),
    ));
    let transfers = Arc::new(TransferService::new(
        ledger.clone(),
        Arc::new(DieselTransferStore::new(pool.clone())),
        Arc::new(worker),
        Arc::new(profile),
        clock.clone(),
    ));
    let admin = Arc::new(AdminService::new(
        store,
        Arc::new(DieselAdminDirectory::new(pool)),
        registry,
        ledger.clone(),
        clock,
    ));

    Ok(HttpState::new(ledger, coupons, transfers, admin))
}
