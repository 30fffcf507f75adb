//! Coupon redemption workflow.
//!
//! Validation, the compare-and-set redemption, and the ledger credit are
//! one unit: when the conditional update loses a race the caller sees the
//! same undifferentiated failure as for an unknown or expired code, and no
//! credit is issued.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use super::coupon::CouponCode;
use super::identity::Identity;
use super::ledger::LedgerService;
use super::ports::CouponRegistry;
use super::transaction::TransactionLink;
use super::Error;

/// Redeems coupons against the registry and credits the ledger.
#[derive(Clone)]
pub struct CouponService {
    registry: Arc<dyn CouponRegistry>,
    ledger: Arc<LedgerService>,
    clock: Arc<dyn Clock>,
}

impl CouponService {
    /// Create a service over the registry and ledger.
    pub fn new(
        registry: Arc<dyn CouponRegistry>,
        ledger: Arc<LedgerService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            ledger,
            clock,
        }
    }

    /// Redeem a coupon code for the caller; returns the coins added.
    ///
    /// The registry performs a single conditional update transitioning
    /// `is_redeemed` from false to true; zero matched rows — unknown code,
    /// expired code, or a lost race — all collapse into
    /// [`Error::coupon_invalid_or_expired`] so codes cannot be enumerated.
    pub async fn redeem(&self, identity: &Identity, raw_code: &str) -> Result<i64, Error> {
        let code = CouponCode::new(raw_code).map_err(|_| Error::missing_field("code"))?;

        let redeemed = self
            .registry
            .redeem(&code, identity.email(), self.clock.utc())
            .await?;

        let Some(coupon) = redeemed else {
            warn!(user = %identity.email(), "coupon redemption refused");
            return Err(Error::coupon_invalid_or_expired());
        };

        self.ledger
            .credit(
                identity.email(),
                coupon.coins,
                format!("Redeemed coupon: {code}"),
                TransactionLink::Coupon(coupon.id),
            )
            .await?;

        info!(user = %identity.email(), coins = coupon.coins, "coupon redeemed");
        Ok(coupon.coins)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use mockable::DefaultClock;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::coupon::Coupon;
    use crate::domain::identity::UserEmail;
    use crate::domain::ledger::tests::{StubLedgerStore, identity};
    use crate::domain::ports::{Page, PageRequest, StoreError};

    /// Registry stub faithful to the compare-and-set contract: redemption
    /// mutates under one lock, so exactly one concurrent caller can win.
    #[derive(Default)]
    pub(crate) struct StubCouponRegistry {
        state: Mutex<HashMap<String, Coupon>>,
    }

    impl StubCouponRegistry {
        pub(crate) fn with_coupon(coupon: Coupon) -> Self {
            let registry = Self::default();
            registry
                .state
                .lock()
                .expect("state lock")
                .insert(coupon.code.as_str().to_owned(), coupon);
            registry
        }

        pub(crate) fn coupon(&self, code: &str) -> Option<Coupon> {
            self.state.lock().expect("state lock").get(code).cloned()
        }
    }

    #[async_trait]
    impl CouponRegistry for StubCouponRegistry {
        async fn insert_batch(&self, coupons: &[Coupon]) -> Result<(), StoreError> {
            let mut state = self.state.lock().expect("state lock");
            for coupon in coupons {
                state.insert(coupon.code.as_str().to_owned(), coupon.clone());
            }
            Ok(())
        }

        async fn redeem(
            &self,
            code: &CouponCode,
            redeemed_by: &UserEmail,
            redeemed_at: DateTime<Utc>,
        ) -> Result<Option<Coupon>, StoreError> {
            let mut state = self.state.lock().expect("state lock");
            let Some(coupon) = state.get_mut(code.as_str()) else {
                return Ok(None);
            };
            if coupon.is_redeemed || coupon.expires_at <= redeemed_at {
                return Ok(None);
            }
            coupon.is_redeemed = true;
            coupon.redeemed_by = Some(redeemed_by.as_str().to_owned());
            coupon.redeemed_at = Some(redeemed_at);
            Ok(Some(coupon.clone()))
        }

        async fn delete_unredeemed(&self, id: Uuid) -> Result<bool, StoreError> {
            let mut state = self.state.lock().expect("state lock");
            let Some(code) = state
                .iter()
                .find(|(_, coupon)| coupon.id == id && !coupon.is_redeemed)
                .map(|(code, _)| code.clone())
            else {
                return Ok(false);
            };
            state.remove(&code);
            Ok(true)
        }

        async fn list(&self, page: &PageRequest) -> Result<Page<Coupon>, StoreError> {
            let state = self.state.lock().expect("state lock");
            let mut items: Vec<Coupon> = state.values().cloned().collect();
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let total = items.len() as u64;
            Ok(Page::new(items, page.page, page.per_page, total))
        }
    }

    pub(crate) fn live_coupon(code: &str, coins: i64) -> Coupon {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Coupon {
            id: Uuid::new_v4(),
            code: CouponCode::new(code).expect("valid code"),
            coins,
            is_redeemed: false,
            redeemed_by: None,
            redeemed_at: None,
            created_at: created,
            expires_at: Utc::now() + Duration::days(30),
            created_by: "admin@example.com".to_owned(),
        }
    }

    fn service(
        registry: Arc<StubCouponRegistry>,
        store: Arc<StubLedgerStore>,
    ) -> CouponService {
        CouponService::new(
            registry,
            Arc::new(LedgerService::new(store)),
            Arc::new(DefaultClock),
        )
    }

    #[tokio::test]
    async fn redeeming_a_live_coupon_credits_its_value() {
        let coupon = live_coupon("DEV-AAAA-BBBB-CCCC", 25);
        let coupon_id = coupon.id;
        let registry = Arc::new(StubCouponRegistry::with_coupon(coupon));
        let caller = identity("ada@example.com");
        let store = Arc::new(StubLedgerStore::with_account(caller.email(), 10, false));

        let added = service(registry.clone(), store.clone())
            .redeem(&caller, " DEV-AAAA-BBBB-CCCC ")
            .await
            .expect("redeems");

        assert_eq!(added, 25);
        assert_eq!(store.balance_of(caller.email()), Some(35));
        let log = store.log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].reason, "Redeemed coupon: DEV-AAAA-BBBB-CCCC");
        assert_eq!(log[0].coupon_id, Some(coupon_id));

        let stored = registry.coupon("DEV-AAAA-BBBB-CCCC").expect("still present");
        assert!(stored.is_redeemed);
        assert_eq!(stored.redeemed_by.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn unknown_and_expired_codes_fail_identically() {
        let mut expired = live_coupon("DEV-0000-0000-0000", 5);
        expired.expires_at = Utc::now() - Duration::days(1);
        let registry = Arc::new(StubCouponRegistry::with_coupon(expired));
        let caller = identity("ada@example.com");
        let store = Arc::new(StubLedgerStore::with_account(caller.email(), 10, false));
        let service = service(registry, store.clone());

        let missing = service
            .redeem(&caller, "DEV-FFFF-FFFF-FFFF")
            .await
            .expect_err("unknown code");
        let expired = service
            .redeem(&caller, "DEV-0000-0000-0000")
            .await
            .expect_err("expired code");

        assert_eq!(missing.code(), ErrorCode::CouponInvalidOrExpired);
        assert_eq!(expired.code(), ErrorCode::CouponInvalidOrExpired);
        assert_eq!(missing.message(), expired.message());
        assert!(store.log().is_empty());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn blank_codes_are_a_missing_field(#[case] raw: &str) {
        let registry = Arc::new(StubCouponRegistry::default());
        let caller = identity("ada@example.com");
        let store = Arc::new(StubLedgerStore::with_account(caller.email(), 10, false));

        let err = service(registry, store)
            .redeem(&caller, raw)
            .await
            .expect_err("blank code");

        assert_eq!(err.code(), ErrorCode::MissingField);
    }

    #[tokio::test]
    async fn concurrent_redemptions_produce_exactly_one_winner() {
        let coupon = live_coupon("DEV-AAAA-BBBB-CCCC", 25);
        let registry = Arc::new(StubCouponRegistry::with_coupon(coupon));
        let ada = identity("ada@example.com");
        let grace = identity("grace@example.com");
        let ada_store = Arc::new(StubLedgerStore::with_account(ada.email(), 10, false));
        let grace_store = Arc::new(StubLedgerStore::with_account(grace.email(), 10, false));

        let ada_service = service(registry.clone(), ada_store.clone());
        let grace_service = service(registry.clone(), grace_store.clone());

        let (first, second) = tokio::join!(
            ada_service.redeem(&ada, "DEV-AAAA-BBBB-CCCC"),
            grace_service.redeem(&grace, "DEV-AAAA-BBBB-CCCC"),
        );

        let outcomes = [first, second];
        let wins = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        let losses = outcomes
            .iter()
            .filter(|outcome| {
                outcome
                    .as_ref()
                    .err()
                    .is_some_and(|e| e.code() == ErrorCode::CouponInvalidOrExpired)
            })
            .count();
        assert_eq!(wins, 1);
        assert_eq!(losses, 1);

        // Exactly one balance grew, by exactly the coupon's value.
        let credited: i64 = ada_store.balance_of(ada.email()).unwrap_or(0)
            + grace_store.balance_of(grace.email()).unwrap_or(0);
        assert_eq!(credited, 10 + 10 + 25);
        let stored = registry.coupon("DEV-AAAA-BBBB-CCCC").expect("present");
        assert!(stored.is_redeemed);
    }
}
