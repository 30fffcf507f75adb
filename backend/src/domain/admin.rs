//! Admin adjustment interface.
//!
//! Every privileged call re-verifies the acting identity with a fresh
//! account lookup; admin status is never cached across requests.

use std::sync::Arc;

use chrono::Months;
use mockable::Clock;
use rand::rngs::OsRng;
use tracing::info;
use uuid::Uuid;

use super::account::UserAccount;
use super::coupon::{Coupon, CouponCode};
use super::identity::{Identity, UserEmail};
use super::ledger::LedgerService;
use super::ports::{
    AdminDirectory, CouponRegistry, EnrichedTransaction, LedgerStore, LedgerTotals, Page,
    PageRequest, TransactionFilter, UserFilter,
};
use super::transaction::TransactionLink;
use super::Error;

/// Largest coupon batch a single call may generate.
pub const MAX_COUPON_BATCH: u32 = 100;

/// Page size for the admin user listing.
const USER_PAGE_SIZE: u32 = 10;

/// Page size for the admin coupon listing.
const COUPON_PAGE_SIZE: u32 = 10;

/// Page size for the admin transaction listing.
const TRANSACTION_PAGE_SIZE: u32 = 20;

/// Privileged operations over accounts, coupons, and the transaction log.
#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn LedgerStore>,
    directory: Arc<dyn AdminDirectory>,
    coupons: Arc<dyn CouponRegistry>,
    ledger: Arc<LedgerService>,
    clock: Arc<dyn Clock>,
}

impl AdminService {
    /// Create a service over the stores and the ledger.
    pub fn new(
        store: Arc<dyn LedgerStore>,
        directory: Arc<dyn AdminDirectory>,
        coupons: Arc<dyn CouponRegistry>,
        ledger: Arc<LedgerService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            directory,
            coupons,
            ledger,
            clock,
        }
    }

    /// Re-verify admin status with a fresh lookup.
    async fn require_admin(&self, acting: &Identity) -> Result<UserAccount, Error> {
        let account = self.store.find_account(acting.email()).await?;
        match account {
            Some(account) if account.is_admin => Ok(account),
            _ => Err(Error::forbidden()),
        }
    }

    /// Directly credit a target account.
    pub async fn add_coins(
        &self,
        acting: &Identity,
        target: &UserEmail,
        amount: i64,
    ) -> Result<(), Error> {
        let admin = self.require_admin(acting).await?;
        if amount <= 0 {
            return Err(Error::invalid_amount("coin amount must be positive"));
        }
        if self.store.find_account(target).await?.is_none() {
            return Err(Error::user_not_found());
        }

        self.ledger
            .credit(
                target,
                amount,
                format!("Admin added {amount} coins"),
                TransactionLink::Admin(admin.email.as_str().to_owned()),
            )
            .await?;
        info!(admin = %admin.email, target = %target, amount, "admin credit applied");
        Ok(())
    }

    /// Set a target account's admin flag.
    ///
    /// No self-protection: an admin may revoke their own status.
    pub async fn toggle_admin(
        &self,
        acting: &Identity,
        target: &UserEmail,
        is_admin: bool,
    ) -> Result<(), Error> {
        let admin = self.require_admin(acting).await?;
        let updated = self.directory.set_admin(target, is_admin).await?;
        if !updated {
            return Err(Error::user_not_found());
        }
        info!(admin = %admin.email, target = %target, is_admin, "admin flag updated");
        Ok(())
    }

    /// Generate a batch of coupons with unique codes.
    pub async fn generate_coupons(
        &self,
        acting: &Identity,
        coins_per_coupon: i64,
        count: u32,
    ) -> Result<Vec<Coupon>, Error> {
        let admin = self.require_admin(acting).await?;
        if coins_per_coupon <= 0 {
            return Err(Error::invalid_amount("coin amount must be positive"));
        }
        if count < 1 || count > MAX_COUPON_BATCH {
            return Err(Error::invalid_count(format!(
                "coupon count must be between 1 and {MAX_COUPON_BATCH}"
            )));
        }

        let now = self.clock.utc();
        let expires_at = now
            .checked_add_months(Months::new(12))
            .ok_or_else(|| Error::internal("coupon expiry overflowed the calendar"))?;

        let mut rng = OsRng;
        let coupons: Vec<Coupon> = (0..count)
            .map(|_| Coupon {
                id: Uuid::new_v4(),
                code: CouponCode::generate(&mut rng),
                coins: coins_per_coupon,
                is_redeemed: false,
                redeemed_by: None,
                redeemed_at: None,
                created_at: now,
                expires_at,
                created_by: admin.email.as_str().to_owned(),
            })
            .collect();

        self.coupons.insert_batch(&coupons).await?;
        info!(
            admin = %admin.email,
            count,
            coins = coins_per_coupon,
            "generated coupon batch"
        );
        Ok(coupons)
    }

    /// Delete a coupon, only while unredeemed.
    pub async fn delete_coupon(&self, acting: &Identity, id: Uuid) -> Result<(), Error> {
        let admin = self.require_admin(acting).await?;
        let deleted = self.coupons.delete_unredeemed(id).await?;
        if !deleted {
            return Err(Error::not_found_or_redeemed());
        }
        info!(admin = %admin.email, coupon = %id, "coupon deleted");
        Ok(())
    }

    /// Search accounts for the admin listing.
    pub async fn list_users(
        &self,
        acting: &Identity,
        filter: &UserFilter,
    ) -> Result<Page<UserAccount>, Error> {
        self.require_admin(acting).await?;
        Ok(self.directory.search_users(filter, USER_PAGE_SIZE).await?)
    }

    /// Page through all coupons, newest first.
    pub async fn list_coupons(
        &self,
        acting: &Identity,
        page: u32,
    ) -> Result<Page<Coupon>, Error> {
        self.require_admin(acting).await?;
        Ok(self
            .coupons
            .list(&PageRequest::new(page, COUPON_PAGE_SIZE))
            .await?)
    }

    /// Search the transaction log, enriched with display names.
    pub async fn list_transactions(
        &self,
        acting: &Identity,
        filter: &TransactionFilter,
    ) -> Result<Page<EnrichedTransaction>, Error> {
        self.require_admin(acting).await?;
        Ok(self
            .directory
            .search_transactions(filter, TRANSACTION_PAGE_SIZE)
            .await?)
    }

    /// Aggregate dashboard totals.
    pub async fn stats(&self, acting: &Identity) -> Result<LedgerTotals, Error> {
        self.require_admin(acting).await?;
        Ok(self.directory.totals().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::coupons::tests::{StubCouponRegistry, live_coupon};
    use crate::domain::ledger::tests::{StubLedgerStore, email, identity};
    use crate::domain::ports::StoreError;

    #[derive(Default)]
    struct StubAdminDirectory {
        known_users: Mutex<Vec<String>>,
        admin_flags: Mutex<Vec<(String, bool)>>,
    }

    impl StubAdminDirectory {
        fn with_user(email: &str) -> Self {
            Self {
                known_users: Mutex::new(vec![email.to_owned()]),
                admin_flags: Mutex::new(Vec::new()),
            }
        }

        fn flags(&self) -> Vec<(String, bool)> {
            self.admin_flags.lock().expect("flags lock").clone()
        }
    }

    #[async_trait]
    impl AdminDirectory for StubAdminDirectory {
        async fn search_users(
            &self,
            filter: &UserFilter,
            per_page: u32,
        ) -> Result<Page<UserAccount>, StoreError> {
            let users = self.known_users.lock().expect("users lock");
            let matching: Vec<UserAccount> = users
                .iter()
                .filter(|candidate| {
                    filter
                        .search
                        .as_deref()
                        .is_none_or(|needle| candidate.contains(needle))
                })
                .map(|candidate| UserAccount {
                    email: UserEmail::new(candidate.clone()).expect("valid email"),
                    name: None,
                    coins: 10,
                    is_admin: false,
                    created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                })
                .collect();
            let total = matching.len() as u64;
            Ok(Page::new(matching, filter.page.max(1), per_page, total))
        }

        async fn set_admin(&self, email: &UserEmail, is_admin: bool) -> Result<bool, StoreError> {
            let users = self.known_users.lock().expect("users lock");
            if !users.iter().any(|candidate| candidate == email.as_str()) {
                return Ok(false);
            }
            self.admin_flags
                .lock()
                .expect("flags lock")
                .push((email.as_str().to_owned(), is_admin));
            Ok(true)
        }

        async fn search_transactions(
            &self,
            filter: &TransactionFilter,
            per_page: u32,
        ) -> Result<Page<EnrichedTransaction>, StoreError> {
            Ok(Page::new(Vec::new(), filter.page.max(1), per_page, 0))
        }

        async fn totals(&self) -> Result<LedgerTotals, StoreError> {
            Ok(LedgerTotals {
                users: self.known_users.lock().expect("users lock").len() as u64,
                ..LedgerTotals::default()
            })
        }
    }

    struct Fixture {
        store: Arc<StubLedgerStore>,
        directory: Arc<StubAdminDirectory>,
        coupons: Arc<StubCouponRegistry>,
        service: AdminService,
    }

    fn fixture_with(store: StubLedgerStore, directory: StubAdminDirectory) -> Fixture {
        let store = Arc::new(store);
        let directory = Arc::new(directory);
        let coupons = Arc::new(StubCouponRegistry::default());
        let service = AdminService::new(
            store.clone(),
            directory.clone(),
            coupons.clone(),
            Arc::new(LedgerService::new(store.clone())),
            Arc::new(mockable::DefaultClock),
        );
        Fixture {
            store,
            directory,
            coupons,
            service,
        }
    }

    fn admin_fixture() -> Fixture {
        fixture_with(
            StubLedgerStore::with_account(&email("root@example.com"), 0, true),
            StubAdminDirectory::with_user("root@example.com"),
        )
    }

    #[tokio::test]
    async fn non_admins_are_forbidden_everywhere() {
        let fx = fixture_with(
            StubLedgerStore::with_account(&email("pleb@example.com"), 10, false),
            StubAdminDirectory::default(),
        );
        let caller = identity("pleb@example.com");

        let err = fx
            .service
            .generate_coupons(&caller, 5, 1)
            .await
            .expect_err("not an admin");
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let err = fx
            .service
            .stats(&caller)
            .await
            .expect_err("not an admin");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn unknown_actors_are_forbidden_not_errored() {
        let fx = admin_fixture();
        let err = fx
            .service
            .stats(&identity("ghost@example.com"))
            .await
            .expect_err("unknown actor");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn add_coins_credits_the_target_and_records_the_admin() {
        let fx = admin_fixture();
        let target = email("ada@example.com");
        {
            // Seed the target account through a balance read.
            let ledger = LedgerService::new(fx.store.clone());
            ledger.balance(&identity("ada@example.com")).await.expect("seed");
        }

        fx.service
            .add_coins(&identity("root@example.com"), &target, 30)
            .await
            .expect("credit succeeds");

        assert_eq!(fx.store.balance_of(&target), Some(40));
        let log = fx.store.log();
        let entry = log.last().expect("admin credit logged");
        assert_eq!(entry.reason, "Admin added 30 coins");
        assert_eq!(entry.admin_id.as_deref(), Some("root@example.com"));
    }

    #[rstest]
    #[case(0)]
    #[case(-10)]
    #[tokio::test]
    async fn add_coins_rejects_non_positive_amounts(#[case] amount: i64) {
        let fx = admin_fixture();
        let err = fx
            .service
            .add_coins(&identity("root@example.com"), &email("ada@example.com"), amount)
            .await
            .expect_err("invalid amount");
        assert_eq!(err.code(), ErrorCode::InvalidAmount);
    }

    #[tokio::test]
    async fn add_coins_requires_an_existing_target() {
        let fx = admin_fixture();
        let err = fx
            .service
            .add_coins(&identity("root@example.com"), &email("ghost@example.com"), 5)
            .await
            .expect_err("missing target");
        assert_eq!(err.code(), ErrorCode::UserNotFound);
        assert!(fx.store.log().is_empty());
    }

    #[tokio::test]
    async fn admins_may_revoke_their_own_status() {
        let fx = admin_fixture();
        fx.service
            .toggle_admin(
                &identity("root@example.com"),
                &email("root@example.com"),
                false,
            )
            .await
            .expect("self-revocation allowed");
        assert_eq!(fx.directory.flags(), vec![("root@example.com".to_owned(), false)]);
    }

    #[rstest]
    #[case(0, ErrorCode::InvalidCount)]
    #[case(101, ErrorCode::InvalidCount)]
    #[tokio::test]
    async fn coupon_batch_counts_are_bounded(#[case] count: u32, #[case] expected: ErrorCode) {
        let fx = admin_fixture();
        let err = fx
            .service
            .generate_coupons(&identity("root@example.com"), 5, count)
            .await
            .expect_err("count out of range");
        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn coupon_value_must_be_positive() {
        let fx = admin_fixture();
        let err = fx
            .service
            .generate_coupons(&identity("root@example.com"), 0, 5)
            .await
            .expect_err("zero-value coupons");
        assert_eq!(err.code(), ErrorCode::InvalidAmount);
    }

    #[tokio::test]
    async fn generated_batches_have_unique_codes_and_a_one_year_expiry() {
        let fx = admin_fixture();
        let coupons = fx
            .service
            .generate_coupons(&identity("root@example.com"), 5, 20)
            .await
            .expect("batch generated");

        assert_eq!(coupons.len(), 20);
        let codes: std::collections::HashSet<&str> =
            coupons.iter().map(|coupon| coupon.code.as_str()).collect();
        assert_eq!(codes.len(), 20);
        for coupon in &coupons {
            assert_eq!(coupon.coins, 5);
            assert!(!coupon.is_redeemed);
            assert_eq!(coupon.created_by, "root@example.com");
            assert_eq!(
                coupon.expires_at,
                coupon
                    .created_at
                    .checked_add_months(Months::new(12))
                    .expect("expiry")
            );
            let parts: Vec<&str> = coupon.code.as_str().split('-').collect();
            assert_eq!(parts.len(), 4);
            assert_eq!(parts[0], "DEV");
        }
    }

    #[tokio::test]
    async fn deleting_a_redeemed_coupon_is_rejected_and_leaves_it_unchanged() {
        let mut coupon = live_coupon("DEV-AAAA-BBBB-CCCC", 5);
        coupon.is_redeemed = true;
        coupon.redeemed_by = Some("ada@example.com".to_owned());
        coupon.redeemed_at = Some(Utc::now() - Duration::hours(1));
        let coupon_id = coupon.id;

        let store = StubLedgerStore::with_account(&email("root@example.com"), 0, true);
        let store = Arc::new(store);
        let coupons = Arc::new(StubCouponRegistry::with_coupon(coupon.clone()));
        let service = AdminService::new(
            store.clone(),
            Arc::new(StubAdminDirectory::with_user("root@example.com")),
            coupons.clone(),
            Arc::new(LedgerService::new(store)),
            Arc::new(mockable::DefaultClock),
        );

        let err = service
            .delete_coupon(&identity("root@example.com"), coupon_id)
            .await
            .expect_err("redeemed coupons stay");

        assert_eq!(err.code(), ErrorCode::NotFoundOrRedeemed);
        assert_eq!(coupons.coupon("DEV-AAAA-BBBB-CCCC"), Some(coupon));
    }

    #[tokio::test]
    async fn deleting_an_unredeemed_coupon_succeeds() {
        let coupon = live_coupon("DEV-AAAA-BBBB-CCCC", 5);
        let coupon_id = coupon.id;
        let fx = admin_fixture();
        fx.coupons
            .insert_batch(&[coupon])
            .await
            .expect("seed coupon");

        fx.service
            .delete_coupon(&identity("root@example.com"), coupon_id)
            .await
            .expect("unredeemed coupons can be deleted");
        assert!(fx.coupons.coupon("DEV-AAAA-BBBB-CCCC").is_none());
    }

    #[tokio::test]
    async fn user_search_filters_by_substring() {
        let fx = fixture_with(
            StubLedgerStore::with_account(&email("root@example.com"), 0, true),
            StubAdminDirectory {
                known_users: Mutex::new(vec![
                    "root@example.com".to_owned(),
                    "ada@example.com".to_owned(),
                    "grace@elsewhere.net".to_owned(),
                ]),
                admin_flags: Mutex::new(Vec::new()),
            },
        );

        let page = fx
            .service
            .list_users(
                &identity("root@example.com"),
                &UserFilter {
                    search: Some("example.com".to_owned()),
                    page: 1,
                },
            )
            .await
            .expect("search succeeds");

        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 2);
    }
}
