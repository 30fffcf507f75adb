//! Ledger service: every balance change flows through here.
//!
//! Pairs each mutation with exactly one transaction log entry and owns the
//! lazy account-creation policy. No other component may write balances.

use std::sync::Arc;

use tracing::debug;

use super::identity::{Identity, UserEmail};
use super::ports::{LedgerMutation, LedgerStore};
use super::transaction::{CoinTransaction, TransactionLink};
use super::Error;

/// Coins granted when an account is first created.
pub const STARTING_COINS: i64 = 10;

/// Reason recorded on the starting-grant transaction.
pub const WELCOME_REASON: &str = "Welcome bonus - First login reward";

/// Maximum transactions returned to self-service history callers.
const HISTORY_LIMIT: i64 = 50;

/// Orchestrates balance mutations against the [`LedgerStore`] port.
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
}

impl LedgerService {
    /// Create a service over a ledger store.
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    fn welcome_mutation(identity: &Identity) -> LedgerMutation {
        LedgerMutation {
            user_id: identity.email().clone(),
            amount: STARTING_COINS,
            reason: WELCOME_REASON.to_owned(),
            coupon_id: None,
            admin_id: None,
        }
    }

    /// Current balance, creating the account on first read.
    ///
    /// This is the single account-creation point: the store's conditional
    /// insert guarantees concurrent first reads grant the welcome bonus
    /// exactly once.
    pub async fn balance(&self, identity: &Identity) -> Result<i64, Error> {
        let welcome = Self::welcome_mutation(identity);
        let created = self.store.ensure_account(identity, &welcome).await?;
        if created {
            debug!(user = %identity.email(), "account created with starting grant");
            return Ok(STARTING_COINS);
        }

        let account = self
            .store
            .find_account(identity.email())
            .await?
            .ok_or_else(|| Error::internal("account missing after ensure"))?;
        Ok(account.coins)
    }

    /// Increase a balance, appending one transaction.
    pub async fn credit(
        &self,
        user: &UserEmail,
        amount: i64,
        reason: impl Into<String>,
        link: TransactionLink,
    ) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::invalid_amount("credit amount must be positive"));
        }
        self.apply(user, amount, reason.into(), link).await
    }

    /// Decrease a balance, appending one transaction with a negative amount.
    ///
    /// No balance floor is enforced here; callers pre-check sufficiency.
    pub async fn debit(
        &self,
        user: &UserEmail,
        amount: i64,
        reason: impl Into<String>,
    ) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::invalid_amount("debit amount must be positive"));
        }
        self.apply(user, -amount, reason.into(), TransactionLink::None)
            .await
    }

    /// Return previously debited coins; a credit with a refund reason.
    pub async fn refund(
        &self,
        user: &UserEmail,
        amount: i64,
        reason: impl Into<String>,
    ) -> Result<(), Error> {
        let reason = reason.into();
        debug!(user = %user, amount, "refunding coins");
        self.credit(user, amount, reason, TransactionLink::None)
            .await
    }

    /// Most recent transactions for the caller, newest first.
    pub async fn history(&self, user: &UserEmail) -> Result<Vec<CoinTransaction>, Error> {
        Ok(self.store.recent_transactions(user, HISTORY_LIMIT).await?)
    }

    async fn apply(
        &self,
        user: &UserEmail,
        amount: i64,
        reason: String,
        link: TransactionLink,
    ) -> Result<(), Error> {
        let mutation = LedgerMutation {
            user_id: user.clone(),
            amount,
            reason,
            coupon_id: link.coupon_id(),
            admin_id: link.admin_id().map(str::to_owned),
        };
        self.store.apply_mutation(&mutation).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::account::UserAccount;
    use crate::domain::ports::StoreError;

    /// In-memory ledger store with the same atomicity contract as the
    /// Diesel adapter: ensure is conditional, mutations are single-step.
    #[derive(Default)]
    pub(crate) struct StubLedgerStore {
        state: Mutex<StubState>,
    }

    #[derive(Default)]
    struct StubState {
        accounts: HashMap<String, UserAccount>,
        log: Vec<LedgerMutation>,
        fail_next: Option<StoreError>,
    }

    impl StubLedgerStore {
        pub(crate) fn with_account(email: &UserEmail, coins: i64, is_admin: bool) -> Self {
            let store = Self::default();
            {
                let mut state = store.state.lock().expect("state lock");
                state.accounts.insert(
                    email.as_str().to_owned(),
                    UserAccount {
                        email: email.clone(),
                        name: None,
                        coins,
                        is_admin,
                        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                    },
                );
            }
            store
        }

        pub(crate) fn fail_next(&self, error: StoreError) {
            self.state.lock().expect("state lock").fail_next = Some(error);
        }

        pub(crate) fn balance_of(&self, email: &UserEmail) -> Option<i64> {
            self.state
                .lock()
                .expect("state lock")
                .accounts
                .get(email.as_str())
                .map(|account| account.coins)
        }

        pub(crate) fn log(&self) -> Vec<LedgerMutation> {
            self.state.lock().expect("state lock").log.clone()
        }
    }

    #[async_trait]
    impl LedgerStore for StubLedgerStore {
        async fn ensure_account(
            &self,
            identity: &Identity,
            welcome: &LedgerMutation,
        ) -> Result<bool, StoreError> {
            let mut state = self.state.lock().expect("state lock");
            if let Some(error) = state.fail_next.take() {
                return Err(error);
            }
            if state.accounts.contains_key(identity.email().as_str()) {
                return Ok(false);
            }
            state.accounts.insert(
                identity.email().as_str().to_owned(),
                UserAccount {
                    email: identity.email().clone(),
                    name: identity.name().map(str::to_owned),
                    coins: welcome.amount,
                    is_admin: false,
                    created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                },
            );
            state.log.push(welcome.clone());
            Ok(true)
        }

        async fn find_account(&self, email: &UserEmail) -> Result<Option<UserAccount>, StoreError> {
            let mut state = self.state.lock().expect("state lock");
            if let Some(error) = state.fail_next.take() {
                return Err(error);
            }
            Ok(state.accounts.get(email.as_str()).cloned())
        }

        async fn apply_mutation(&self, mutation: &LedgerMutation) -> Result<(), StoreError> {
            let mut state = self.state.lock().expect("state lock");
            if let Some(error) = state.fail_next.take() {
                return Err(error);
            }
            let Some(account) = state.accounts.get_mut(mutation.user_id.as_str()) else {
                return Err(StoreError::query("account not found"));
            };
            account.coins += mutation.amount;
            state.log.push(mutation.clone());
            Ok(())
        }

        async fn recent_transactions(
            &self,
            email: &UserEmail,
            limit: i64,
        ) -> Result<Vec<CoinTransaction>, StoreError> {
            let state = self.state.lock().expect("state lock");
            let entries: Vec<CoinTransaction> = state
                .log
                .iter()
                .rev()
                .filter(|mutation| mutation.user_id == *email)
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .enumerate()
                .map(|(index, mutation)| CoinTransaction {
                    id: Uuid::new_v4(),
                    user_id: mutation.user_id.as_str().to_owned(),
                    amount: mutation.amount,
                    reason: mutation.reason.clone(),
                    coupon_id: mutation.coupon_id,
                    admin_id: mutation.admin_id.clone(),
                    created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                        + chrono::Duration::seconds(index as i64),
                })
                .collect();
            Ok(entries)
        }
    }

    pub(crate) fn identity(email: &str) -> Identity {
        Identity::new(UserEmail::new(email).expect("valid email"), None, None)
    }

    pub(crate) fn email(raw: &str) -> UserEmail {
        UserEmail::new(raw).expect("valid email")
    }

    #[tokio::test]
    async fn first_balance_read_creates_the_account_with_the_welcome_bonus() {
        let store = Arc::new(StubLedgerStore::default());
        let service = LedgerService::new(store.clone());
        let caller = identity("ada@example.com");

        let coins = service.balance(&caller).await.expect("balance");

        assert_eq!(coins, STARTING_COINS);
        let log = store.log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].reason, WELCOME_REASON);
        assert_eq!(log[0].amount, STARTING_COINS);
    }

    #[tokio::test]
    async fn repeated_balance_reads_never_grant_twice() {
        let store = Arc::new(StubLedgerStore::default());
        let service = LedgerService::new(store.clone());
        let caller = identity("ada@example.com");

        for _ in 0..3 {
            service.balance(&caller).await.expect("balance");
        }

        assert_eq!(store.log().len(), 1);
        assert_eq!(store.balance_of(caller.email()), Some(STARTING_COINS));
    }

    #[tokio::test]
    async fn balance_equals_starting_grant_plus_applied_deltas() {
        let store = Arc::new(StubLedgerStore::default());
        let service = LedgerService::new(store.clone());
        let caller = identity("ada@example.com");
        service.balance(&caller).await.expect("create account");

        let user = caller.email();
        let deltas: [i64; 4] = [5, -3, 12, -7];
        for delta in deltas {
            if delta > 0 {
                service
                    .credit(user, delta, "test credit", TransactionLink::None)
                    .await
                    .expect("credit");
            } else {
                service.debit(user, -delta, "test debit").await.expect("debit");
            }
        }

        let expected = STARTING_COINS + deltas.iter().sum::<i64>();
        assert_eq!(store.balance_of(user), Some(expected));
        // One log entry per mutation plus the welcome grant.
        assert_eq!(store.log().len(), deltas.len() + 1);
    }

    #[rstest]
    #[case(0)]
    #[case(-4)]
    #[tokio::test]
    async fn non_positive_credits_are_rejected_without_touching_the_store(#[case] amount: i64) {
        let user = email("ada@example.com");
        let store = Arc::new(StubLedgerStore::with_account(&user, 10, false));
        let service = LedgerService::new(store.clone());

        let err = service
            .credit(&user, amount, "bad", TransactionLink::None)
            .await
            .expect_err("non-positive amount");

        assert_eq!(err.code(), ErrorCode::InvalidAmount);
        assert!(store.log().is_empty());
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[tokio::test]
    async fn non_positive_debits_are_rejected(#[case] amount: i64) {
        let user = email("ada@example.com");
        let store = Arc::new(StubLedgerStore::with_account(&user, 10, false));
        let service = LedgerService::new(store.clone());

        let err = service.debit(&user, amount, "bad").await.expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::InvalidAmount);
    }

    #[tokio::test]
    async fn debit_is_unconditional_inside_the_primitive() {
        // Sufficiency checks belong to callers; the primitive applies the
        // delta even past zero.
        let user = email("ada@example.com");
        let store = Arc::new(StubLedgerStore::with_account(&user, 3, false));
        let service = LedgerService::new(store.clone());

        service.debit(&user, 5, "overdraw").await.expect("debit applies");

        assert_eq!(store.balance_of(&user), Some(-2));
    }

    #[tokio::test]
    async fn store_failures_surface_as_persistence_unavailable() {
        let store = Arc::new(StubLedgerStore::default());
        store.fail_next(StoreError::connection("pool exhausted"));
        let service = LedgerService::new(store);

        let err = service
            .balance(&identity("ada@example.com"))
            .await
            .expect_err("store failure");

        assert_eq!(err.code(), ErrorCode::PersistenceUnavailable);
    }

    #[tokio::test]
    async fn history_returns_newest_first_with_refund_reasons_intact() {
        let user = email("ada@example.com");
        let store = Arc::new(StubLedgerStore::with_account(&user, 10, false));
        let service = LedgerService::new(store);

        service.debit(&user, 5, "Repository transfer with premium features: custom dates")
            .await
            .expect("debit");
        service
            .refund(&user, 5, "Refund for failed repository transfer")
            .await
            .expect("refund");

        let history = service.history(&user).await.expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].reason, "Refund for failed repository transfer");
        assert_eq!(history[0].amount, 5);
        assert_eq!(history[1].amount, -5);
    }
}
