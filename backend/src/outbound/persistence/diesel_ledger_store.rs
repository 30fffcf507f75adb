//! PostgreSQL-backed `LedgerStore` implementation using Diesel.
//!
//! Concurrency contract: balance changes are expressed as relative SQL
//! adjustments (`coins = coins + delta`) and account creation is a
//! conditional insert, so concurrent handlers coordinate entirely through
//! the database. Each balance change and its log entry commit in one
//! database transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::ports::{LedgerMutation, LedgerStore, StoreError};
use crate::domain::{CoinTransaction, Identity, UserAccount, UserEmail};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CoinTransactionRow, NewCoinTransactionRow, NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::{coin_transactions, users};

/// Diesel-backed implementation of the `LedgerStore` port.
#[derive(Clone)]
pub struct DieselLedgerStore {
    pool: DbPool,
}

impl DieselLedgerStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn transaction_row<'a>(mutation: &'a LedgerMutation) -> NewCoinTransactionRow<'a> {
    NewCoinTransactionRow {
        id: Uuid::new_v4(),
        user_id: mutation.user_id.as_str(),
        amount: mutation.amount,
        reason: mutation.reason.as_str(),
        coupon_id: mutation.coupon_id,
        admin_id: mutation.admin_id.as_deref(),
    }
}

#[async_trait]
impl LedgerStore for DieselLedgerStore {
    async fn ensure_account(
        &self,
        identity: &Identity,
        welcome: &LedgerMutation,
    ) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            email: identity.email().as_str(),
            name: identity.name(),
            coins: welcome.amount,
            is_admin: false,
        };
        let welcome_row = transaction_row(welcome);

        // Concurrent first touches race on the conditional insert; only
        // the winner inserts a row, and only the winner logs the grant.
        let created = conn
            .transaction(|conn| {
                async move {
                    let inserted = diesel::insert_into(users::table)
                        .values(&new_row)
                        .on_conflict(users::email)
                        .do_nothing()
                        .execute(conn)
                        .await?;
                    if inserted == 0 {
                        return Ok(false);
                    }
                    diesel::insert_into(coin_transactions::table)
                        .values(&welcome_row)
                        .execute(conn)
                        .await?;
                    Ok(true)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(created)
    }

    async fn find_account(&self, email: &UserEmail) -> Result<Option<UserAccount>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(UserRow::into_domain).transpose()
    }

    async fn apply_mutation(&self, mutation: &LedgerMutation) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let log_row = transaction_row(mutation);
        let email = mutation.user_id.as_str();
        let amount = mutation.amount;

        conn.transaction(|conn| {
            async move {
                let updated = diesel::update(users::table.filter(users::email.eq(email)))
                    .set(users::coins.eq(users::coins + amount))
                    .execute(conn)
                    .await?;
                if updated == 0 {
                    return Err(diesel::result::Error::NotFound);
                }
                diesel::insert_into(coin_transactions::table)
                    .values(&log_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn recent_transactions(
        &self,
        email: &UserEmail,
        limit: i64,
    ) -> Result<Vec<CoinTransaction>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CoinTransactionRow> = coin_transactions::table
            .filter(coin_transactions::user_id.eq(email.as_str()))
            .order(coin_transactions::created_at.desc())
            .limit(limit)
            .select(CoinTransactionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(CoinTransaction::from).collect())
    }
}
