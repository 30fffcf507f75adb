//! PostgreSQL-backed `AdminDirectory` implementation using Diesel.
//!
//! Search endpoints take the domain's explicit filter objects; the only
//! recognised filter is the case-insensitive substring match those objects
//! enumerate, so no ad hoc query assembly happens here.

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    AdminDirectory, EnrichedTransaction, LedgerTotals, Page, PageRequest, StoreError,
    TransactionFilter, UserFilter,
};
use crate::domain::{CoinTransaction, UserAccount, UserEmail};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CoinTransactionRow, UserRow};
use super::pool::DbPool;
use super::schema::{coin_transactions, coupons, transfer_requests, users};

/// Diesel-backed implementation of the `AdminDirectory` port.
#[derive(Clone)]
pub struct DieselAdminDirectory {
    pool: DbPool,
}

impl DieselAdminDirectory {
    /// Create a new directory with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn contains_pattern(search: &str) -> String {
    format!("%{search}%")
}

#[async_trait]
impl AdminDirectory for DieselAdminDirectory {
    async fn search_users(
        &self,
        filter: &UserFilter,
        per_page: u32,
    ) -> Result<Page<UserAccount>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let request = PageRequest::new(filter.page, per_page);

        let search = filter.search.as_deref().filter(|s| !s.is_empty());

        let total: i64 = match search {
            Some(needle) => {
                let pattern = contains_pattern(needle);
                users::table
                    .filter(users::email.ilike(pattern.clone()).or(users::name.ilike(pattern)))
                    .count()
                    .get_result(&mut conn)
                    .await
            }
            None => users::table.count().get_result(&mut conn).await,
        }
        .map_err(map_diesel_error)?;

        let mut query = users::table.select(UserRow::as_select()).into_boxed();
        if let Some(needle) = search {
            let pattern = contains_pattern(needle);
            query = query.filter(
                users::email
                    .ilike(pattern.clone())
                    .or(users::name.ilike(pattern)),
            );
        }

        let rows: Vec<UserRow> = query
            .order(users::created_at.desc())
            .offset(request.offset())
            .limit(i64::from(request.per_page))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(UserRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(
            items,
            request.page,
            request.per_page,
            total.try_into().unwrap_or(0),
        ))
    }

    async fn set_admin(&self, email: &UserEmail, is_admin: bool) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(users::table.filter(users::email.eq(email.as_str())))
            .set(users::is_admin.eq(is_admin))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn search_transactions(
        &self,
        filter: &TransactionFilter,
        per_page: u32,
    ) -> Result<Page<EnrichedTransaction>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let request = PageRequest::new(filter.page, per_page);

        let search = filter.search.as_deref().filter(|s| !s.is_empty());

        let total: i64 = match search {
            Some(needle) => {
                let pattern = contains_pattern(needle);
                coin_transactions::table
                    .filter(
                        coin_transactions::user_id
                            .ilike(pattern.clone())
                            .or(coin_transactions::reason.ilike(pattern)),
                    )
                    .count()
                    .get_result(&mut conn)
                    .await
            }
            None => {
                coin_transactions::table
                    .count()
                    .get_result(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;

        let mut query = coin_transactions::table
            .left_join(users::table.on(users::email.eq(coin_transactions::user_id)))
            .select((CoinTransactionRow::as_select(), users::name.nullable()))
            .into_boxed();
        if let Some(needle) = search {
            let pattern = contains_pattern(needle);
            query = query.filter(
                coin_transactions::user_id
                    .ilike(pattern.clone())
                    .or(coin_transactions::reason.ilike(pattern)),
            );
        }

        let rows: Vec<(CoinTransactionRow, Option<String>)> = query
            .order(coin_transactions::created_at.desc())
            .offset(request.offset())
            .limit(i64::from(request.per_page))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(|(row, user_name)| EnrichedTransaction {
                transaction: CoinTransaction::from(row),
                user_name,
            })
            .collect();

        Ok(Page::new(
            items,
            request.page,
            request.per_page,
            total.try_into().unwrap_or(0),
        ))
    }

    async fn totals(&self) -> Result<LedgerTotals, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let user_count: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let coupon_count: i64 = coupons::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let active_coupon_count: i64 = coupons::table
            .filter(coupons::is_redeemed.eq(false))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let coins_in_circulation: i64 = users::table
            .select(sql::<BigInt>("COALESCE(SUM(coins), 0)"))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let transfer_count: i64 = transfer_requests::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(LedgerTotals {
            users: user_count.try_into().unwrap_or(0),
            coupons: coupon_count.try_into().unwrap_or(0),
            active_coupons: active_coupon_count.try_into().unwrap_or(0),
            coins_in_circulation,
            transfers: transfer_count.try_into().unwrap_or(0),
        })
    }
}
