//! PostgreSQL-backed `CouponRegistry` implementation using Diesel.
//!
//! Redemption is a single conditional UPDATE: the transition from
//! unredeemed to redeemed happens only when the row is still live at
//! write time, so two concurrent redemptions of the same code can never
//! both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CouponRegistry, Page, PageRequest, StoreError};
use crate::domain::{Coupon, CouponCode, UserEmail};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CouponRow, NewCouponRow};
use super::pool::DbPool;
use super::schema::coupons;

/// Diesel-backed implementation of the `CouponRegistry` port.
#[derive(Clone)]
pub struct DieselCouponRegistry {
    pool: DbPool,
}

impl DieselCouponRegistry {
    /// Create a new registry with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CouponRegistry for DieselCouponRegistry {
    async fn insert_batch(&self, batch: &[Coupon]) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<NewCouponRow<'_>> = batch.iter().map(NewCouponRow::from).collect();
        diesel::insert_into(coupons::table)
            .values(&rows)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn redeem(
        &self,
        code: &CouponCode,
        redeemed_by: &UserEmail,
        redeemed_at: DateTime<Utc>,
    ) -> Result<Option<Coupon>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Compare-and-set: the filter re-checks liveness at write time, so
        // a lost race reports zero rows exactly like an unknown code.
        let row: Option<CouponRow> = diesel::update(
            coupons::table.filter(
                coupons::code
                    .eq(code.as_str())
                    .and(coupons::is_redeemed.eq(false))
                    .and(coupons::expires_at.gt(redeemed_at)),
            ),
        )
        .set((
            coupons::is_redeemed.eq(true),
            coupons::redeemed_by.eq(redeemed_by.as_str()),
            coupons::redeemed_at.eq(redeemed_at),
        ))
        .returning(CouponRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(CouponRow::into_domain).transpose()
    }

    async fn delete_unredeemed(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            coupons::table.filter(coupons::id.eq(id).and(coupons::is_redeemed.eq(false))),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn list(&self, page: &PageRequest) -> Result<Page<Coupon>, StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = coupons::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<CouponRow> = coupons::table
            .order(coupons::created_at.desc())
            .offset(page.offset())
            .limit(i64::from(page.per_page))
            .select(CouponRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(CouponRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(
            items,
            page.page,
            page.per_page,
            total.try_into().unwrap_or(0),
        ))
    }
}
