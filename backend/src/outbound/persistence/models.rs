//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. They exist solely to satisfy Diesel's type requirements for
//! queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::StoreError;
use crate::domain::{
    CoinTransaction, Coupon, CouponCode, TransferRequest, TransferStatus, UserAccount, UserEmail,
};

use super::schema::{coin_transactions, coupons, transfer_requests, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub email: String,
    pub name: Option<String>,
    pub coins: i64,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert to the domain aggregate, rejecting rows whose stored email
    /// no longer satisfies the domain invariants.
    pub(crate) fn into_domain(self) -> Result<UserAccount, StoreError> {
        let email = UserEmail::new(self.email)
            .map_err(|err| StoreError::query(format!("stored email is invalid: {err}")))?;
        Ok(UserAccount {
            email,
            name: self.name,
            coins: self.coins,
            is_admin: self.is_admin,
            created_at: self.created_at,
        })
    }
}

/// Insertable struct for lazily creating accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub email: &'a str,
    pub name: Option<&'a str>,
    pub coins: i64,
    pub is_admin: bool,
}

/// Row struct for reading from the coin_transactions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = coin_transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CoinTransactionRow {
    pub id: Uuid,
    pub user_id: String,
    pub amount: i64,
    pub reason: String,
    pub coupon_id: Option<Uuid>,
    pub admin_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CoinTransactionRow> for CoinTransaction {
    fn from(row: CoinTransactionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            amount: row.amount,
            reason: row.reason,
            coupon_id: row.coupon_id,
            admin_id: row.admin_id,
            created_at: row.created_at,
        }
    }
}

/// Insertable struct for appending transaction log entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = coin_transactions)]
pub(crate) struct NewCoinTransactionRow<'a> {
    pub id: Uuid,
    pub user_id: &'a str,
    pub amount: i64,
    pub reason: &'a str,
    pub coupon_id: Option<Uuid>,
    pub admin_id: Option<&'a str>,
}

/// Row struct for reading from the coupons table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = coupons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CouponRow {
    pub id: Uuid,
    pub code: String,
    pub coins: i64,
    pub is_redeemed: bool,
    pub redeemed_by: Option<String>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub created_by: String,
}

impl CouponRow {
    /// Convert to the domain entity.
    pub(crate) fn into_domain(self) -> Result<Coupon, StoreError> {
        let code = CouponCode::new(&self.code)
            .map_err(|err| StoreError::query(format!("stored coupon code is invalid: {err}")))?;
        Ok(Coupon {
            id: self.id,
            code,
            coins: self.coins,
            is_redeemed: self.is_redeemed,
            redeemed_by: self.redeemed_by,
            redeemed_at: self.redeemed_at,
            created_at: self.created_at,
            expires_at: self.expires_at,
            created_by: self.created_by,
        })
    }
}

/// Insertable struct for coupon batches.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = coupons)]
pub(crate) struct NewCouponRow<'a> {
    pub id: Uuid,
    pub code: &'a str,
    pub coins: i64,
    pub is_redeemed: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub created_by: &'a str,
}

impl<'a> From<&'a Coupon> for NewCouponRow<'a> {
    fn from(coupon: &'a Coupon) -> Self {
        Self {
            id: coupon.id,
            code: coupon.code.as_str(),
            coins: coupon.coins,
            is_redeemed: coupon.is_redeemed,
            created_at: coupon.created_at,
            expires_at: coupon.expires_at,
            created_by: coupon.created_by.as_str(),
        }
    }
}

/// Insertable struct for pending transfer records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transfer_requests)]
pub(crate) struct NewTransferRequestRow<'a> {
    pub id: Uuid,
    pub user_id: &'a str,
    pub source_repo: &'a str,
    pub dest_repo: &'a str,
    pub original_dest_repo: &'a str,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
    pub keep_original_dates: bool,
    pub contributors: &'a [String],
    pub coin_cost: i64,
    pub features: &'a [String],
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a TransferRequest> for NewTransferRequestRow<'a> {
    fn from(request: &'a TransferRequest) -> Self {
        Self {
            id: request.id,
            user_id: request.user_id.as_str(),
            source_repo: request.source_repo.as_str(),
            dest_repo: request.dest_repo.as_str(),
            original_dest_repo: request.original_dest_repo.as_str(),
            start_date: request.start_date.as_deref(),
            end_date: request.end_date.as_deref(),
            keep_original_dates: request.keep_original_dates,
            contributors: request.contributors.as_slice(),
            coin_cost: request.coin_cost,
            features: request.features.as_slice(),
            status: TransferStatus::as_str(request.status),
            created_at: request.created_at,
        }
    }
}
