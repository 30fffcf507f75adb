//! PostgreSQL-backed `TransferRequestStore` implementation using Diesel.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::TransferRequest;
use crate::domain::ports::{StoreError, TransferRequestStore};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewTransferRequestRow;
use super::pool::DbPool;
use super::schema::transfer_requests;

/// Diesel-backed implementation of the `TransferRequestStore` port.
///
/// Insert-only on this side; the rewrite worker updates the record's
/// status out-of-band through its own access path.
#[derive(Clone)]
pub struct DieselTransferStore {
    pool: DbPool,
}

impl DieselTransferStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransferRequestStore for DieselTransferStore {
    async fn insert(&self, request: &TransferRequest) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(transfer_requests::table)
            .values(NewTransferRequestRow::from(request))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
