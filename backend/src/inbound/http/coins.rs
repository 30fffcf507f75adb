//! Balance and transaction history HTTP handlers.
//!
//! ```text
//! GET /api/v1/coins
//! GET /api/v1/coins/transactions
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{CoinTransaction, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Balance payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct CoinsResponse {
    /// Current balance.
    pub coins: i64,
}

/// One transaction log entry.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Log entry identifier.
    pub id: String,
    /// Signed delta: positive credits, negative debits.
    pub amount: i64,
    /// Cause of the change.
    pub reason: String,
    /// Coupon back-reference, when the entry came from a redemption.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_id: Option<String>,
    /// Acting admin, for admin adjustments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
    /// Entry creation time, RFC 3339.
    pub timestamp: String,
}

impl From<CoinTransaction> for TransactionResponse {
    fn from(entry: CoinTransaction) -> Self {
        Self {
            id: entry.id.to_string(),
            amount: entry.amount,
            reason: entry.reason,
            coupon_id: entry.coupon_id.map(|id| id.to_string()),
            admin_id: entry.admin_id,
            timestamp: entry.created_at.to_rfc3339(),
        }
    }
}

/// Transaction history payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionsResponse {
    /// Most recent entries, newest first.
    pub transactions: Vec<TransactionResponse>,
}

/// Fetch the caller's balance, creating the account on first read.
#[utoipa::path(
    get,
    path = "/api/v1/coins",
    responses(
        (status = 200, description = "Current balance", body = CoinsResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["coins"],
    operation_id = "getCoins"
)]
#[get("/coins")]
pub async fn get_coins(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CoinsResponse>> {
    let identity = session.require_identity()?;
    let coins = state.ledger.balance(&identity).await?;
    Ok(web::Json(CoinsResponse { coins }))
}

/// Fetch the caller's most recent transactions, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/coins/transactions",
    responses(
        (status = 200, description = "Recent transactions", body = TransactionsResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["coins"],
    operation_id = "getCoinTransactions"
)]
#[get("/coins/transactions")]
pub async fn list_transactions(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<TransactionsResponse>> {
    let identity = session.require_identity()?;
    let transactions = state
        .ledger
        .history(identity.email())
        .await?
        .into_iter()
        .map(TransactionResponse::from)
        .collect();
    Ok(web::Json(TransactionsResponse { transactions }))
}
