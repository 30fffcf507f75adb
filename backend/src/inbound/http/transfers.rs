//! Transfer submission HTTP handler.
//!
//! ```text
//! POST /api/v1/transfers
//! ```
//!
//! Field names mirror the transfer form's wire contract; the response
//! never echoes the credential-embedded destination URL.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, TransferSubmission};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Transfer submission payload.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct TransferRequestBody {
    /// Source repository URL.
    pub source_repo: Option<String>,
    /// Destination repository URL.
    pub dest_repo: Option<String>,
    /// Optional rewrite range start.
    pub start_date: Option<String>,
    /// Optional rewrite range end.
    pub end_date: Option<String>,
    /// Whether original commit dates are preserved; defaults to false.
    #[serde(default)]
    pub keep_original_dates: bool,
    /// Contributor names to map; blank entries are ignored by pricing.
    #[serde(default)]
    pub contributors: Vec<String>,
}

impl From<TransferRequestBody> for TransferSubmission {
    fn from(body: TransferRequestBody) -> Self {
        Self {
            source_repo: body.source_repo.unwrap_or_default(),
            dest_repo: body.dest_repo.unwrap_or_default(),
            start_date: body.start_date,
            end_date: body.end_date,
            keep_original_dates: body.keep_original_dates,
            contributors: body.contributors,
        }
    }
}

/// Accepted transfer receipt.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    /// Persisted request identifier.
    pub id: String,
    /// Exact amount debited.
    pub coins_spent: i64,
}

/// Submit a transfer request to the rewrite worker.
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = TransferRequestBody,
    responses(
        (status = 200, description = "Transfer submitted", body = TransferResponse),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 402, description = "Insufficient coins", body = Error),
        (status = 502, description = "Rewrite worker failure", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["transfers"],
    operation_id = "submitTransfer"
)]
#[post("/transfers")]
pub async fn submit_transfer(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TransferRequestBody>,
) -> ApiResult<web::Json<TransferResponse>> {
    let identity = session.require_identity()?;
    let receipt = state
        .transfers
        .submit(&identity, TransferSubmission::from(payload.into_inner()))
        .await?;
    Ok(web::Json(TransferResponse {
        id: receipt.id.to_string(),
        coins_spent: receipt.coins_spent,
    }))
}
