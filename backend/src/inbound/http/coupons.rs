//! Coupon redemption HTTP handler.
//!
//! ```text
//! POST /api/v1/coupons/redeem {"code":"DEV-XXXX-XXXX-XXXX"}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Redemption request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RedeemRequest {
    /// Coupon code as typed by the user; surrounding whitespace is ignored.
    pub code: String,
}

/// Redemption result.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    /// Coins credited to the caller.
    pub coins_added: i64,
}

/// Redeem a coupon for the caller.
///
/// Unknown, expired, and already-redeemed codes all fail with the same
/// undifferentiated message.
#[utoipa::path(
    post,
    path = "/api/v1/coupons/redeem",
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Coupon redeemed", body = RedeemResponse),
        (status = 400, description = "Invalid or expired coupon code", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "redeemCoupon"
)]
#[post("/coupons/redeem")]
pub async fn redeem_coupon(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RedeemRequest>,
) -> ApiResult<web::Json<RedeemResponse>> {
    let identity = session.require_identity()?;
    let coins_added = state.coupons.redeem(&identity, &payload.code).await?;
    Ok(web::Json(RedeemResponse { coins_added }))
}
