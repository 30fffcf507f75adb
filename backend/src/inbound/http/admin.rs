//! Admin HTTP handlers.
//!
//! ```text
//! GET    /api/v1/admin/users?search=&page=
//! POST   /api/v1/admin/users/coins
//! POST   /api/v1/admin/users/admin
//! GET    /api/v1/admin/coupons?page=
//! POST   /api/v1/admin/coupons/generate
//! DELETE /api/v1/admin/coupons/{id}
//! GET    /api/v1/admin/transactions?search=&page=
//! GET    /api/v1/admin/stats
//! ```
//!
//! The privilege check is a fresh lookup inside the admin service on every
//! call; these handlers only resolve the session identity.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{
    EnrichedTransaction, LedgerTotals, Page, TransactionFilter, UserFilter,
};
use crate::domain::{Coupon, Error, UserAccount, UserEmail};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn parse_target_email(raw: String) -> Result<UserEmail, Error> {
    UserEmail::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "userId" }))
    })
}

/// Recognized filters for the user listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct UserListQuery {
    /// Case-insensitive substring matched on email and name.
    pub search: Option<String>,
    /// One-based page number; defaults to 1.
    pub page: Option<u32>,
}

/// One account in the admin listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    /// Account email.
    pub email: String,
    /// Display name, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Current balance.
    pub coins: i64,
    /// Admin flag.
    pub is_admin: bool,
    /// Account creation time, RFC 3339.
    pub created_at: String,
}

impl From<UserAccount> for AdminUserResponse {
    fn from(account: UserAccount) -> Self {
        Self {
            email: account.email.as_str().to_owned(),
            name: account.name,
            coins: account.coins,
            is_admin: account.is_admin,
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// Paged user listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsersPageResponse {
    pub users: Vec<AdminUserResponse>,
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
}

impl From<Page<UserAccount>> for UsersPageResponse {
    fn from(page: Page<UserAccount>) -> Self {
        Self {
            users: page.items.into_iter().map(AdminUserResponse::from).collect(),
            page: page.page,
            total_pages: page.total_pages,
            total: page.total,
        }
    }
}

/// List and search accounts.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Accounts", body = UsersPageResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<UserListQuery>,
) -> ApiResult<web::Json<UsersPageResponse>> {
    let identity = session.require_identity()?;
    let filter = UserFilter {
        search: query.search.clone(),
        page: query.page.unwrap_or(1),
    };
    let page = state.admin.list_users(&identity, &filter).await?;
    Ok(web::Json(UsersPageResponse::from(page)))
}

/// Direct credit request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCoinsRequest {
    /// Target account email.
    pub user_id: String,
    /// Coins to add; must be positive.
    pub amount: i64,
}

/// Credit a target account directly.
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/coins",
    request_body = AddCoinsRequest,
    responses(
        (status = 204, description = "Coins added"),
        (status = 400, description = "Invalid amount", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Target not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminAddCoins"
)]
#[post("/admin/users/coins")]
pub async fn add_coins(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AddCoinsRequest>,
) -> ApiResult<HttpResponse> {
    let identity = session.require_identity()?;
    let payload = payload.into_inner();
    let target = parse_target_email(payload.user_id)?;
    state
        .admin
        .add_coins(&identity, &target, payload.amount)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Admin flag update request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleAdminRequest {
    /// Target account email.
    pub user_id: String,
    /// New admin status.
    pub is_admin: bool,
}

/// Set a target account's admin flag.
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/admin",
    request_body = ToggleAdminRequest,
    responses(
        (status = 204, description = "Admin status updated"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Target not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminToggleAdmin"
)]
#[post("/admin/users/admin")]
pub async fn toggle_admin(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ToggleAdminRequest>,
) -> ApiResult<HttpResponse> {
    let identity = session.require_identity()?;
    let payload = payload.into_inner();
    let target = parse_target_email(payload.user_id)?;
    state
        .admin
        .toggle_admin(&identity, &target, payload.is_admin)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Plain page query.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    /// One-based page number; defaults to 1.
    pub page: Option<u32>,
}

/// One coupon in the admin listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponResponse {
    /// Registry identifier.
    pub id: String,
    /// Redeemable code.
    pub code: String,
    /// Coin value.
    pub coins: i64,
    /// Redemption state.
    pub is_redeemed: bool,
    /// Redeemer, once redeemed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeemed_by: Option<String>,
    /// Redemption time, once redeemed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeemed_at: Option<String>,
    /// Creation time, RFC 3339.
    pub created_at: String,
    /// Expiry time, RFC 3339.
    pub expires_at: String,
    /// Generating admin.
    pub created_by: String,
}

impl From<Coupon> for CouponResponse {
    fn from(coupon: Coupon) -> Self {
        Self {
            id: coupon.id.to_string(),
            code: coupon.code.as_str().to_owned(),
            coins: coupon.coins,
            is_redeemed: coupon.is_redeemed,
            redeemed_by: coupon.redeemed_by,
            redeemed_at: coupon.redeemed_at.map(|at| at.to_rfc3339()),
            created_at: coupon.created_at.to_rfc3339(),
            expires_at: coupon.expires_at.to_rfc3339(),
            created_by: coupon.created_by,
        }
    }
}

/// Paged coupon listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponsPageResponse {
    pub coupons: Vec<CouponResponse>,
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
}

/// List coupons, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/coupons",
    params(PageQuery),
    responses(
        (status = 200, description = "Coupons", body = CouponsPageResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListCoupons"
)]
#[get("/admin/coupons")]
pub async fn list_coupons(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<CouponsPageResponse>> {
    let identity = session.require_identity()?;
    let page = state
        .admin
        .list_coupons(&identity, query.page.unwrap_or(1))
        .await?;
    Ok(web::Json(CouponsPageResponse {
        coupons: page.items.into_iter().map(CouponResponse::from).collect(),
        page: page.page,
        total_pages: page.total_pages,
        total: page.total,
    }))
}

/// Coupon batch generation request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct GenerateCouponsRequest {
    /// Coin value per coupon; must be positive.
    pub coins: i64,
    /// Batch size, between 1 and 100.
    pub count: u32,
}

/// Generated batch payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct GeneratedCouponsResponse {
    /// The freshly generated coupons, codes included.
    pub coupons: Vec<CouponResponse>,
}

/// Generate a batch of coupons.
#[utoipa::path(
    post,
    path = "/api/v1/admin/coupons/generate",
    request_body = GenerateCouponsRequest,
    responses(
        (status = 201, description = "Batch generated", body = GeneratedCouponsResponse),
        (status = 400, description = "Invalid amount or count", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminGenerateCoupons"
)]
#[post("/admin/coupons/generate")]
pub async fn generate_coupons(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<GenerateCouponsRequest>,
) -> ApiResult<HttpResponse> {
    let identity = session.require_identity()?;
    let coupons = state
        .admin
        .generate_coupons(&identity, payload.coins, payload.count)
        .await?;
    Ok(HttpResponse::Created().json(GeneratedCouponsResponse {
        coupons: coupons.into_iter().map(CouponResponse::from).collect(),
    }))
}

/// Delete an unredeemed coupon.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon identifier")),
    responses(
        (status = 204, description = "Coupon deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found or already redeemed", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteCoupon"
)]
#[delete("/admin/coupons/{id}")]
pub async fn delete_coupon(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let identity = session.require_identity()?;
    state
        .admin
        .delete_coupon(&identity, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Recognized filters for the transaction listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionListQuery {
    /// Case-insensitive substring matched on user id and reason.
    pub search: Option<String>,
    /// One-based page number; defaults to 1.
    pub page: Option<u32>,
}

/// One enriched transaction in the admin listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminTransactionResponse {
    /// Log entry identifier.
    pub id: String,
    /// Subject account email.
    pub user_email: String,
    /// Subject display name, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Signed delta.
    pub amount: i64,
    /// Cause of the change.
    pub reason: String,
    /// Coupon back-reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_id: Option<String>,
    /// Acting admin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_id: Option<String>,
    /// Entry creation time, RFC 3339.
    pub timestamp: String,
}

impl From<EnrichedTransaction> for AdminTransactionResponse {
    fn from(enriched: EnrichedTransaction) -> Self {
        let entry = enriched.transaction;
        Self {
            id: entry.id.to_string(),
            user_email: entry.user_id,
            user_name: enriched.user_name,
            amount: entry.amount,
            reason: entry.reason,
            coupon_id: entry.coupon_id.map(|id| id.to_string()),
            admin_id: entry.admin_id,
            timestamp: entry.created_at.to_rfc3339(),
        }
    }
}

/// Paged transaction listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminTransactionsPageResponse {
    pub transactions: Vec<AdminTransactionResponse>,
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
}

/// Search the transaction log across all accounts.
#[utoipa::path(
    get,
    path = "/api/v1/admin/transactions",
    params(TransactionListQuery),
    responses(
        (status = 200, description = "Transactions", body = AdminTransactionsPageResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListTransactions"
)]
#[get("/admin/transactions")]
pub async fn list_admin_transactions(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TransactionListQuery>,
) -> ApiResult<web::Json<AdminTransactionsPageResponse>> {
    let identity = session.require_identity()?;
    let filter = TransactionFilter {
        search: query.search.clone(),
        page: query.page.unwrap_or(1),
    };
    let page = state.admin.list_transactions(&identity, &filter).await?;
    Ok(web::Json(AdminTransactionsPageResponse {
        transactions: page
            .items
            .into_iter()
            .map(AdminTransactionResponse::from)
            .collect(),
        page: page.page,
        total_pages: page.total_pages,
        total: page.total,
    }))
}

/// Dashboard totals.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: u64,
    pub total_coupons: u64,
    pub active_coupons: u64,
    pub total_coins: i64,
    pub total_transfers: u64,
}

impl From<LedgerTotals> for StatsResponse {
    fn from(totals: LedgerTotals) -> Self {
        Self {
            total_users: totals.users,
            total_coupons: totals.coupons,
            active_coupons: totals.active_coupons,
            total_coins: totals.coins_in_circulation,
            total_transfers: totals.transfers,
        }
    }
}

/// Aggregate dashboard totals.
#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    responses(
        (status = 200, description = "Totals", body = StatsResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminStats"
)]
#[get("/admin/stats")]
pub async fn stats(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<StatsResponse>> {
    let identity = session.require_identity()?;
    let totals = state.admin.stats(&identity).await?;
    Ok(web::Json(StatsResponse::from(totals)))
}
