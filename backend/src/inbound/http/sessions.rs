//! Identity gate HTTP handlers.
//!
//! ```text
//! POST   /api/v1/session  {"email":"...","name":"...","accessToken":"..."}
//! DELETE /api/v1/session
//! ```
//!
//! The OAuth collaborator resolves the provider identity and calls this
//! boundary with the result; no provider credential is validated here.

use actix_web::{HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{AccessToken, Error, Identity, UserEmail};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;

/// Resolved identity payload from the OAuth collaborator.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    /// Stable account email from the provider.
    pub email: String,
    /// Display name, when the provider supplied one.
    pub name: Option<String>,
    /// Provider access token for outbound calls on the user's behalf.
    pub access_token: Option<String>,
}

/// Establish the cookie session for a resolved identity.
#[utoipa::path(
    post,
    path = "/api/v1/session",
    request_body = SessionRequest,
    responses(
        (status = 204, description = "Session established", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["session"],
    operation_id = "createSession",
    security([])
)]
#[post("/session")]
pub async fn create_session(
    session: SessionContext,
    payload: web::Json<SessionRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let email = UserEmail::new(payload.email).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "email" }))
    })?;

    let identity = Identity::new(email, payload.name, payload.access_token.map(AccessToken::new));
    session.persist_identity(&identity)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Clear the session.
#[utoipa::path(
    delete,
    path = "/api/v1/session",
    responses((status = 204, description = "Session cleared")),
    tags = ["session"],
    operation_id = "deleteSession",
    security([])
)]
#[delete("/session")]
pub async fn delete_session(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}
