//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated specification for the REST API:
//! every inbound path, the shared error envelope, and the session cookie
//! security scheme. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/session.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "GitGhost backend API",
        description = "Coin ledger, coupon redemption, and transfer submission."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::sessions::create_session,
        crate::inbound::http::sessions::delete_session,
        crate::inbound::http::coins::get_coins,
        crate::inbound::http::coins::list_transactions,
        crate::inbound::http::coupons::redeem_coupon,
        crate::inbound::http::transfers::submit_transfer,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::add_coins,
        crate::inbound::http::admin::toggle_admin,
        crate::inbound::http::admin::list_coupons,
        crate::inbound::http::admin::generate_coupons,
        crate::inbound::http::admin::delete_coupon,
        crate::inbound::http::admin::list_admin_transactions,
        crate::inbound::http::admin::stats,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode)),
    tags(
        (name = "session", description = "Identity gate boundary"),
        (name = "coins", description = "Balances and transaction history"),
        (name = "coupons", description = "Coupon redemption"),
        (name = "transfers", description = "Repository transfer submission"),
        (name = "admin", description = "Privileged adjustments and listings"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn every_surface_path_is_registered() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for expected in [
            "/api/v1/session",
            "/api/v1/coins",
            "/api/v1/coins/transactions",
            "/api/v1/coupons/redeem",
            "/api/v1/transfers",
            "/api/v1/admin/users",
            "/api/v1/admin/coupons/generate",
            "/api/v1/admin/stats",
        ] {
            assert!(paths.contains_key(expected), "missing path {expected}");
        }
    }

    #[test]
    fn error_schema_is_exported() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.keys().any(|name| name.ends_with("Error")));
    }
}
