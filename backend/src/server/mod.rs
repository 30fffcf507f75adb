//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
use state_builders::build_http_state;

use actix_session::{SessionMiddleware, config::CookieContentSecurity, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use gitghost_backend::ApiDoc;
use gitghost_backend::inbound::http::admin::{
    add_coins, delete_coupon, generate_coupons, list_admin_transactions, list_coupons, list_users,
    stats, toggle_admin,
};
use gitghost_backend::inbound::http::coins::{get_coins, list_transactions};
use gitghost_backend::inbound::http::coupons::redeem_coupon;
use gitghost_backend::inbound::http::health::{HealthState, live, ready};
use gitghost_backend::inbound::http::sessions::{create_session, delete_session};
use gitghost_backend::inbound::http::state::HttpState;
use gitghost_backend::inbound::http::transfers::submit_transfer;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(create_session)
        .service(delete_session)
        .service(get_coins)
        .service(list_transactions)
        .service(redeem_coupon)
        .service(submit_transfer)
        .service(list_users)
        .service(add_coins)
        .service(toggle_admin)
        .service(list_coupons)
        .service(generate_coupons)
        .service(delete_coupon)
        .service(list_admin_transactions)
        .service(stats);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Build the HTTP server and its shared health state.
///
/// # Errors
///
/// Returns [`std::io::Error`] when outbound clients cannot be constructed
/// or the listen address cannot be bound.
pub fn create_server(config: ServerConfig) -> std::io::Result<(Server, web::Data<HealthState>)> {
    let http_state = web::Data::new(build_http_state(&config)?);
    let health_state = web::Data::new(HealthState::new());

    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
        key: config.key.clone(),
        cookie_secure: config.cookie_secure,
        same_site: config.same_site,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(config.bind_addr)?
        .run();

    Ok((server, health_state))
}
