//! GitGhost backend library modules.
//!
//! A hexagonal actix-web service: the coin ledger and coupon registry
//! domain sits in [`domain`], PostgreSQL and outbound HTTP adapters in
//! [`outbound`], and the REST surface in [`inbound`].

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
