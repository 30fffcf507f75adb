//! Outbound adapter for the provider profile endpoint.

mod profile_client;

pub use profile_client::GithubProfileClient;
