//! Outbound adapter for the external rewrite worker.

mod http_worker;

pub use http_worker::HttpRewriteWorker;
