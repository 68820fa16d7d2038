//! Authentication adapters.

mod http_auth_client;

pub use http_auth_client::HttpAuthClient;
