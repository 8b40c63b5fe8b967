//! Client-side data layer: a typed HTTP client for the messaging API, a query
//! cache keyed by counterpart, and interval pollers standing in for push delivery.

pub mod cache;
pub mod http;
pub mod poller;
pub mod queries;

pub use cache::{QueryCache, QueryKey};
pub use http::MessagingClient;
pub use poller::Poller;
pub use queries::MessageQueries;

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:5500/api/v1`
    pub base_url: String,
    /// Session cookie name expected by the server
    pub cookie_name: String,
    pub request_timeout: Duration,
    /// Refetch interval for an open thread
    pub thread_poll_interval: Duration,
    /// Refetch interval for the unread badge
    pub unread_poll_interval: Duration,
    /// How long a cached query is served without refetching
    pub stale_after: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5500/api/v1".to_string(),
            cookie_name: "jwt-proconnect".to_string(),
            request_timeout: Duration::from_secs(30),
            thread_poll_interval: Duration::from_secs(5),
            unread_poll_interval: Duration::from_secs(10),
            stale_after: Duration::ZERO,
        }
    }
}
