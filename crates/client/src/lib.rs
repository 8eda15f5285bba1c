//! Typed client for the VocaTrack REST API.
//!
//! [`ApiClient`] wraps the HTTP surface, [`cache::CachedApi`] adds a read
//! cache that mutations invalidate, [`scanner::Scanner`] drives the scan
//! state machine against a [`scanner::ScanSubmitter`], and [`watch`] polls
//! reports and history for display refresh.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod scanner;
pub mod watch;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::ClientError;
