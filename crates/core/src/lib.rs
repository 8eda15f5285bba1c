//! Domain rules for the VocaTrack attendance platform.
//!
//! Everything in this crate is pure: no database, no HTTP. Repositories and
//! handlers load data, call into these functions, and persist the result.

pub mod academic_session;
pub mod attendance;
pub mod cache_keys;
pub mod capacity;
pub mod dashboard;
pub mod enrollment;
pub mod error;
pub mod hashing;
pub mod http_status;
pub mod qr_token;
pub mod report;
pub mod roles;
pub mod route_access;
pub mod scan_flow;
pub mod scan_rejection;
pub mod types;
