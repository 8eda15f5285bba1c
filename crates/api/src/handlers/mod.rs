//! Request handlers, one module per resource.
//!
//! Handlers validate input with `vocatrack_core` rules, delegate to the
//! repositories in `vocatrack_db`, and map errors via [`crate::error::AppError`].

pub mod academic_sessions;
pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod enrollments;
pub mod groups;
pub mod qr;
pub mod scans;
pub mod skills;
