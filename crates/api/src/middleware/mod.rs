//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`]: Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`]: Requires `admin` or `superadmin`.
//! - [`rbac::RequireMentor`]: Requires `mentor`, `admin`, or `superadmin`.
//! - [`rbac::RequireStudent`]: Requires `student`.
//! - [`rbac::RequireAuth`]: Requires any authenticated user.

pub mod auth;
pub mod rbac;
