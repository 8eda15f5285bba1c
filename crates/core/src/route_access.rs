//! Role-based access rules for front-end page paths.
//!
//! The gateway resolves the caller's role from the session, then asks
//! [`decide`] whether to serve the page, send the caller to sign in, or send
//! them home.

use crate::roles::{is_admin, ROLE_MENTOR, ROLE_STUDENT};

/// Path prefixes that require an authenticated session.
pub const PROTECTED_PREFIXES: &[&str] = &[
    "/admin",
    "/mentor",
    "/student",
    "/dashboard",
    "/settings",
    "/profile",
];

/// Sign-in page the guard redirects anonymous callers to.
pub const SIGN_IN_PATH: &str = "/auth/sign_in";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageDecision {
    Allow,
    RedirectToSignIn { location: String },
    RedirectHome,
}

/// Whether a path falls under a protected prefix.
pub fn protected_prefix(path: &str) -> Option<&'static str> {
    PROTECTED_PREFIXES
        .iter()
        .copied()
        .find(|prefix| path == *prefix || path.starts_with(&format!("{prefix}/")))
}

/// Whether `role` may view pages under `prefix`.
pub fn role_allows(prefix: &str, role: &str) -> bool {
    match prefix {
        "/admin" => is_admin(role),
        "/mentor" => role == ROLE_MENTOR,
        "/student" => role == ROLE_STUDENT,
        _ => true,
    }
}

/// Decide what to do with a page request.
///
/// `role` is `None` when the session is missing or failed validation.
pub fn decide(path: &str, role: Option<&str>) -> PageDecision {
    let Some(prefix) = protected_prefix(path) else {
        return PageDecision::Allow;
    };

    match role {
        None => PageDecision::RedirectToSignIn {
            location: sign_in_location(path),
        },
        Some(role) if role_allows(prefix, role) => PageDecision::Allow,
        Some(_) => PageDecision::RedirectHome,
    }
}

/// `/auth/sign_in?redirect=<path>` with the path percent-encoded.
pub fn sign_in_location(path: &str) -> String {
    format!("{SIGN_IN_PATH}?redirect={}", encode_query_component(path))
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_query_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths_are_allowed_without_session() {
        assert_eq!(decide("/", None), PageDecision::Allow);
        assert_eq!(decide("/auth/sign_in", None), PageDecision::Allow);
        assert_eq!(decide("/administrator", None), PageDecision::Allow);
    }

    #[test]
    fn anonymous_caller_is_sent_to_sign_in_with_return_path() {
        assert_eq!(
            decide("/mentor/groups", None),
            PageDecision::RedirectToSignIn {
                location: "/auth/sign_in?redirect=%2Fmentor%2Fgroups".to_string()
            }
        );
    }

    #[test]
    fn student_on_admin_path_is_sent_home() {
        assert_eq!(
            decide("/admin/sessions", Some("student")),
            PageDecision::RedirectHome
        );
    }

    #[test]
    fn superadmin_may_use_admin_pages() {
        assert_eq!(decide("/admin", Some("superadmin")), PageDecision::Allow);
        assert_eq!(decide("/admin/users", Some("admin")), PageDecision::Allow);
    }

    #[test]
    fn role_prefixes_match_their_roles_only() {
        assert_eq!(decide("/mentor/qr", Some("mentor")), PageDecision::Allow);
        assert_eq!(decide("/mentor/qr", Some("student")), PageDecision::RedirectHome);
        assert_eq!(decide("/student/scan-qr", Some("student")), PageDecision::Allow);
        assert_eq!(decide("/student/scan-qr", Some("admin")), PageDecision::RedirectHome);
    }

    #[test]
    fn shared_prefixes_accept_any_role() {
        assert_eq!(decide("/settings", Some("mentor")), PageDecision::Allow);
        assert_eq!(decide("/profile/edit", Some("student")), PageDecision::Allow);
        assert_eq!(decide("/dashboard", Some("admin")), PageDecision::Allow);
    }
}
