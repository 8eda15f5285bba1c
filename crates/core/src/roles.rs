//! Well-known role name constants.
//!
//! These must match the seed data in `20261001000002_create_roles_and_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SUPERADMIN: &str = "superadmin";
pub const ROLE_MENTOR: &str = "mentor";
pub const ROLE_STUDENT: &str = "student";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_SUPERADMIN, ROLE_MENTOR, ROLE_STUDENT];

/// Whether the role may administer the platform (`admin` or `superadmin`).
pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_SUPERADMIN
}

/// Whether the role may manage groups and QR codes (mentors and admins).
pub fn is_staff(role: &str) -> bool {
    role == ROLE_MENTOR || is_admin(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superadmin_counts_as_admin() {
        assert!(is_admin(ROLE_SUPERADMIN));
        assert!(is_admin(ROLE_ADMIN));
        assert!(!is_admin(ROLE_MENTOR));
    }

    #[test]
    fn students_are_not_staff() {
        assert!(is_staff(ROLE_MENTOR));
        assert!(is_staff(ROLE_ADMIN));
        assert!(!is_staff(ROLE_STUDENT));
    }
}
