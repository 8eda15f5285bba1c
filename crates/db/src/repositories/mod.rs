//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod academic_session_repo;
pub mod enrollment_repo;
pub mod group_repo;
pub mod qr_token_repo;
pub mod report_repo;
pub mod requirement_repo;
pub mod role_repo;
pub mod scan_event_repo;
pub mod skill_repo;
pub mod user_repo;

pub use academic_session_repo::AcademicSessionRepo;
pub use enrollment_repo::{AssignOutcome, EnrollmentRepo};
pub use group_repo::GroupRepo;
pub use qr_token_repo::QrTokenRepo;
pub use report_repo::ReportRepo;
pub use requirement_repo::RequirementRepo;
pub use role_repo::RoleRepo;
pub use scan_event_repo::ScanEventRepo;
pub use skill_repo::SkillRepo;
pub use user_repo::UserRepo;
