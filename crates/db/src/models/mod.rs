//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches, where the
//!   entity is editable

pub mod academic_session;
pub mod enrollment;
pub mod group;
pub mod qr_token;
pub mod requirement;
pub mod role;
pub mod scan_event;
pub mod skill;
pub mod user;
