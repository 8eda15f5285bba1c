//! Group capacity rules.
//!
//! A student may be assigned to a group only while
//! `current_member_count < max_student_capacity`.

use serde::Serialize;
use ts_rs::TS;

/// Largest `max_student_capacity` accepted for a group.
pub const MAX_GROUP_CAPACITY: i32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct GroupCapacity {
    pub current_member_count: i64,
    pub max_student_capacity: i32,
}

impl GroupCapacity {
    pub fn new(current_member_count: i64, max_student_capacity: i32) -> Self {
        Self {
            current_member_count,
            max_student_capacity,
        }
    }

    pub fn is_full(&self) -> bool {
        self.current_member_count >= i64::from(self.max_student_capacity)
    }

    /// Fill level rounded to a whole percent. Zero when capacity is zero.
    pub fn capacity_percentage(&self) -> u8 {
        if self.max_student_capacity <= 0 {
            return 0;
        }
        let pct = (self.current_member_count as f64 / f64::from(self.max_student_capacity)
            * 100.0)
            .round();
        pct.clamp(0.0, 100.0) as u8
    }

    pub fn available_seats(&self) -> i64 {
        (i64::from(self.max_student_capacity) - self.current_member_count).max(0)
    }

    pub fn ensure_can_assign(&self) -> Result<(), String> {
        if self.is_full() {
            return Err(format!(
                "Group is full ({}/{} students)",
                self.current_member_count, self.max_student_capacity
            ));
        }
        Ok(())
    }
}

pub fn validate_capacity(max: i32) -> Result<(), String> {
    if !(1..=MAX_GROUP_CAPACITY).contains(&max) {
        return Err(format!(
            "max_student_capacity must be between 1 and {MAX_GROUP_CAPACITY}, got {max}"
        ));
    }
    Ok(())
}
