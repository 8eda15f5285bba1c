//! Group attendance report aggregation.
//!
//! The report is a pure fold over immutable scan events, so requesting it
//! twice with no new scans yields identical output. There are no stored
//! counters that could drift.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::attendance::scan_date;
use crate::types::{DbId, Timestamp};

/// Header block of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GroupInfo {
    pub id: DbId,
    pub group_number: i32,
    pub skill_title: String,
    pub practical_date: Option<NaiveDate>,
    pub total_enrolled: i64,
}

/// A student on the group roster.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub student_id: DbId,
    pub full_name: String,
    pub matric_number: Option<String>,
}

/// One accepted scan event, as loaded for aggregation.
#[derive(Debug, Clone)]
pub struct ScanFact {
    pub student_id: DbId,
    pub points_awarded: i32,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StudentAttendance {
    pub student_id: DbId,
    pub full_name: String,
    pub matric_number: Option<String>,
    pub total_attendance: i64,
    pub total_points: i64,
    pub last_attendance: Option<Timestamp>,
    pub attendance_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AttendanceReport {
    pub group_info: GroupInfo,
    pub students: Vec<StudentAttendance>,
}

#[derive(Default)]
struct Tally {
    count: i64,
    points: i64,
    last: Option<Timestamp>,
    dates: Vec<NaiveDate>,
}

/// Fold scans into per-student totals.
///
/// Students appear in roster order sorted by full name, then id. Scans for
/// students missing from the roster are ignored. Dates are sorted and
/// deduplicated.
pub fn aggregate_report(
    group_info: GroupInfo,
    roster: &[RosterEntry],
    scans: &[ScanFact],
) -> AttendanceReport {
    let mut tallies: BTreeMap<DbId, Tally> = BTreeMap::new();
    for scan in scans {
        let tally = tallies.entry(scan.student_id).or_default();
        tally.count += 1;
        tally.points += i64::from(scan.points_awarded);
        tally.last = tally.last.max(Some(scan.created_at));
        tally.dates.push(scan_date(scan.created_at));
    }

    let mut students: Vec<StudentAttendance> = roster
        .iter()
        .map(|entry| {
            let tally = tallies.remove(&entry.student_id).unwrap_or_default();
            let mut dates = tally.dates;
            dates.sort_unstable();
            dates.dedup();
            StudentAttendance {
                student_id: entry.student_id,
                full_name: entry.full_name.clone(),
                matric_number: entry.matric_number.clone(),
                total_attendance: tally.count,
                total_points: tally.points,
                last_attendance: tally.last,
                attendance_dates: dates,
            }
        })
        .collect();

    students.sort_by(|a, b| {
        a.full_name
            .cmp(&b.full_name)
            .then(a.student_id.cmp(&b.student_id))
    });

    AttendanceReport {
        group_info,
        students,
    }
}

/// Join first and last name the way the roster displays them.
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.trim(), last_name.trim())
        .trim()
        .to_string()
}
