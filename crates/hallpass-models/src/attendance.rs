//! Attendance ledger models.

use chrono::{DateTime, NaiveDate, Utc};
use hallpass_core::serde::{deserialize_day, deserialize_optional_day, deserialize_optional_uuid};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::ids::{AttendanceId, UserId};

/// One student's presence on one day. At most one exists per (student, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub student_id: UserId,
    pub date: NaiveDate,
    pub present: bool,
    pub marked_by: UserId,
    pub subject: Option<String>,
    pub period: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAttendanceRecord {
    pub student_id: UserId,
    pub date: NaiveDate,
    pub present: bool,
    pub marked_by: UserId,
    pub subject: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MarkAttendanceDto {
    pub student_id: UserId,
    /// Only the calendar day is kept.
    #[serde(deserialize_with = "deserialize_day")]
    #[schema(value_type = String, format = Date, example = "2025-04-01")]
    pub date: NaiveDate,
    pub present: bool,
    #[validate(length(max = 50, message = "Subject must be at most 50 characters"))]
    pub subject: Option<String>,
    #[validate(length(max = 20, message = "Period must be at most 20 characters"))]
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceFilterParams {
    /// Required for everyone except students, who always see their own records.
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub student_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_day")]
    #[param(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_day")]
    #[param(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub student_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DepartmentStatsParams {
    /// Required for admins; faculty always get their own department.
    pub department: Option<String>,
}

/// Raw per-student counts, as produced by the grouped aggregate.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AttendanceSummary {
    pub student_id: UserId,
    pub total: i64,
    pub present: i64,
    pub last_date: Option<NaiveDate>,
}

impl AttendanceSummary {
    pub fn empty(student_id: UserId) -> Self {
        Self {
            student_id,
            total: 0,
            present: 0,
            last_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceStats {
    pub student_id: UserId,
    pub student_name: String,
    pub total_days: i64,
    pub present_days: i64,
    pub absent_days: i64,
    /// Present share of marked days, 0 when nothing has been marked.
    pub percentage: f64,
    pub last_marked: Option<NaiveDate>,
}

impl AttendanceStats {
    pub fn from_summary(student_name: impl Into<String>, summary: &AttendanceSummary) -> Self {
        let percentage = if summary.total == 0 {
            0.0
        } else {
            summary.present as f64 / summary.total as f64 * 100.0
        };
        Self {
            student_id: summary.student_id,
            student_name: student_name.into(),
            total_days: summary.total,
            present_days: summary.present,
            absent_days: summary.total - summary.present,
            percentage,
            last_marked: summary.last_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepartmentStatsResponse {
    pub department: String,
    pub total_students: usize,
    pub students: Vec<AttendanceStats>,
}
