//! Leave request models.
//!
//! A request is created `pending` and decided exactly once. Department and
//! hostel are copied from the student when the request is filed, so later
//! profile changes do not move a request between scopes.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use hallpass_core::serde::deserialize_day;
use hallpass_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{LeaveId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "leave_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    Medical,
    Personal,
    Emergency,
    Academic,
}

impl LeaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::Personal => "personal",
            Self::Emergency => "emergency",
            Self::Academic => "academic",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "leave_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Pending and approved requests hold their dates; rejected ones release them.
    pub fn blocks_dates(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two ways a pending request can be decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaveDecision {
    Approve,
    Reject,
}

impl LeaveDecision {
    pub fn target_status(&self) -> LeaveStatus {
        match self {
            Self::Approve => LeaveStatus::Approved,
            Self::Reject => LeaveStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveRequest {
    pub id: LeaveId,
    pub student_id: UserId,
    pub leave_type: LeaveType,
    pub reason: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
    pub approved_by: Option<UserId>,
    pub remarks: Option<String>,
    pub department: String,
    pub hostel: Option<String>,
    pub days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload built by the workflow after validation.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub student_id: UserId,
    pub leave_type: LeaveType,
    pub reason: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub department: String,
    pub hostel: Option<String>,
    pub days: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ApplyLeaveDto {
    pub leave_type: LeaveType,
    #[validate(length(
        min = 10,
        max = 500,
        message = "Reason must be between 10 and 500 characters"
    ))]
    #[schema(example = "Fever and doctor-advised rest")]
    pub reason: String,
    /// `YYYY-MM-DD`; a full timestamp is accepted and truncated to its day.
    #[serde(deserialize_with = "deserialize_day")]
    #[schema(value_type = String, format = Date, example = "2025-03-10")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_day")]
    #[schema(value_type = String, format = Date, example = "2025-03-12")]
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct DecideLeaveDto {
    #[validate(length(max = 200, message = "Remarks must be at most 200 characters"))]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaveFilterParams {
    /// Faculty and wardens default to `pending` when omitted.
    pub status: Option<LeaveStatus>,
    pub leave_type: Option<LeaveType>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedLeavesResponse {
    pub data: Vec<LeaveRequest>,
    pub meta: PaginationMeta,
}

/// The approved leave that blocks marking a student present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaveConflictDetails {
    pub leave_id: LeaveId,
    pub leave_type: LeaveType,
    pub reason: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<&LeaveRequest> for LeaveConflictDetails {
    fn from(leave: &LeaveRequest) -> Self {
        Self {
            leave_id: leave.id,
            leave_type: leave.leave_type,
            reason: leave.reason.clone(),
            start_date: leave.start_date,
            end_date: leave.end_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_dto_accepts_timestamps() {
        let dto: ApplyLeaveDto = serde_json::from_str(
            r#"{"leave_type":"medical","reason":"Fever and rest","start_date":"2025-03-10T09:00:00Z","end_date":"2025-03-12"}"#,
        )
        .unwrap();
        assert_eq!(dto.leave_type, LeaveType::Medical);
        assert_eq!(dto.start_date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_apply_dto_rejects_unknown_type() {
        let result: Result<ApplyLeaveDto, _> = serde_json::from_str(
            r#"{"leave_type":"vacation","reason":"Going somewhere","start_date":"2025-03-10","end_date":"2025-03-12"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_reason_length_bounds() {
        let mut dto = ApplyLeaveDto {
            leave_type: LeaveType::Personal,
            reason: "too short".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        };
        assert!(dto.validate().is_err());
        dto.reason = "x".repeat(10);
        assert!(dto.validate().is_ok());
        dto.reason = "x".repeat(501);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_remarks_limit() {
        let ok = DecideLeaveDto {
            remarks: Some("x".repeat(200)),
        };
        assert!(ok.validate().is_ok());
        let long = DecideLeaveDto {
            remarks: Some("x".repeat(201)),
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_status_semantics() {
        assert!(LeaveStatus::Pending.blocks_dates());
        assert!(LeaveStatus::Approved.blocks_dates());
        assert!(!LeaveStatus::Rejected.blocks_dates());
        assert!(!LeaveStatus::Pending.is_terminal());
        assert_eq!(LeaveDecision::Reject.target_status(), LeaveStatus::Rejected);
    }

    #[test]
    fn test_filter_params_parse() {
        let params: LeaveFilterParams =
            serde_json::from_str(r#"{"status":"approved","page":"2"}"#).unwrap();
        assert_eq!(params.status, Some(LeaveStatus::Approved));
        assert_eq!(params.pagination.page(), Some(2));
    }
}
