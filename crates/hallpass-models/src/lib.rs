//! # Hallpass Models
//!
//! Domain models and DTOs for the Hallpass API: database entities,
//! request/response DTOs and their validation rules.
//!
//! # Modules
//!
//! - [`ids`]: Strongly-typed entity ids
//! - [`users`]: Users, roles and profile DTOs
//! - [`auth`]: Registration and login
//! - [`leaves`]: Leave requests and their lifecycle
//! - [`attendance`]: Attendance records and statistics
//! - [`notifications`]: In-app notifications
//!
//! # Example
//!
//! ```ignore
//! use hallpass_models::leaves::{LeaveStatus, LeaveDecision};
//!
//! assert_eq!(LeaveDecision::Approve.target_status(), LeaveStatus::Approved);
//! ```

pub mod attendance;
pub mod auth;
pub mod ids;
pub mod leaves;
pub mod notifications;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use attendance::{
    AttendanceFilterParams, AttendanceRecord, AttendanceStats, AttendanceSummary,
    DepartmentStatsParams, DepartmentStatsResponse, MarkAttendanceDto, NewAttendanceRecord,
    StatsParams,
};
pub use auth::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest};
pub use ids::{AttendanceId, LeaveId, NotificationId, UserId};
pub use leaves::{
    ApplyLeaveDto, DecideLeaveDto, LeaveConflictDetails, LeaveDecision, LeaveFilterParams,
    LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest, PaginatedLeavesResponse,
};
pub use notifications::{
    MarkAllReadResponse, NewNotification, Notification, NotificationCategory,
    NotificationListParams, UnreadCountResponse,
};
pub use users::{
    ChangePasswordDto, DashboardResponse, NewUser, PaginatedUsersResponse, User,
    UserFilterParams, UserResponse, UserRole,
};
