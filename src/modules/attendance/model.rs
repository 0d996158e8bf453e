pub use hallpass_models::attendance::{
    AttendanceFilterParams, AttendanceRecord, AttendanceStats, AttendanceSummary,
    DepartmentStatsParams, DepartmentStatsResponse, MarkAttendanceDto, StatsParams,
};
pub use hallpass_models::users::{User, UserRole};
