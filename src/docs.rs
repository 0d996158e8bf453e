use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use hallpass_core::{PaginationMeta, PaginationParams};

use crate::modules::attendance::model::{
    AttendanceFilterParams, AttendanceRecord, AttendanceStats, DepartmentStatsParams,
    DepartmentStatsResponse, MarkAttendanceDto, StatsParams,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest};
use crate::modules::leaves::model::{
    ApplyLeaveDto, DecideLeaveDto, LeaveConflictDetails, LeaveDecision, LeaveFilterParams,
    LeaveRequest, LeaveStatus, LeaveType, PaginatedLeavesResponse,
};
use crate::modules::notifications::model::{
    MarkAllReadResponse, Notification, NotificationCategory, NotificationListParams,
    UnreadCountResponse,
};
use crate::modules::users::model::{
    ChangePasswordDto, DashboardResponse, PaginatedUsersResponse, UserFilterParams, UserResponse,
    UserRole,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::users::controller::get_me,
        crate::modules::users::controller::change_password,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::admin_dashboard,
        crate::modules::users::controller::faculty_dashboard,
        crate::modules::users::controller::warden_dashboard,
        crate::modules::leaves::controller::apply_leave,
        crate::modules::leaves::controller::list_leaves,
        crate::modules::leaves::controller::list_my_leaves,
        crate::modules::leaves::controller::get_leave,
        crate::modules::leaves::controller::approve_leave,
        crate::modules::leaves::controller::reject_leave,
        crate::modules::attendance::controller::mark_attendance,
        crate::modules::attendance::controller::list_attendance,
        crate::modules::attendance::controller::attendance_stats,
        crate::modules::attendance::controller::department_stats,
        crate::modules::notifications::controller::list_notifications,
        crate::modules::notifications::controller::unread_count,
        crate::modules::notifications::controller::mark_read,
        crate::modules::notifications::controller::mark_all_read,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UserRole,
            UserResponse,
            UserFilterParams,
            PaginatedUsersResponse,
            ChangePasswordDto,
            DashboardResponse,
            LeaveType,
            LeaveStatus,
            LeaveDecision,
            LeaveRequest,
            ApplyLeaveDto,
            DecideLeaveDto,
            LeaveFilterParams,
            LeaveConflictDetails,
            PaginatedLeavesResponse,
            AttendanceRecord,
            MarkAttendanceDto,
            AttendanceFilterParams,
            StatsParams,
            AttendanceStats,
            DepartmentStatsParams,
            DepartmentStatsResponse,
            Notification,
            NotificationCategory,
            NotificationListParams,
            UnreadCountResponse,
            MarkAllReadResponse,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Users", description = "Profiles and user directory"),
        (name = "Dashboards", description = "Role landing pages"),
        (name = "Leaves", description = "Leave request submission and approval"),
        (name = "Attendance", description = "Daily attendance ledger and statistics"),
        (name = "Notifications", description = "In-app notification inbox")
    ),
    info(
        title = "Hallpass API",
        version = "0.1.0",
        description = "Campus leave and attendance backend built with Rust, Axum, and PostgreSQL.",
        contact(
            name = "API Support",
            email = "support@hallpass.local"
        ),
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
