pub use hallpass_models::leaves::{
    ApplyLeaveDto, DecideLeaveDto, LeaveConflictDetails, LeaveDecision, LeaveFilterParams,
    LeaveRequest, LeaveStatus, LeaveType, PaginatedLeavesResponse,
};
