pub use hallpass_models::users::{
    ChangePasswordDto, DashboardResponse, PaginatedUsersResponse, User, UserFilterParams,
    UserResponse, UserRole,
};
