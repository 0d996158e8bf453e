pub use hallpass_models::auth::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest};
