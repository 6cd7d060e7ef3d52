pub mod auth;
pub mod json;
pub mod response;

pub use auth::{require_role, AuthSubject, RoleGate};
pub use json::ApiJson;
pub use response::{ApiResponse, ApiResult};
