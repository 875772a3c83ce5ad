pub mod auth;
pub mod response;

pub use auth::{require_admin, require_super_admin, AuthAdmin};
pub use response::{ApiResponse, ApiResult};
