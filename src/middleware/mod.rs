pub mod auth;
pub mod response;

pub use auth::{require_bearer, AuthCompany};
pub use response::{ApiResponse, ApiResult};
