pub mod auth;
pub mod fallback;

pub use auth::{bearer_method_not_allowed, extract_bearer_token, require_bearer, AuthUser};
pub use fallback::{hide_allow_on_unauthorized, method_not_allowed_body, not_found};
