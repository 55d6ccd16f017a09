// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Security Level: valid, unexpired access token
// Route Prefix: /protected/*
// Middleware: require_bearer, which inserts AuthUser into request extensions
//
// Handlers here may assume Extension<AuthUser> is present.

pub mod resource; // any /protected/* without a dedicated handler
pub mod whoami; // GET /protected/whoami

pub use resource::resource_not_found;
pub use whoami::whoami_get;
