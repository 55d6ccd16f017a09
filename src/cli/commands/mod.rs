pub mod auth;
pub mod secret;
pub mod server;
