pub mod auth;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::{api_routes, app, Access, ApiRouter, App};
pub use state::AppState;
