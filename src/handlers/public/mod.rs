// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Liveness, the endpoint map, and token acquisition. Registered with
// Access::Public, so the bearer gate never runs in front of them.

pub mod health; // GET /health
pub mod home; // GET /
pub mod token; // POST /token, POST /token/refresh

pub use health::health_get;
pub use home::home_get;
pub use token::{token_obtain_post, token_refresh_post};
