// handlers/mod.rs - two-tier handler layout
//
// Public (no auth) -> Protected (bearer access token)
//
// Which tier a handler belongs to is decided at registration time in
// routes.rs; the modules here only group them.
pub mod protected;
pub mod public;
