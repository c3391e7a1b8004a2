// handlers/protected/mod.rs - Handlers behind the token guards

pub mod guards;
pub mod session;
