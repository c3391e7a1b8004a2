// handlers/public/mod.rs - Public handlers (no authentication required)

pub mod health;
pub mod login;
