pub mod guards_service;
pub mod login_service;

pub use guards_service::GuardsService;
pub use login_service::{LoginOutcome, LoginService};
