// Token authority: issuance, verification, refresh, and the guards built on them.

pub mod claims;
pub mod clock;
pub mod error;
pub mod guards;
pub mod token;

pub use claims::{Claims, CurrentUser, Permissions, TokenClass};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AuthError;
pub use guards::{check_permission, current_user, optional_auth, require_admin, PermissionChecker};
pub use token::{TokenAuthority, TokenPair};
