//! `klabis-auth`: authorization checks for club members.
//!
//! Decoupled from HTTP and from how principals are authenticated.

pub mod authorize;
pub mod grants;
pub mod principal;

pub use authorize::{AuthzError, authorize, authorize_member_access};
pub use grants::ApplicationGrant;
pub use principal::Principal;
