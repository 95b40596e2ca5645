//! Read/write authorization for entries.

pub mod access;
pub mod policy;
pub mod principal;

pub use access::{AccessContext, can_read, can_write};
pub use policy::PermissionPolicy;
pub use principal::Principal;
