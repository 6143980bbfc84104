//! Role-based authorization gate, applied after identity resolution.
//!
//! Shared by both gateways so neither transport grows its own idea of what
//! "admin" means. Failure here is "forbidden", which the edges must keep
//! distinct from "unauthenticated".

use thiserror::Error;

use crate::claims::Role;

#[derive(Debug, Error)]
#[error("role {granted} does not satisfy required role {required}")]
pub struct InsufficientRole {
    pub required: Role,
    pub granted: Role,
}

/// Gate an authenticated identity on a required role.
pub fn require_role(granted: Role, required: Role) -> Result<(), InsufficientRole> {
    if granted.satisfies(required) {
        Ok(())
    } else {
        Err(InsufficientRole { required, granted })
    }
}
