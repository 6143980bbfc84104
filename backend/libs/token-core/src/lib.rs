//! Transport-agnostic token lifecycle core for the Arclight auth service.
//!
//! Everything security-sensitive lives here so that the HTTP gateway and the
//! gRPC validation endpoint share one source of truth for trust decisions:
//! the same codec, the same [`TokenService`] checks, and the same revocation
//! store. The transports are thin adapters over this crate.

pub mod claims;
pub mod codec;
pub mod error;
pub mod policy;
pub mod revocation;
pub mod service;
pub mod test_utils;

pub use claims::{Claims, Role, TokenPair, TokenType};
pub use codec::TokenCodec;
pub use error::TokenError;
pub use policy::{require_role, InsufficientRole};
pub use revocation::{RedisRevocationStore, RevocationStore};
pub use service::{TokenLifetimes, TokenService};
