/// Security helpers for the credential path
pub mod password;

pub use password::{hash_password, verify_password};
