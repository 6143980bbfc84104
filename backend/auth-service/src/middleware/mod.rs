pub mod auth;

pub use auth::{authenticate_bearer, AdminUser, AuthUser};
