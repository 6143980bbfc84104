pub mod auth;
pub mod users;

pub use auth::{login, logout, refresh_token, register};
pub use users::{deactivate_user, get_me, list_users};
