//! API endpoint implementations.

mod auth;
mod posts;
mod users;

pub use auth::AuthApi;
pub use posts::PostsApi;
pub use users::UsersApi;
