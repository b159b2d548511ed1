pub mod username;
pub mod user_password;

pub use username::Username;
pub use user_password::UserPassword;
