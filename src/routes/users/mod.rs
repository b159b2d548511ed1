pub mod get;

pub use get::{list_users, read_user};
