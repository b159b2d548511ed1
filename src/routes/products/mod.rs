pub mod delete;
pub mod get;
pub mod post;
pub mod update;

pub use delete::remove_product;
pub use get::{list_products, read_product};
pub use post::post_product;
pub use update::put_product;
