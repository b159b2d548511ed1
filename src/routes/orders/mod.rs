pub mod get;
pub mod post;
pub mod update;

pub use get::{list_orders, read_order};
pub use post::post_order;
pub use update::patch_order;
