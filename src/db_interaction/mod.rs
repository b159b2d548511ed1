pub mod orders;
pub mod products;
pub mod reservations;
pub mod tables;
pub mod users;

pub use orders::*;
pub use products::*;
pub use reservations::*;
pub use tables::*;
pub use users::*;
