pub mod get;
pub mod me;
pub mod post;
pub mod update;

pub use get::{list_reservations, read_reservation};
pub use me::my_reservation;
pub use post::post_reservation;
pub use update::patch_reservation;
