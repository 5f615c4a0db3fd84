pub mod bookings;
pub mod destination;
pub mod fallback;
pub mod package;
pub mod user;
pub mod wishlist;
