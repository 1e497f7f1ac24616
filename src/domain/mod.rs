pub mod record;
pub mod shared;
pub mod square;
pub mod user;
