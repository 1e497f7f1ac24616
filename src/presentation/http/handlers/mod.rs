pub mod hair_style;
pub mod health;
pub mod square;
pub mod user;
