pub mod generate_hair_style;
pub mod square;
pub mod user_account;
