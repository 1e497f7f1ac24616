pub mod sqlx_record_repository;
pub mod sqlx_square_repository;
pub mod sqlx_user_repository;
