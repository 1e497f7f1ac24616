pub mod entity;
pub mod like;
pub mod repository;
