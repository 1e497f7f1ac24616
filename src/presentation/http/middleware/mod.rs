pub mod rate_limit;
pub mod request_id;
pub mod user;
