pub mod database;
pub mod http_client;
pub mod repositories;
pub mod storage;
pub mod vision;
pub mod wechat;
