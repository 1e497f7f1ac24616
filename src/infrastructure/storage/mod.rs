pub mod cos_storage_service;
pub mod mirror;
pub mod qiniu_storage_service;
pub mod traits;
