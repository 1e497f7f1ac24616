pub mod signer;
pub mod traits;
pub mod volcengine_client;
