pub mod dify_client;
pub mod gateway;

pub use dify_client::DifyClient;
pub use gateway::{Gateway, GatewayRequest, GatewayResponse};
