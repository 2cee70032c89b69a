//! HTTP adapters over reqwest

mod gateway;
mod transport;

pub use gateway::HttpAuthGateway;
pub use transport::ReqwestTransport;
