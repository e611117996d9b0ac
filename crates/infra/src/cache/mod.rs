//! Cache gateway implementations

pub mod moka_gateway;

pub use moka_gateway::MokaCacheGateway;
