//! Services: the connection-pool gateway.

pub mod gateway;

pub use gateway::Gateway;
