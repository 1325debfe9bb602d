//! Outbound messaging abstraction and the inbound message model.

pub mod port;
pub mod types;
