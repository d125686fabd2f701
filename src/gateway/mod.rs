//! Gateway core: routing, forwarding and health aggregation

pub mod forwarder;
pub mod health;
pub mod registry;
pub mod router;
