//! HTTP handlers for the vision service.

pub mod describe;
pub mod health;
pub mod metrics;
