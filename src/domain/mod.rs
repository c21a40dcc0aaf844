//! Domain layer: pure data model, ports, and domain errors.

pub mod errors;
pub mod models;
pub mod ports;
