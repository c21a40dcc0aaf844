//! Tracing-based logging setup.

mod logger;

pub use logger::Logger;
