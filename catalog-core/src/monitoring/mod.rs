//! Monitoring for the catalog
//!
//! - Structured logging with tracing
//! - Slow catalog query tracking

pub mod logging;

pub use logging::*;
