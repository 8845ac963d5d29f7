//! Observability
//!
//! The engine itself only emits `tracing` events and never installs a
//! subscriber; that choice belongs to the binary. This module carries the
//! subscriber setup shared by demos, simulators and deployments.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
