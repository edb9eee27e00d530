//! Control plane of a multi-core synthetic traffic generator.
//! The operator changes the rate and the flow churn of running workers without locking them.

/// Launch configuration
pub mod config;
/// Startup errors
pub mod error;

/// Rate and churn projections
pub mod metrics;
/// Shared configuration store and its publication counter
pub mod runtime;

/// Command handlers
pub mod control;
/// Interactive shell
pub mod shell;

/// Generation statistics
pub mod stats;
/// Periodic statistics logging
pub mod ui;

/// Simulated data-plane worker
pub mod worker;

mod utils;
