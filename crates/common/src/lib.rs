//! Tumbler Common - Shared types and traits
//!
//! This crate provides the core types, traits, and errors used across
//! the tumbler knock scanner crates.
//!
//! Key pieces:
//! - `KnockPlan` / `ScanOutcome` / `ScanReport` data model
//! - `HostProbe` and `GuardProbe` seams between scanner and orchestrator
//! - Configuration error taxonomy

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{TumblerError, TumblerResult};
pub use traits::{GuardProbe, HostProbe};
pub use types::{KnockOptions, KnockPlan, LocalEndpoint, ProbeStatus, ScanOutcome, ScanReport};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
