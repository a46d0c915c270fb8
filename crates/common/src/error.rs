//! Error types for tumbler
//!
//! Configuration and input validation failures. Everything in here is
//! fatal to a run and is raised before any packet leaves the host.

use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum TumblerError {
    #[error("Invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("Subnet mismatch: {start} and {end} are not in the same /24 network")]
    SubnetMismatch { start: String, end: String },

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("No ports specified")]
    EmptyPortList,

    #[error("Interface error: {0}")]
    Interface(String),

    #[error("No IPv4 address found on interface {0}")]
    NoLocalAddress(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for tumbler operations
pub type TumblerResult<T> = Result<T, TumblerError>;
