//! Roundtable core domain: personas, transcripts, sentiment, and metrics.
//!
//! This crate holds the pure, synchronous half of the engine. Everything
//! that talks to the outside world (text generation, orchestration,
//! configuration files on disk) lives in the companion crates.

pub mod config;
pub mod error;
pub mod metrics;
pub mod persona;
pub mod sentiment;
pub mod session;

// Re-export common error type
pub use error::{Result, RoundtableError};
