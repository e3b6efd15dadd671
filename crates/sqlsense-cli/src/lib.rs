//! sqlsense CLI library.
//!
//! This module exposes internal types for testing purposes.
//! The main entry point is the `sqlsense` binary.

pub mod cli;
pub mod input;
pub mod output;

// Re-export commonly used types
pub use cli::Args;
