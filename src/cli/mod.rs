//! Command-line front end
//!
//! Thin handlers over the library; each prints its result to stdout.

pub mod commands;

pub use commands::*;
