//! BackBee core: shared errors and utilities.
//!
//! This crate provides the foundational types used across all BackBee crates.
//! It has no internal BackBee dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`util`]: String helpers (urlization, type names, path cleanup)

#![doc = include_str!("../README.md")]

pub mod error;
pub mod util;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};

// Convenience re-exports from util
pub use util::strings::{collapse_slashes, short_type_name, urlize};
