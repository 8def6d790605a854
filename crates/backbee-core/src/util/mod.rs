//! Utility modules.
//!
//! # Modules
//!
//! - [`strings`]: URL-safe slugs, short type names and path cleanup

pub mod strings;
