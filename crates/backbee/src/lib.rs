//! BackBee core umbrella crate.
//!
//! This crate re-exports the BackBee components and loads their
//! configuration from a single TOML document ([`config::BackbeeConfig`]).
//! Use feature flags to pick components.

#![doc = include_str!("../README.md")]

pub mod config;

pub use backbee_core as core;

#[cfg(feature = "acl")]
pub use backbee_acl as acl;

#[cfg(feature = "cache")]
pub use backbee_cache as cache;

#[cfg(feature = "rewriting")]
pub use backbee_rewriting as rewriting;

pub use config::BackbeeConfig;
