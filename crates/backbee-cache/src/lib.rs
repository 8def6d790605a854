//! # backbee-cache
//!
//! Cache adapters with tag-based invalidation and lifetime clamping.
//!
//! - [`adapter`]: the [`CacheAdapter`] contract
//! - [`lifetime`]: lifetime bounds and expiry computation
//! - [`record`]: stored records and validity rules
//! - [`memory`]: in-memory adapter
//! - [`db`]: SQLite table adapter
//! - [`config`]: adapter options

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod adapter;
pub mod config;
pub mod db;
pub mod error;
pub mod lifetime;
pub mod memory;
pub mod record;

pub use adapter::CacheAdapter;
pub use config::CacheConfig;
pub use db::DbCache;
pub use error::{Error, Result};
pub use lifetime::LifetimePolicy;
pub use memory::MemoryCache;
pub use record::{CacheRecord, Expiry};
