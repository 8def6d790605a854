//! # backbee-rewriting
//!
//! Canonical page URLs computed from configurable schemes.
//!
//! - [`config`]: rewriting settings and schemes
//! - [`page`]: pages, page states and contents
//! - [`repository`]: page storage
//! - [`generator`]: scheme selection, placeholder substitution, uniqueness
//! - [`listener`]: propagation of URL changes to descendants

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod generator;
pub mod listener;
pub mod page;
pub mod repository;

pub use config::{RewritingConfig, SchemeConfig};
pub use error::{Error, Result};
pub use generator::UrlGenerator;
pub use listener::{PageChange, RewritingListener};
pub use page::{Content, Page, PageState, PropertyContent};
pub use repository::{MemoryPageRepository, PageRepository};
