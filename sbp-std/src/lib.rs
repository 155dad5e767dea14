//! # sbp-std
//!
//! Registry, filter chains and dispatcher for the SBP selector dispatch
//! framework.
//!
//! This crate provides:
//! - **Registry**: [`Sbp`], an isolated selector table with domains, lock
//!   manager and unsafe-set
//! - **Filters**: selector, domain and global chains ([`FilterScope`])
//! - **Construction**: [`SbpBuilder`] and the reserved administrative domain
//! - **Global instance**: [`global()`]
//! - **Link-time collection**: `collected` (with the `inventory` feature)
//! - **Testing utilities**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core vocabulary
pub use sbp_core;

mod bootstrap;
mod builder;
mod dispatch;
mod domain;
mod filters;
mod global;
mod registry;
pub mod testing;

#[cfg(feature = "inventory")]
pub mod collected;

pub use builder::{DEFAULT_RESERVED_DOMAIN, SbpBuilder};
pub use filters::FilterScope;
pub use global::global;
pub use registry::{Sbp, SelectorMap};

#[cfg(feature = "inventory")]
pub use inventory;
