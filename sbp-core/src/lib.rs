//! # sbp-core
//!
//! Core vocabulary for SBP, the selector-based dispatch framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! modules that publish handlers or filters without needing the registry
//! implementation in `sbp-std`.
//!
//! # Vocabulary
//!
//! - **Selector**: a unique callable name `"<domain>/<name>"` ([`domain_of`])
//! - **Handler**: the callable published under a selector ([`Handler`])
//! - **Domain state**: private record handed to every handler of a domain
//!   ([`DomainState`])
//! - **Args**: positional dynamic arguments of one call ([`Args`], [`FromArgs`])
//! - **Filter**: vetoing observer run before dispatch ([`Filter`],
//!   [`FilterResult`])
//!
//! # Error Types
//!
//! - [`SbpError`] - Registry, lock and dispatch errors
//! - [`ArgsError`] - Argument extraction errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod args;
mod error;
mod filter;
mod handler;
mod selector;
mod state;

// Re-exports
pub use args::{Args, FromArgs};
pub use error::{ArgsError, BoxError, SbpError};
pub use filter::{BoxFilter, Filter, FilterResult, IntoFilterResult};
pub use handler::{BoxHandler, Handler, TypedHandler, handler_fn, typed};
pub use selector::{INIT_SUFFIX, domain_of, is_init_selector};
pub use state::DomainState;

/// Dynamic value carried by arguments and results.
pub use serde_json::Value;

#[doc(hidden)]
pub mod __private {
    pub use serde_json::{json, to_value};
}
