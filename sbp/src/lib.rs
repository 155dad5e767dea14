//! # sbp - Selector-Based Dispatch
//!
//! `sbp` lets independent modules publish functionality under string
//! selectors of the form `"<domain>/<name>"` and invoke each other through a
//! central dispatcher, with no compile-time dependency between them.
//!
//! - Every **domain** owns a private state record handed to its handlers.
//! - Domains can be **locked**, after which they accept and lose nothing.
//! - Selectors are sealed unless declared **unsafe** before registration.
//! - **Filters** attached per selector, per domain or globally can veto a
//!   call before it reaches its handler.
//!
//! ## Quick Start
//!
//! ```rust
//! use sbp::{BoxError, DomainState, Sbp, SelectorMap, args, typed};
//!
//! let sbp = Sbp::new();
//! let add = typed(|_: &DomainState, (a, b): (i64, i64)| Ok::<_, BoxError>(a + b));
//! sbp.register(SelectorMap::new().with("math/add", add)).unwrap();
//!
//! let sum: Option<i64> = sbp.dispatch_as("math/add", args![2, 3]).unwrap();
//! assert_eq!(sum, Some(5));
//! ```
//!
//! ## Features
//!
//! - `inventory`: link-time collection through [`Sbp::register_collected`]
//! - `macros`: the `#[selector]` attribute (implies `inventory`)

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use sbp_core::{
    // Arguments
    Args,
    ArgsError,
    // Error types
    BoxError,
    // Filter
    BoxFilter,
    // Handler
    BoxHandler,
    DomainState,
    Filter,
    FilterResult,
    FromArgs,
    Handler,
    INIT_SUFFIX,
    IntoFilterResult,
    SbpError,
    TypedHandler,
    Value,
    // Selector helpers
    domain_of,
    handler_fn,
    is_init_selector,
    typed,
};

// Registry
pub use sbp_std::{DEFAULT_RESERVED_DOMAIN, FilterScope, Sbp, SbpBuilder, SelectorMap, global};

#[doc(hidden)]
pub use sbp_core::__private;

/// Testing utilities.
pub mod testing {
    pub use sbp_std::testing::{CountingHandler, FilterCall, RecordingFilter};
}

/// Link-time selector collection.
#[cfg(feature = "inventory")]
pub mod collected {
    pub use sbp_std::collected::{CollectedFn, SelectorRegistration};
}

/// Prelude module - common imports for SBP.
///
/// # Usage
///
/// ```rust,ignore
/// use sbp::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Args, BoxError, DomainState, Filter, FilterResult, Handler, Sbp, SbpError, SelectorMap,
        Value, args, handler_fn, typed,
    };
}

/// Build [`Args`] from a list of serializable expressions.
///
/// Objects need an explicit `json!`.
///
/// ```rust
/// let args = sbp::args![1, "two", [3], -4];
/// assert_eq!(args.len(), 4);
/// assert_eq!(args[3], -4);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::Args::from(::std::vec![$($crate::__private::json!($arg)),+])
    };
}

/// Dispatch on the process-wide registry.
///
/// `sbp!("math/add", 2, 3)` is `sbp::global().dispatch("math/add", args![2, 3])`.
#[macro_export]
macro_rules! sbp {
    ($selector:expr $(, $arg:expr)* $(,)?) => {
        $crate::global().dispatch($selector, $crate::args![$($arg),*])
    };
}

#[cfg(feature = "macros")]
pub use sbp_macros::selector;

#[cfg(feature = "inventory")]
pub use inventory;
