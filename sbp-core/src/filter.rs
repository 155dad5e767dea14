//! # Filters
//!
//! Filters observe every dispatch before its handler runs and may veto it.
//! They are attached at three scopes (selector, domain, global) and are
//! evaluated most specific first, each scope in registration order. The first
//! [`FilterResult::Veto`] stops evaluation and the handler is not called.
//!
//! Filters see the arguments by reference and cannot rewrite them.

use crate::args::Args;
use std::sync::Arc;

/// Outcome of a filter: let the call through or veto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterResult {
    /// Continue with the next filter, then the handler.
    #[default]
    Proceed,
    /// Silently drop the call.
    Veto,
}

impl FilterResult {
    /// Whether this result stops the dispatch.
    pub const fn is_veto(self) -> bool {
        matches!(self, FilterResult::Veto)
    }
}

/// Trait for converting a filter closure's output into a [`FilterResult`].
///
/// # Default Implementations
///
/// - `()` → Proceed
/// - `FilterResult` → As is
/// - `Option<FilterResult>` → `None` proceeds
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a filter outcome",
    label = "missing `IntoFilterResult` implementation",
    note = "Filters return `FilterResult`, `Option<FilterResult>` or `()`."
)]
pub trait IntoFilterResult {
    /// Convert the output into a filter verdict.
    fn into_filter_result(self) -> FilterResult;
}

impl IntoFilterResult for () {
    fn into_filter_result(self) -> FilterResult {
        FilterResult::Proceed
    }
}

impl IntoFilterResult for FilterResult {
    fn into_filter_result(self) -> FilterResult {
        self
    }
}

impl IntoFilterResult for Option<FilterResult> {
    fn into_filter_result(self) -> FilterResult {
        self.unwrap_or_default()
    }
}

/// A vetoing observer run before dispatch.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an SBP filter",
    label = "missing `Filter` implementation",
    note = "Filters are `Fn(&str, &str, &Args) -> FilterResult` (domain, selector, args)."
)]
pub trait Filter: Send + Sync + 'static {
    /// Inspect a pending call.
    fn check(&self, domain: &str, selector: &str, args: &Args) -> FilterResult;
}

/// A shared, type-erased filter as stored in a chain.
pub type BoxFilter = Arc<dyn Filter>;

// Blanket impl for closures
impl<F, R> Filter for F
where
    F: Fn(&str, &str, &Args) -> R + Send + Sync + 'static,
    R: IntoFilterResult,
{
    fn check(&self, domain: &str, selector: &str, args: &Args) -> FilterResult {
        (self)(domain, selector, args).into_filter_result()
    }
}
