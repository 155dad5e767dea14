//! Testing utilities for SBP.
//!
//! This module provides utilities to make testing registries, filters and
//! handlers easier.
//!
//! # Features
//!
//! - [`RecordingFilter`]: A filter that records every call it sees and can veto
//! - [`CountingHandler`]: A handler that counts invocations

use parking_lot::Mutex;
use sbp_core::{Args, BoxError, DomainState, Filter, FilterResult, Handler, Value};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Recording Filter
// ============================================================================

/// One call observed by a [`RecordingFilter`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
    /// Label of the filter that saw the call.
    pub label: &'static str,
    /// Domain passed to the filter.
    pub domain: String,
    /// Selector passed to the filter.
    pub selector: String,
    /// Arguments passed to the filter.
    pub args: Args,
}

/// A filter that records all calls it receives.
///
/// Filters created with [`sibling`](Self::sibling) share one log, which makes
/// the evaluation order across scopes observable.
///
/// # Example
///
/// ```rust,ignore
/// let selector = RecordingFilter::new("selector").vetoing();
/// let global = selector.sibling("global");
///
/// sbp.add_selector_filter("math/add", selector.clone());
/// sbp.add_global_filter(global);
/// sbp.dispatch("math/add", args![1, 2])?;
///
/// assert_eq!(selector.labels(), vec!["selector"]);
/// ```
#[derive(Clone)]
pub struct RecordingFilter {
    label: &'static str,
    log: Arc<Mutex<Vec<FilterCall>>>,
    result: FilterResult,
}

impl RecordingFilter {
    /// Create a new recording filter that lets calls through.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            log: Arc::new(Mutex::new(Vec::new())),
            result: FilterResult::Proceed,
        }
    }

    /// Make this filter veto every call it sees.
    pub fn vetoing(mut self) -> Self {
        self.result = FilterResult::Veto;
        self
    }

    /// Create another proceeding filter writing into the same log.
    pub fn sibling(&self, label: &'static str) -> Self {
        Self {
            label,
            log: self.log.clone(),
            result: FilterResult::Proceed,
        }
    }

    /// Get a clone of the recorded calls.
    pub fn calls(&self) -> Vec<FilterCall> {
        self.log.lock().clone()
    }

    /// Labels of the filters that ran, in order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.log.lock().iter().map(|call| call.label).collect()
    }

    /// Get the number of recorded calls.
    pub fn count(&self) -> usize {
        self.log.lock().len()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.log.lock().clear();
    }
}

impl Filter for RecordingFilter {
    fn check(&self, domain: &str, selector: &str, args: &Args) -> FilterResult {
        self.log.lock().push(FilterCall {
            label: self.label,
            domain: domain.to_owned(),
            selector: selector.to_owned(),
            args: args.clone(),
        });
        self.result
    }
}

// ============================================================================
// Counting Handler
// ============================================================================

/// A handler that counts invocations and returns a fixed value.
///
/// # Example
///
/// ```rust,ignore
/// let counter = CountingHandler::new();
/// sbp.register_one("test/count", counter.clone())?;
/// sbp.dispatch("test/count", Args::new())?;
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Clone)]
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
    output: Value,
}

impl CountingHandler {
    /// Create a new counting handler returning `null`.
    pub fn new() -> Self {
        Self::returning(Value::Null)
    }

    /// Create a counting handler returning `output`.
    pub fn returning(output: Value) -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
            output,
        }
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl Default for CountingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for CountingHandler {
    fn call(&self, _state: &DomainState, _args: Args) -> Result<Value, BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}
