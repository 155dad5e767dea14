//! # Handlers
//!
//! A handler is the callable published under a selector. It receives the
//! owning domain's [`DomainState`] as its first parameter and the dispatch
//! [`Args`] as its second, and returns a dynamic [`Value`].
//!
//! # Usage Patterns
//!
//! 1. **Raw closure**: `handler_fn(|state, args| Ok(Value::Null))`
//! 2. **Typed function**: `typed(|state, (a, b): (i64, i64)| Ok::<_, BoxError>(a + b))`
//! 3. **Struct implementation**: `impl Handler for MyHandler`
//!
//! [`Value`]: serde_json::Value

use crate::{args::Args, args::FromArgs, error::BoxError, state::DomainState};
use serde::Serialize;
use serde_json::Value;
use std::{marker::PhantomData, sync::Arc};

/// A callable published under a selector.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an SBP handler",
    label = "missing `Handler` implementation",
    note = "Handlers are `Fn(&DomainState, Args) -> Result<Value, BoxError>`; \
            wrap typed functions with `typed`."
)]
pub trait Handler: Send + Sync + 'static {
    /// Invoke the handler with its domain's state and the call arguments.
    fn call(&self, state: &DomainState, args: Args) -> Result<Value, BoxError>;
}

/// A shared, type-erased handler as stored in the selector table.
pub type BoxHandler = Arc<dyn Handler>;

// Blanket impl for closures
impl<F> Handler for F
where
    F: Fn(&DomainState, Args) -> Result<Value, BoxError> + Send + Sync + 'static,
{
    fn call(&self, state: &DomainState, args: Args) -> Result<Value, BoxError> {
        (self)(state, args)
    }
}

/// Pin a closure to the raw handler signature so its parameter and return
/// types are inferred.
pub fn handler_fn<F>(f: F) -> F
where
    F: Fn(&DomainState, Args) -> Result<Value, BoxError> + Send + Sync + 'static,
{
    f
}

/// A handler whose arguments are extracted and whose result is serialized.
///
/// Created with [`typed`].
pub struct TypedHandler<F, A, R, E> {
    func: F,
    _marker: PhantomData<fn(A) -> Result<R, E>>,
}

/// Wrap a function taking typed arguments into a [`Handler`].
///
/// Extraction failures and the function's own errors both surface as handler
/// errors.
///
/// # Example
///
/// ```rust
/// use sbp_core::{Args, BoxError, DomainState, Handler, typed};
/// use serde_json::json;
///
/// let add = typed(|_: &DomainState, (a, b): (i64, i64)| Ok::<_, BoxError>(a + b));
/// let state = DomainState::new("math");
/// let out = add.call(&state, Args::from(vec![json!(2), json!(3)])).unwrap();
/// assert_eq!(out, json!(5));
/// ```
pub fn typed<F, A, R, E>(func: F) -> TypedHandler<F, A, R, E>
where
    F: Fn(&DomainState, A) -> Result<R, E> + Send + Sync + 'static,
    A: FromArgs + 'static,
    R: Serialize + 'static,
    E: Into<BoxError> + 'static,
{
    TypedHandler {
        func,
        _marker: PhantomData,
    }
}

impl<F, A, R, E> Handler for TypedHandler<F, A, R, E>
where
    F: Fn(&DomainState, A) -> Result<R, E> + Send + Sync + 'static,
    A: FromArgs + 'static,
    R: Serialize + 'static,
    E: Into<BoxError> + 'static,
{
    fn call(&self, state: &DomainState, args: Args) -> Result<Value, BoxError> {
        let input = A::from_args(&args)?;
        let output = (self.func)(state, input).map_err(Into::into)?;
        Ok(serde_json::to_value(output)?)
    }
}
