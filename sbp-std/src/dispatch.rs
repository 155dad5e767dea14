//! The dispatcher.
//!
//! `dispatch` resolves the selector's domain, checks the selector is
//! registered, runs the filter chain and finally calls the handler with its
//! domain's state. No table lock is held while filters or the handler run, so
//! both may call back into the registry.

use crate::{filters::evaluate, registry::Sbp};
use sbp_core::{Args, SbpError, Value, domain_of};
use serde::de::DeserializeOwned;

impl Sbp {
    /// Invoke `selector` with positional `args`.
    ///
    /// Returns `Ok(None)` when a filter vetoed the call; a veto is not an
    /// error. Handler failures are returned as [`SbpError::Handler`] carrying
    /// the handler's own error.
    pub fn dispatch(&self, selector: &str, args: Args) -> Result<Option<Value>, SbpError> {
        let domain = domain_of(selector)?;

        let (handler, state) = {
            let tables = self.inner.tables.read();
            let handler = tables.selectors.get(selector).cloned();
            let state = tables.domains.get(domain).map(|d| d.state.clone());
            match handler.zip(state) {
                Some(found) => found,
                None => return Err(SbpError::UnregisteredSelector(selector.to_owned())),
            }
        };

        let chain = self.inner.filters.read().resolve(domain, selector);
        if let Some(scope) = evaluate(&chain, domain, selector, &args) {
            tracing::debug!(%selector, %scope, "dispatch vetoed by filter");
            return Ok(None);
        }

        tracing::trace!(%selector, args = args.len(), "dispatching");
        handler
            .call(&state, args)
            .map(Some)
            .map_err(|source| SbpError::Handler {
                selector: selector.to_owned(),
                source,
            })
    }

    /// Dispatch and decode the handler's result into `T`.
    ///
    /// A veto yields `Ok(None)`.
    pub fn dispatch_as<T: DeserializeOwned>(
        &self,
        selector: &str,
        args: Args,
    ) -> Result<Option<T>, SbpError> {
        self.dispatch(selector, args)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(|source| SbpError::Result {
                selector: selector.to_owned(),
                source,
            })
    }
}
