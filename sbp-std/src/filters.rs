//! Filter chains.
//!
//! Three append-only registries of filters: per selector, per domain and
//! global. A dispatch resolves its chain as selector filters, then domain
//! filters, then global filters, each in registration order.

use crate::registry::Sbp;
use sbp_core::{Args, BoxFilter, Filter, FilterResult};
use std::{collections::HashMap, fmt, sync::Arc};

/// Which scope a filter was attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterScope {
    /// Attached to one selector.
    Selector,
    /// Attached to every selector of a domain.
    Domain,
    /// Attached to every dispatch.
    Global,
}

impl fmt::Display for FilterScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterScope::Selector => "selector",
            FilterScope::Domain => "domain",
            FilterScope::Global => "global",
        })
    }
}

#[derive(Default)]
pub(crate) struct FilterChains {
    global: Vec<BoxFilter>,
    by_domain: HashMap<String, Vec<BoxFilter>>,
    by_selector: HashMap<String, Vec<BoxFilter>>,
}

impl FilterChains {
    /// Snapshot the chain for one call, most specific scope first.
    pub(crate) fn resolve(&self, domain: &str, selector: &str) -> Vec<(FilterScope, BoxFilter)> {
        let scopes = [
            (FilterScope::Selector, self.by_selector.get(selector)),
            (FilterScope::Domain, self.by_domain.get(domain)),
            (FilterScope::Global, Some(&self.global)),
        ];
        let mut chain = Vec::new();
        for (scope, filters) in scopes {
            chain.extend(filters.into_iter().flatten().map(|f| (scope, f.clone())));
        }
        chain
    }
}

/// Run a resolved chain. Returns the scope of the vetoing filter, if any.
pub(crate) fn evaluate(
    chain: &[(FilterScope, BoxFilter)],
    domain: &str,
    selector: &str,
    args: &Args,
) -> Option<FilterScope> {
    chain
        .iter()
        .find(|(_, filter)| filter.check(domain, selector, args) == FilterResult::Veto)
        .map(|(scope, _)| *scope)
}

impl Sbp {
    /// Attach a filter run on every dispatch.
    pub fn add_global_filter<F: Filter>(&self, filter: F) {
        self.inner.filters.write().global.push(Arc::new(filter));
    }

    /// Attach a filter run on every dispatch into `domain`.
    ///
    /// The domain does not need to exist yet.
    pub fn add_domain_filter<F: Filter>(&self, domain: impl Into<String>, filter: F) {
        self.inner
            .filters
            .write()
            .by_domain
            .entry(domain.into())
            .or_default()
            .push(Arc::new(filter));
    }

    /// Attach a filter run on every dispatch of `selector`.
    pub fn add_selector_filter<F: Filter>(&self, selector: impl Into<String>, filter: F) {
        self.inner
            .filters
            .write()
            .by_selector
            .entry(selector.into())
            .or_default()
            .push(Arc::new(filter));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingFilter;

    #[test]
    fn test_resolve_orders_scopes() {
        let mut chains = FilterChains::default();
        let g = RecordingFilter::new("global");
        let d = g.sibling("domain");
        let s = g.sibling("selector");
        let other = g.sibling("other-domain");
        chains.global.push(Arc::new(g.clone()));
        chains.by_domain.entry("math".into()).or_default().push(Arc::new(d));
        chains.by_domain.entry("io".into()).or_default().push(Arc::new(other));
        chains.by_selector.entry("math/add".into()).or_default().push(Arc::new(s));

        let chain = chains.resolve("math", "math/add");
        let scopes: Vec<_> = chain.iter().map(|(scope, _)| *scope).collect();
        assert_eq!(
            scopes,
            vec![FilterScope::Selector, FilterScope::Domain, FilterScope::Global]
        );

        assert_eq!(evaluate(&chain, "math", "math/add", &Args::new()), None);
        assert_eq!(g.labels(), vec!["selector", "domain", "global"]);
    }

    #[test]
    fn test_evaluate_stops_at_first_veto() {
        let mut chains = FilterChains::default();
        let first = RecordingFilter::new("first");
        let veto = first.sibling("veto").vetoing();
        let never = first.sibling("never");
        chains.global.push(Arc::new(first.clone()));
        chains.global.push(Arc::new(veto));
        chains.global.push(Arc::new(never));

        let chain = chains.resolve("d", "d/x");
        assert_eq!(evaluate(&chain, "d", "d/x", &Args::new()), Some(FilterScope::Global));
        assert_eq!(first.labels(), vec!["first", "veto"]);
    }

    #[test]
    fn test_empty_chain() {
        let chains = FilterChains::default();
        assert!(chains.resolve("d", "d/x").is_empty());
    }
}
