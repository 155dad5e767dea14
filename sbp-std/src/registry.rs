//! Selector registry.
//!
//! This module holds the [`Sbp`] context: the selector table, the domain
//! table, the unsafe-set and the filter chains of one isolated registry,
//! together with the registration operations.
//!
//! Registration is soft: selectors rejected because their domain is locked or
//! because they already exist are logged and left out of the accepted list.
//! Every other failure is returned as an [`SbpError`].

use crate::{domain::Domain, filters::FilterChains};
use indexmap::IndexMap;
use parking_lot::RwLock;
use sbp_core::{Args, BoxHandler, DomainState, Handler, SbpError, domain_of, is_init_selector};
use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::{Arc, Weak},
};

/// An insertion-ordered batch of selectors and their handlers.
///
/// # Example
/// ```ignore
/// let batch = SelectorMap::new()
///     .with("math/_init", handler_fn(|state, _| { ... }))
///     .with("math/add", typed(add));
/// ```
#[derive(Default, Clone)]
pub struct SelectorMap {
    entries: IndexMap<String, BoxHandler>,
}

impl SelectorMap {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a selector (builder style). A repeated name replaces the earlier
    /// handler and keeps its position.
    pub fn with<H: Handler>(mut self, selector: impl Into<String>, handler: H) -> Self {
        self.insert(selector, handler);
        self
    }

    /// Add a selector (mutable version).
    pub fn insert<H: Handler>(&mut self, selector: impl Into<String>, handler: H) {
        self.entries.insert(selector.into(), Arc::new(handler));
    }

    /// Add an already shared handler.
    pub fn insert_shared(&mut self, selector: impl Into<String>, handler: BoxHandler) {
        self.entries.insert(selector.into(), handler);
    }

    /// Whether `selector` is part of the batch.
    pub fn contains(&self, selector: &str) -> bool {
        self.entries.contains_key(selector)
    }

    /// Selector names in insertion order.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Get the number of selectors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for SelectorMap {
    type Item = (String, BoxHandler);
    type IntoIter = indexmap::map::IntoIter<String, BoxHandler>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, BoxHandler)> for SelectorMap {
    fn from_iter<I: IntoIterator<Item = (String, BoxHandler)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for SelectorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

/// A `_init` hook admitted during registration, to be run once the tables
/// are unlocked.
pub(crate) struct PendingInit {
    selector: String,
    handler: BoxHandler,
    state: Arc<DomainState>,
}

impl PendingInit {
    pub(crate) fn run(self) -> Result<(), SbpError> {
        tracing::debug!(selector = %self.selector, "running domain init");
        self.handler
            .call(&self.state, Args::new())
            .map(drop)
            .map_err(|source| SbpError::Handler {
                selector: self.selector,
                source,
            })
    }
}

pub(crate) enum Admission {
    Accepted(Option<PendingInit>),
    Rejected,
}

/// Selector table, domain table and unsafe-set.
#[derive(Default)]
pub(crate) struct Tables {
    pub(crate) selectors: HashMap<String, BoxHandler>,
    pub(crate) domains: HashMap<String, Domain>,
    pub(crate) unsafe_set: HashSet<String>,
}

impl Tables {
    /// Get the domain, creating it empty and unlocked on first use.
    pub(crate) fn domain_entry(&mut self, name: &str) -> &mut Domain {
        self.domains.entry(name.to_owned()).or_insert_with(|| {
            tracing::debug!(domain = %name, "creating domain");
            Domain::new(name)
        })
    }

    /// Try to store one handler. `domain` must be `domain_of(selector)`.
    pub(crate) fn admit(&mut self, selector: &str, domain: &str, handler: BoxHandler) -> Admission {
        let entry = self.domain_entry(domain);
        if entry.locked {
            tracing::warn!(%selector, "not registering selector on locked domain");
            return Admission::Rejected;
        }
        let state = entry.state.clone();

        if self.selectors.contains_key(selector) {
            tracing::warn!(%selector, "not registering already registered selector");
            return Admission::Rejected;
        }
        if self.unsafe_set.contains(selector) {
            tracing::warn!(
                %selector,
                "registering unsafe selector (remember to lock after overwriting)"
            );
        }

        let init = is_init_selector(selector, domain).then(|| PendingInit {
            selector: selector.to_owned(),
            handler: handler.clone(),
            state,
        });
        self.selectors.insert(selector.to_owned(), handler);
        tracing::debug!(%selector, "registered selector");
        Admission::Accepted(init)
    }

    /// Check that every name may be unregistered.
    pub(crate) fn check_removable(&self, selectors: &[String]) -> Result<(), SbpError> {
        for selector in selectors {
            if !self.unsafe_set.contains(selector) {
                return Err(SbpError::SelectorLocked(selector.clone()));
            }
            let domain = domain_of(selector)?;
            if self.domains.get(domain).is_some_and(|d| d.locked) {
                return Err(SbpError::DomainLocked(selector.clone()));
            }
        }
        Ok(())
    }

    pub(crate) fn remove_all(&mut self, selectors: &[String]) {
        for selector in selectors {
            if self.selectors.remove(selector).is_some() {
                tracing::debug!(%selector, "unregistered selector");
            }
        }
    }
}

pub(crate) struct Inner {
    pub(crate) tables: RwLock<Tables>,
    pub(crate) filters: RwLock<FilterChains>,
    pub(crate) reserved: String,
}

/// An isolated selector registry and dispatcher.
///
/// `Sbp` is a cheap handle: clones share the same tables. Construction
/// bootstraps the reserved domain (see [`SbpBuilder`]); dropping the last
/// handle tears the registry down.
///
/// [`SbpBuilder`]: crate::SbpBuilder
#[derive(Clone)]
pub struct Sbp {
    pub(crate) inner: Arc<Inner>,
}

impl Sbp {
    pub(crate) fn from_inner(inner: Inner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<Inner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Name of the reserved administrative domain.
    pub fn reserved_domain(&self) -> &str {
        &self.inner.reserved
    }

    /// Register a batch of selectors, returning the accepted names in input
    /// order.
    ///
    /// A `<domain>/_init` selector is invoked with its domain's state as soon
    /// as it is accepted, before the rest of the batch is processed.
    pub fn register(&self, selectors: SelectorMap) -> Result<Vec<String>, SbpError> {
        let mut accepted = Vec::with_capacity(selectors.len());
        for (selector, handler) in selectors {
            let domain = domain_of(&selector)?;
            let admission = self.inner.tables.write().admit(&selector, domain, handler);
            if let Admission::Accepted(init) = admission {
                accepted.push(selector);
                if let Some(init) = init {
                    init.run()?;
                }
            }
        }
        Ok(accepted)
    }

    /// Register a single selector. Returns whether it was accepted.
    pub fn register_one<H: Handler>(
        &self,
        selector: impl Into<String>,
        handler: H,
    ) -> Result<bool, SbpError> {
        let accepted = self.register(SelectorMap::new().with(selector, handler))?;
        Ok(!accepted.is_empty())
    }

    /// Remove selectors previously marked unsafe.
    ///
    /// Every name is checked before anything is removed. Fails with
    /// `SelectorLocked` for a name never marked unsafe and with `DomainLocked`
    /// when its domain is locked.
    pub fn unregister<I, S>(&self, selectors: I) -> Result<(), SbpError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = collect_names(selectors);
        let mut tables = self.inner.tables.write();
        tables.check_removable(&names)?;
        tables.remove_all(&names);
        Ok(())
    }

    /// Replace unsafe selectors: unregister every name of the batch, then
    /// register the batch.
    ///
    /// Removal and re-insertion happen under one table lock, so a concurrent
    /// dispatch sees either the old or the new handler. `_init` hooks of the
    /// replacement run afterwards, in batch order.
    pub fn overwrite(&self, selectors: SelectorMap) -> Result<Vec<String>, SbpError> {
        let names: Vec<String> = selectors.selectors().map(str::to_owned).collect();
        let mut accepted = Vec::with_capacity(names.len());
        let mut inits = Vec::new();
        {
            let mut tables = self.inner.tables.write();
            tables.check_removable(&names)?;
            tables.remove_all(&names);
            for (selector, handler) in selectors {
                let domain = domain_of(&selector)?;
                if let Admission::Accepted(init) = tables.admit(&selector, domain, handler) {
                    accepted.push(selector);
                    inits.extend(init);
                }
            }
        }
        for init in inits {
            init.run()?;
        }
        Ok(accepted)
    }

    /// Declare selectors removable/overwritable.
    ///
    /// Must happen before first registration: fails with `AlreadyRegistered`
    /// if any name is already registered and with `MalformedSelector` if a
    /// name has no domain, in which case nothing is marked.
    pub fn mark_unsafe<I, S>(&self, selectors: I) -> Result<(), SbpError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = collect_names(selectors);
        for name in &names {
            domain_of(name)?;
        }
        let mut tables = self.inner.tables.write();
        if let Some(taken) = names.iter().find(|s| tables.selectors.contains_key(*s)) {
            return Err(SbpError::AlreadyRegistered(taken.clone()));
        }
        tables.unsafe_set.extend(names);
        Ok(())
    }

    /// Clear the unsafe flag, sealing the selectors again.
    pub fn mark_safe<I, S>(&self, selectors: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tables = self.inner.tables.write();
        for selector in selectors {
            tables.unsafe_set.remove(selector.as_ref());
        }
    }

    /// Get the handler registered under `selector`.
    pub fn lookup(&self, selector: &str) -> Option<BoxHandler> {
        self.inner.tables.read().selectors.get(selector).cloned()
    }

    /// Whether a handler is registered under `selector`.
    pub fn is_registered(&self, selector: &str) -> bool {
        self.inner.tables.read().selectors.contains_key(selector)
    }

    /// Whether `selector` is currently marked unsafe.
    pub fn is_unsafe(&self, selector: &str) -> bool {
        self.inner.tables.read().unsafe_set.contains(selector)
    }

    /// All registered selector names, sorted.
    pub fn selectors(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.tables.read().selectors.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// State of `domain`, if the domain exists.
    pub fn state(&self, domain: &str) -> Option<Arc<DomainState>> {
        self.inner
            .tables
            .read()
            .domains
            .get(domain)
            .map(|d| d.state.clone())
    }
}

impl Default for Sbp {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Sbp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.inner.tables.read();
        f.debug_struct("Sbp")
            .field("reserved", &self.inner.reserved)
            .field("selectors", &tables.selectors.len())
            .field("domains", &tables.domains.len())
            .finish()
    }
}

fn collect_names<I, S>(selectors: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    selectors
        .into_iter()
        .map(|s| s.as_ref().to_owned())
        .collect()
}
