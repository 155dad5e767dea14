//! Domains and the lock manager.
//!
//! Domains are created lazily by the first registration under their prefix.
//! Locking is one-way: once locked, a domain accepts no new selectors and
//! gives up none of its existing ones. There is no unlock.

use crate::registry::Sbp;
use sbp_core::{DomainState, SbpError};
use std::sync::Arc;

/// One entry of the domain table.
#[derive(Debug)]
pub(crate) struct Domain {
    pub(crate) state: Arc<DomainState>,
    pub(crate) locked: bool,
}

impl Domain {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            state: Arc::new(DomainState::new(name)),
            locked: false,
        }
    }
}

impl Sbp {
    /// Lock the named domains.
    ///
    /// Fails with `UnknownDomain` if any name does not exist yet, in which case
    /// no domain is locked.
    pub fn lock_domains<I, S>(&self, domains: I) -> Result<(), SbpError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = domains
            .into_iter()
            .map(|name| name.as_ref().to_owned())
            .collect();
        let mut tables = self.inner.tables.write();
        if let Some(missing) = names.iter().find(|name| !tables.domains.contains_key(*name)) {
            return Err(SbpError::UnknownDomain(missing.clone()));
        }
        for name in &names {
            if let Some(domain) = tables.domains.get_mut(name) {
                domain.locked = true;
                tracing::debug!(domain = %name, "locked domain");
            }
        }
        Ok(())
    }

    /// Lock every domain known at the time of the call. Domains created later
    /// start unlocked.
    pub fn lock_all_domains(&self) {
        let mut tables = self.inner.tables.write();
        for (name, domain) in tables.domains.iter_mut() {
            domain.locked = true;
            tracing::debug!(domain = %name, "locked domain");
        }
    }

    /// Whether `domain` is locked, or `None` if it does not exist.
    pub fn is_locked(&self, domain: &str) -> Option<bool> {
        self.inner.tables.read().domains.get(domain).map(|d| d.locked)
    }

    /// All known domain names, sorted.
    pub fn domains(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.tables.read().domains.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}
