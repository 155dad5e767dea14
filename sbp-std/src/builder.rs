//! Registry construction.
//!
//! Use [`SbpBuilder`] to configure the reserved domain, then call `.build()`.
//! Building is the registry's init step; dropping the last [`Sbp`] handle is
//! its teardown.

use crate::{bootstrap, filters::FilterChains, registry::{Inner, Sbp, Tables}};
use parking_lot::RwLock;
use sbp_core::SbpError;

/// Default name of the reserved administrative domain.
pub const DEFAULT_RESERVED_DOMAIN: &str = "sbp";

/// Builder for constructing an [`Sbp`] registry.
///
/// # Example
/// ```
/// use sbp_std::Sbp;
///
/// let sbp = Sbp::builder()
///     .reserved_domain("core")
///     .build()
///     .unwrap();
/// assert_eq!(sbp.is_locked("core"), Some(true));
/// ```
#[derive(Debug, Clone)]
pub struct SbpBuilder {
    reserved: String,
    admin_selectors: bool,
    lock_reserved: bool,
}

impl Default for SbpBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SbpBuilder {
    /// Create a builder with the default configuration: reserved domain
    /// `sbp`, administrative selectors registered, domain locked.
    pub fn new() -> Self {
        Self {
            reserved: DEFAULT_RESERVED_DOMAIN.to_owned(),
            admin_selectors: true,
            lock_reserved: true,
        }
    }

    /// Rename the reserved domain. The name must be non-empty and must not
    /// contain `/`; it is checked by [`build`](Self::build).
    pub fn reserved_domain(mut self, name: impl Into<String>) -> Self {
        self.reserved = name.into();
        self
    }

    /// Create the reserved domain without administrative selectors.
    pub fn without_admin_selectors(mut self) -> Self {
        self.admin_selectors = false;
        self
    }

    /// Leave the reserved domain unlocked so more selectors can join it.
    pub fn unlocked_reserved(mut self) -> Self {
        self.lock_reserved = false;
        self
    }

    /// Build the registry and bootstrap its reserved domain.
    ///
    /// Fails with `MalformedSelector` if the reserved domain name is not a
    /// valid domain.
    pub fn build(self) -> Result<Sbp, SbpError> {
        if self.reserved.is_empty() || self.reserved.contains('/') {
            return Err(SbpError::MalformedSelector(self.reserved));
        }
        Ok(self.assemble())
    }

    fn assemble(self) -> Sbp {
        let sbp = Sbp::from_inner(Inner {
            tables: RwLock::new(Tables::default()),
            filters: RwLock::new(FilterChains::default()),
            reserved: self.reserved,
        });
        bootstrap::install(&sbp, self.admin_selectors, self.lock_reserved);
        sbp
    }
}

impl Sbp {
    /// Create a registry with the default configuration.
    pub fn new() -> Self {
        SbpBuilder::new().assemble()
    }

    /// Start configuring a registry.
    pub fn builder() -> SbpBuilder {
        SbpBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbp_core::{Value, handler_fn};

    #[test]
    fn test_reserved_domain_validation() {
        assert!(matches!(
            SbpBuilder::new().reserved_domain("a/b").build(),
            Err(SbpError::MalformedSelector(name)) if name == "a/b"
        ));
        assert!(SbpBuilder::new().reserved_domain("").build().is_err());
        assert!(SbpBuilder::new().reserved_domain("admin").build().is_ok());
    }

    #[test]
    fn test_setters_chain_before_validation() {
        let sbp = Sbp::builder()
            .reserved_domain("core")
            .without_admin_selectors()
            .unlocked_reserved()
            .build()
            .unwrap();
        assert_eq!(sbp.reserved_domain(), "core");
        assert_eq!(sbp.is_locked("core"), Some(false));
        assert!(!sbp.is_registered("core/selectors/fn"));
    }

    #[test]
    fn test_unlocked_reserved() {
        let sbp = Sbp::builder().unlocked_reserved().build().unwrap();
        assert_eq!(sbp.is_locked("sbp"), Some(false));
        assert!(sbp.register_one("sbp/extra", handler_fn(|_, _| Ok(Value::Null))).unwrap());
    }

    #[test]
    fn test_instances_are_isolated() {
        let a = Sbp::new();
        let b = Sbp::new();
        a.register_one("iso/x", handler_fn(|_, _| Ok(Value::Null))).unwrap();
        assert!(a.is_registered("iso/x"));
        assert!(!b.is_registered("iso/x"));
    }
}
