//! Link-time selector collection.
//!
//! Selectors declared anywhere in the program with `inventory::submit!` (or
//! the `#[sbp::selector]` attribute, which expands to it) are gathered by
//! [`Sbp::register_collected`] and registered in one batch.
//!
//! # Example
//!
//! ```rust,ignore
//! fn add(_: &DomainState, args: Args) -> Result<Value, BoxError> { ... }
//!
//! inventory::submit! {
//!     SelectorRegistration::new("math/add", add)
//! }
//!
//! let sbp = Sbp::new();
//! sbp.register_collected()?;
//! ```

use crate::registry::{Sbp, SelectorMap};
use indexmap::IndexMap;
use sbp_core::{
    Args, BoxError, BoxHandler, DomainState, SbpError, Value, domain_of, is_init_selector,
};
use std::sync::Arc;

/// Signature of a collected handler.
pub type CollectedFn = fn(&DomainState, Args) -> Result<Value, BoxError>;

/// A selector submitted for link-time collection.
#[derive(Debug, Clone, Copy)]
pub struct SelectorRegistration {
    /// Full selector name, `"<domain>/<name>"`.
    pub selector: &'static str,
    /// The handler.
    pub handler: CollectedFn,
    /// Mark the selector unsafe before registering it.
    pub overwritable: bool,
}

impl SelectorRegistration {
    /// Create a registration for a sealed selector.
    pub const fn new(selector: &'static str, handler: CollectedFn) -> Self {
        Self {
            selector,
            handler,
            overwritable: false,
        }
    }

    /// Allow the selector to be overwritten or unregistered later.
    pub const fn overwritable(mut self) -> Self {
        self.overwritable = true;
        self
    }

    fn is_init(&self) -> bool {
        domain_of(self.selector).is_ok_and(|domain| is_init_selector(self.selector, domain))
    }
}

inventory::collect!(SelectorRegistration);

/// All collected registrations, first submission winning on duplicates,
/// `_init` selectors first and the rest in lexical order.
fn collected() -> Vec<&'static SelectorRegistration> {
    let mut unique: IndexMap<&'static str, &'static SelectorRegistration> = IndexMap::new();
    for registration in inventory::iter::<SelectorRegistration> {
        if unique.contains_key(registration.selector) {
            tracing::warn!(
                selector = registration.selector,
                "selector collected twice, keeping the first submission"
            );
            continue;
        }
        unique.insert(registration.selector, registration);
    }

    let mut ordered: Vec<_> = unique.into_values().collect();
    ordered.sort_by(|a, b| {
        b.is_init()
            .cmp(&a.is_init())
            .then_with(|| a.selector.cmp(b.selector))
    });
    ordered
}

impl Sbp {
    /// Register every selector submitted through [`SelectorRegistration`].
    ///
    /// Overwritable selectors not yet registered are marked unsafe first.
    /// Returns the accepted names like [`register`](Self::register); calling
    /// it again accepts nothing new.
    pub fn register_collected(&self) -> Result<Vec<String>, SbpError> {
        let registrations = collected();
        tracing::debug!(count = registrations.len(), "registering collected selectors");

        let overwritable: Vec<&str> = registrations
            .iter()
            .filter(|r| r.overwritable && !self.is_registered(r.selector))
            .map(|r| r.selector)
            .collect();
        self.mark_unsafe(overwritable)?;

        let batch: SelectorMap = registrations
            .into_iter()
            .map(|r| {
                let handler: BoxHandler = Arc::new(r.handler);
                (r.selector.to_owned(), handler)
            })
            .collect();
        self.register(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn init(state: &DomainState, _: Args) -> Result<Value, BoxError> {
        state.insert(String::from("initialized"));
        Ok(Value::Null)
    }

    fn status(state: &DomainState, _: Args) -> Result<Value, BoxError> {
        let status = state.get::<String>().ok_or("not initialized")?;
        Ok(json!(status.as_str()))
    }

    fn version(_: &DomainState, _: Args) -> Result<Value, BoxError> {
        Ok(json!(1))
    }

    fn shadow(_: &DomainState, _: Args) -> Result<Value, BoxError> {
        Ok(json!("shadow"))
    }

    fn left(_: &DomainState, _: Args) -> Result<Value, BoxError> {
        Ok(json!("left"))
    }

    fn right(_: &DomainState, _: Args) -> Result<Value, BoxError> {
        Ok(json!("right"))
    }

    inventory::submit! { SelectorRegistration::new("collect/status", status) }
    inventory::submit! { SelectorRegistration::new("collect/_init", init) }
    inventory::submit! { SelectorRegistration::new("collect/version", version).overwritable() }
    inventory::submit! { SelectorRegistration::new("collect/twice", left) }
    inventory::submit! { SelectorRegistration::new("collect/twice", right) }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_init_runs_before_lexically_earlier_selectors() {
        let order: Vec<_> = collected()
            .into_iter()
            .map(|r| r.selector)
            .filter(|s| s.starts_with("collect/"))
            .collect();
        assert_eq!(
            order,
            vec!["collect/_init", "collect/status", "collect/twice", "collect/version"]
        );
    }

    #[test]
    fn test_duplicate_selector_keeps_first_submission() {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let kept: Vec<_> = tracing::subscriber::with_default(subscriber, collected)
            .into_iter()
            .filter(|r| r.selector == "collect/twice")
            .collect();
        assert_eq!(kept.len(), 1);

        let logs = String::from_utf8_lossy(&buffer.0.lock()).into_owned();
        assert!(logs.contains("selector collected twice"), "{logs}");
        assert!(logs.contains("collect/twice"), "{logs}");

        // Submission order is whatever the linker produced; the winner is the
        // first one iteration yields.
        let first = inventory::iter::<SelectorRegistration>
            .into_iter()
            .find(|r| r.selector == "collect/twice")
            .unwrap();
        let state = DomainState::new("collect");
        let expected = (first.handler)(&state, Args::new()).unwrap();

        let sbp = Sbp::new();
        sbp.register_collected().unwrap();
        assert_eq!(sbp.dispatch("collect/twice", Args::new()).unwrap(), Some(expected));
    }

    #[test]
    fn test_register_collected() {
        let sbp = Sbp::new();
        let accepted = sbp.register_collected().unwrap();
        assert!(accepted.contains(&"collect/status".to_owned()));
        assert_eq!(
            sbp.dispatch("collect/status", Args::new()).unwrap(),
            Some(json!("initialized"))
        );

        assert!(sbp.is_unsafe("collect/version"));
        assert!(!sbp.is_unsafe("collect/status"));
        sbp.overwrite(SelectorMap::new().with("collect/version", shadow as CollectedFn))
            .unwrap();
        assert_eq!(
            sbp.dispatch("collect/version", Args::new()).unwrap(),
            Some(json!("shadow"))
        );
    }

    #[test]
    fn test_register_collected_twice_accepts_nothing() {
        let sbp = Sbp::new();
        sbp.register_collected().unwrap();
        assert!(sbp.register_collected().unwrap().is_empty());
    }
}
