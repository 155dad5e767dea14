//! The reserved domain.
//!
//! Every registry starts with one domain of its own (`sbp` by default) that
//! publishes the administrative operations whose arguments are plain values,
//! and is locked before the registry is handed out so those primitives can
//! never be removed or replaced.
//!
//! | Selector | Arguments | Result |
//! |---|---|---|
//! | `sbp/selectors/unregister` | `[names]` | `null` |
//! | `sbp/selectors/unsafe` | `[names]` | `null` |
//! | `sbp/selectors/lock` | `[names]` | `null` |
//! | `sbp/domains/lock` | `[]` or `[names]` | `null` |
//! | `sbp/selectors/fn` | `[name]` | `bool` |
//!
//! Registration, overwriting and filters take Rust callables and are only
//! available as methods on [`Sbp`].

use crate::registry::{Admission, Inner, Sbp};
use sbp_core::{BoxHandler, DomainState, Handler, SbpError, typed};
use std::sync::{Arc, Weak};

/// Weak back-reference to the registry, kept in the reserved domain's state.
struct RegistryHandle(Weak<Inner>);

fn registry(state: &DomainState) -> Result<Sbp, SbpError> {
    state
        .get::<RegistryHandle>()
        .and_then(|handle| Sbp::upgrade(&handle.0))
        .ok_or(SbpError::RegistryDropped)
}

fn admin<H: Handler>(name: &'static str, handler: H) -> (&'static str, BoxHandler) {
    let handler: BoxHandler = Arc::new(handler);
    (name, handler)
}

fn admin_selectors() -> Vec<(&'static str, BoxHandler)> {
    vec![
        admin(
            "selectors/unregister",
            typed(|state: &DomainState, (names,): (Vec<String>,)| {
                registry(state)?.unregister(names)
            }),
        ),
        admin(
            "selectors/unsafe",
            typed(|state: &DomainState, (names,): (Vec<String>,)| {
                registry(state)?.mark_unsafe(names)
            }),
        ),
        admin(
            "selectors/lock",
            typed(|state: &DomainState, (names,): (Vec<String>,)| {
                registry(state)?.mark_safe(names);
                Ok::<_, SbpError>(())
            }),
        ),
        admin(
            "domains/lock",
            typed(|state: &DomainState, (names,): (Option<Vec<String>>,)| {
                let sbp = registry(state)?;
                match names {
                    Some(names) => sbp.lock_domains(names),
                    None => {
                        sbp.lock_all_domains();
                        Ok(())
                    }
                }
            }),
        ),
        admin(
            "selectors/fn",
            typed(|state: &DomainState, (name,): (String,)| {
                Ok::<_, SbpError>(registry(state)?.is_registered(&name))
            }),
        ),
    ]
}

pub(crate) fn install(sbp: &Sbp, with_admin_selectors: bool, lock: bool) {
    let reserved = sbp.reserved_domain().to_owned();
    let mut tables = sbp.inner.tables.write();
    tables
        .domain_entry(&reserved)
        .state
        .insert(RegistryHandle(sbp.downgrade()));

    if with_admin_selectors {
        for (name, handler) in admin_selectors() {
            let selector = format!("{reserved}/{name}");
            if let Admission::Rejected = tables.admit(&selector, &reserved, handler) {
                tracing::warn!(%selector, "administrative selector was not installed");
            }
        }
    }
    if lock {
        tables.domain_entry(&reserved).locked = true;
        tracing::debug!(domain = %reserved, "locked reserved domain");
    }
}

#[cfg(test)]
mod tests {
    use crate::{Sbp, SelectorMap};
    use sbp_core::{Args, SbpError, Value, handler_fn};
    use serde_json::json;

    fn noop() -> impl sbp_core::Handler {
        handler_fn(|_, _| Ok(Value::Null))
    }

    fn call(sbp: &Sbp, selector: &str, args: Vec<Value>) -> Result<Option<Value>, SbpError> {
        sbp.dispatch(selector, Args::from(args))
    }

    #[test]
    fn test_reserved_domain_is_locked_and_sealed() {
        let sbp = Sbp::new();
        assert_eq!(sbp.is_locked("sbp"), Some(true));
        assert!(sbp.register(SelectorMap::new().with("sbp/evil", noop())).unwrap().is_empty());
        assert!(matches!(
            sbp.unregister(["sbp/selectors/unregister"]),
            Err(SbpError::SelectorLocked(_))
        ));
    }

    #[test]
    fn test_admin_selectors_drive_registry() {
        let sbp = Sbp::new();
        call(&sbp, "sbp/selectors/unsafe", vec![json!(["test/unsafe"])]).unwrap();
        assert!(sbp.is_unsafe("test/unsafe"));
        sbp.register_one("test/unsafe", noop()).unwrap();
        assert_eq!(
            call(&sbp, "sbp/selectors/fn", vec![json!("test/unsafe")]).unwrap(),
            Some(json!(true))
        );

        call(&sbp, "sbp/selectors/unregister", vec![json!(["test/unsafe"])]).unwrap();
        assert!(!sbp.is_registered("test/unsafe"));
        assert_eq!(
            call(&sbp, "sbp/selectors/fn", vec![json!("test/unsafe")]).unwrap(),
            Some(json!(false))
        );

        call(&sbp, "sbp/selectors/lock", vec![json!(["test/unsafe"])]).unwrap();
        assert!(!sbp.is_unsafe("test/unsafe"));
    }

    #[test]
    fn test_admin_errors_surface_as_handler_errors() {
        let sbp = Sbp::new();
        sbp.register_one("fixed/x", noop()).unwrap();
        let err = call(&sbp, "sbp/selectors/unregister", vec![json!(["fixed/x"])]).unwrap_err();
        let source = err.handler_source().unwrap();
        assert!(source.to_string().contains("fixed/x"));

        // A bare string is not a list of names.
        assert!(call(&sbp, "sbp/selectors/unregister", vec![json!("fixed/x")]).is_err());
    }

    #[test]
    fn test_domains_lock_selector() {
        let sbp = Sbp::new();
        sbp.register(SelectorMap::new().with("one/x", noop()).with("two/x", noop()))
            .unwrap();
        call(&sbp, "sbp/domains/lock", vec![json!(["one"])]).unwrap();
        assert_eq!(sbp.is_locked("one"), Some(true));
        assert_eq!(sbp.is_locked("two"), Some(false));

        call(&sbp, "sbp/domains/lock", vec![]).unwrap();
        assert_eq!(sbp.is_locked("two"), Some(true));

        assert!(call(&sbp, "sbp/domains/lock", vec![json!(["ghost"])]).is_err());
    }

    #[test]
    fn test_without_admin_selectors() {
        let sbp = Sbp::builder().without_admin_selectors().build().unwrap();
        assert!(matches!(
            call(&sbp, "sbp/selectors/fn", vec![json!("x/y")]),
            Err(SbpError::UnregisteredSelector(_))
        ));
        assert_eq!(sbp.is_locked("sbp"), Some(true));
    }

    #[test]
    fn test_custom_reserved_domain() {
        let sbp = Sbp::builder().reserved_domain("admin").build().unwrap();
        assert!(sbp.is_registered("admin/selectors/fn"));
        assert!(!sbp.is_registered("sbp/selectors/fn"));
    }
}
