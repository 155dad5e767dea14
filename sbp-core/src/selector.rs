//! Selector names.
//!
//! A selector is a string of the form `<domain>/<rest>`. The domain is
//! everything before the first `/` and must be non-empty.

use crate::error::SbpError;

/// Suffix of the per-domain construction hook.
pub const INIT_SUFFIX: &str = "_init";

/// Derive the domain of a selector.
///
/// # Example
///
/// ```rust
/// use sbp_core::domain_of;
///
/// assert_eq!(domain_of("math/add").unwrap(), "math");
/// assert_eq!(domain_of("a/b/c").unwrap(), "a");
/// assert!(domain_of("plain").is_err());
/// ```
pub fn domain_of(selector: &str) -> Result<&str, SbpError> {
    match selector.split_once('/') {
        Some((domain, _)) if !domain.is_empty() => Ok(domain),
        _ => Err(SbpError::MalformedSelector(selector.to_owned())),
    }
}

/// Whether `selector` is exactly `<domain>/_init` for its own domain.
pub fn is_init_selector(selector: &str, domain: &str) -> bool {
    selector
        .strip_prefix(domain)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|name| name == INIT_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_is_prefix_before_first_slash() {
        assert_eq!(domain_of("math/add").unwrap(), "math");
        assert_eq!(domain_of("net/http/get").unwrap(), "net");
        assert_eq!(domain_of("x/").unwrap(), "x");
    }

    #[test]
    fn test_selector_without_slash_is_malformed() {
        for bad in ["", "math", "add_numbers", "/leading"] {
            match domain_of(bad) {
                Err(SbpError::MalformedSelector(s)) => assert_eq!(s, bad),
                other => panic!("expected MalformedSelector for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_init_selector_detection() {
        assert!(is_init_selector("math/_init", "math"));
        assert!(!is_init_selector("math/_init2", "math"));
        assert!(!is_init_selector("math/sub/_init", "math"));
        assert!(!is_init_selector("mathx/_init", "math"));
    }
}
