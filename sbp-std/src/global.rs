//! The process-wide default registry.
//!
//! Modules that share no handle can still meet on [`global()`]. Tests and
//! embedders that need isolation should build their own [`Sbp`] instead.

use crate::registry::Sbp;
use std::sync::LazyLock;

static GLOBAL: LazyLock<Sbp> = LazyLock::new(Sbp::new);

/// Get the process-wide registry, bootstrapping it on first use.
pub fn global() -> &'static Sbp {
    &GLOBAL
}
