//! Error types for SBP.
//!
//! This module provides the error taxonomy using `thiserror`:
//!
//! - [`SbpError`] - Every failure surfaced by the registry and dispatcher
//! - [`ArgsError`] - Positional argument extraction failures
//!
//! Soft registration rejections (locked domain, duplicate selector) are not
//! errors: they are logged and left out of the accepted list.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by registry, lock and dispatch operations.
#[derive(Error, Debug)]
pub enum SbpError {
    /// The selector has no `<domain>/` prefix.
    #[error("selector missing domain: {0}")]
    MalformedSelector(String),

    /// Dispatch against a name with no handler.
    #[error("selector not registered: {0}")]
    UnregisteredSelector(String),

    /// The selector is already registered.
    #[error("selector already registered: {0}")]
    AlreadyRegistered(String),

    /// Mutation attempted against a locked domain.
    #[error("domain of selector '{0}' is locked")]
    DomainLocked(String),

    /// Unregister attempted on a selector that was never marked unsafe.
    #[error("can't unregister locked selector: {0}")]
    SelectorLocked(String),

    /// Lock requested for a domain that does not exist.
    #[error("cannot lock non-existent domain: {0}")]
    UnknownDomain(String),

    /// The handler itself failed.
    #[error("handler for '{selector}' failed")]
    Handler {
        /// Selector whose handler failed.
        selector: String,
        /// The handler's error, unmodified.
        #[source]
        source: BoxError,
    },

    /// The handler result could not be decoded into the requested type.
    #[error("result of '{selector}' has an unexpected shape")]
    Result {
        /// Selector whose result was decoded.
        selector: String,
        /// The decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// An administrative handler outlived the registry it administers.
    #[error("registry has been dropped")]
    RegistryDropped,
}

impl SbpError {
    /// Returns the handler's own error if this is a handler failure.
    pub fn handler_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            SbpError::Handler { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Failure to extract a typed value from a positional argument.
#[derive(Error, Debug)]
#[error("argument {index}: {message}")]
pub struct ArgsError {
    index: usize,
    message: String,
}

impl ArgsError {
    /// Create a new extraction error for the argument at `index`.
    pub fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }

    /// Position of the offending argument.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
