//! # Positional Arguments
//!
//! Every dispatch carries an ordered list of dynamic values. Handlers can take
//! the raw [`Args`] or declare the shape they expect and have it extracted.
//!
//! # Extractors
//!
//! [`FromArgs`] is implemented for tuples of deserializable types: position
//! `i` of the tuple is decoded from argument `i`. A missing argument decodes
//! from `null`, so trailing `Option<T>` parameters are optional.
//!
//! ```rust,ignore
//! let (a, b): (i64, Option<i64>) = args.extract()?;
//! ```

use crate::error::ArgsError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ops::Deref;

/// Positional arguments of a single dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Vec<Value>);

impl Args {
    /// An empty argument list.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Argument at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Append an argument.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.0.push(value.into());
    }

    /// Extract a typed view of the arguments.
    pub fn extract<T: FromArgs>(&self) -> Result<T, ArgsError> {
        T::from_args(self)
    }

    /// Decode the argument at `index` (missing decodes from `null`).
    pub fn decode<T: DeserializeOwned>(&self, index: usize) -> Result<T, ArgsError> {
        let value = self.0.get(index).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| ArgsError::new(index, e.to_string()))
    }

    /// Consume into the underlying values.
    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

impl Deref for Args {
    type Target = [Value];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Args {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A trait for extracting a typed view from positional arguments.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be extracted from dispatch arguments",
    label = "missing `FromArgs` implementation",
    note = "Use a tuple of deserializable types, `()` or `Args`."
)]
pub trait FromArgs: Sized {
    /// Attempt to extract `Self` from the given arguments.
    fn from_args(args: &Args) -> Result<Self, ArgsError>;
}

impl FromArgs for () {
    fn from_args(_args: &Args) -> Result<Self, ArgsError> {
        Ok(())
    }
}

impl FromArgs for Args {
    fn from_args(args: &Args) -> Result<Self, ArgsError> {
        Ok(args.clone())
    }
}

// Tuple Extractors

macro_rules! impl_from_args_tuple {
    ($($idx:tt => $T:ident),+) => {
        impl<$($T,)+> FromArgs for ($($T,)+)
        where
            $($T: DeserializeOwned,)+
        {
            fn from_args(args: &Args) -> Result<Self, ArgsError> {
                Ok(($(args.decode::<$T>($idx)?,)+))
            }
        }
    };
}

impl_from_args_tuple!(0 => T1);
impl_from_args_tuple!(0 => T1, 1 => T2);
impl_from_args_tuple!(0 => T1, 1 => T2, 2 => T3);
impl_from_args_tuple!(0 => T1, 1 => T2, 2 => T3, 3 => T4);
impl_from_args_tuple!(0 => T1, 1 => T2, 2 => T3, 3 => T4, 4 => T5);
impl_from_args_tuple!(0 => T1, 1 => T2, 2 => T3, 3 => T4, 4 => T5, 5 => T6);
impl_from_args_tuple!(0 => T1, 1 => T2, 2 => T3, 3 => T4, 4 => T5, 5 => T6, 6 => T7);
impl_from_args_tuple!(0 => T1, 1 => T2, 2 => T3, 3 => T4, 4 => T5, 5 => T6, 6 => T7, 7 => T8);
