//! # sbp-macros
//!
//! Procedural macros for the SBP selector dispatch framework.
//!
//! # Available Macros
//!
//! - `#[selector("<domain>/<name>")]` - Publish a typed function for
//!   `Sbp::register_collected`
//! - `#[selector("<domain>/<name>", overwritable)]` - Same, marking the
//!   selector unsafe before registration

use proc_macro::TokenStream;

mod selector;

/// Attribute macro publishing a function under a selector.
///
/// The function must have the shape accepted by `sbp::typed`:
/// `fn(&DomainState, A) -> Result<R, E>` where `A: FromArgs`,
/// `R: Serialize` and `E: Into<BoxError>`.
///
/// # Example
///
/// ```rust,ignore
/// #[sbp::selector("math/add")]
/// fn add(_: &DomainState, (a, b): (i64, i64)) -> Result<i64, BoxError> {
///     Ok(a + b)
/// }
///
/// let sbp = Sbp::new();
/// sbp.register_collected()?;
/// ```
#[proc_macro_attribute]
pub fn selector(attr: TokenStream, item: TokenStream) -> TokenStream {
    selector::selector_impl(attr, item)
}
