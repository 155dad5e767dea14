//! The `#[selector]` attribute.
//!
//! Publishes a typed function under a selector by submitting a
//! `SelectorRegistration` to `inventory`. The function itself is left
//! untouched and stays callable.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    FnArg, Ident, ItemFn, LitStr, Token,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments for the `#[selector]` macro.
pub(crate) struct SelectorArgs {
    /// Full selector name.
    pub selector: LitStr,
    /// Mark the selector unsafe before registration.
    pub overwritable: bool,
}

impl Parse for SelectorArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let selector: LitStr = input.parse()?;
        let mut overwritable = false;

        while !input.is_empty() {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }

            let ident: Ident = input.parse()?;
            match ident.to_string().as_str() {
                "overwritable" => overwritable = true,
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }
        }

        Ok(SelectorArgs {
            selector,
            overwritable,
        })
    }
}

/// Check the `<domain>/<name>` shape at compile time.
fn validate_selector(selector: &LitStr) -> syn::Result<()> {
    match selector.value().split_once('/') {
        Some((domain, _)) if !domain.is_empty() => Ok(()),
        _ => Err(syn::Error::new(
            selector.span(),
            "selector must have the form \"<domain>/<name>\"",
        )),
    }
}

fn validate_signature(input: &ItemFn) -> syn::Result<()> {
    let sig = &input.sig;
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(asyncness, "selector handlers must not be async"));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "selector handlers must not be generic",
        ));
    }
    if let Some(FnArg::Receiver(receiver)) = sig.inputs.first() {
        return Err(syn::Error::new_spanned(
            receiver,
            "selector handlers cannot have a self parameter",
        ));
    }
    if sig.inputs.len() != 2 {
        return Err(syn::Error::new_spanned(
            &sig.inputs,
            "selector handlers take `(state: &DomainState, args: impl FromArgs)`",
        ));
    }
    Ok(())
}

/// Generate the registration for an already parsed, valid function.
pub(crate) fn generate_registration(
    input: &ItemFn,
    args: &SelectorArgs,
) -> proc_macro2::TokenStream {
    let fn_name = &input.sig.ident;
    let selector = &args.selector;
    let overwritable = args.overwritable.then(|| quote! { .overwritable() });

    quote! {
        const _: () = {
            fn __sbp_erased(
                state: &::sbp::DomainState,
                args: ::sbp::Args,
            ) -> ::core::result::Result<::sbp::Value, ::sbp::BoxError> {
                ::sbp::Handler::call(&::sbp::typed(#fn_name), state, args)
            }

            ::sbp::inventory::submit! {
                ::sbp::collected::SelectorRegistration::new(#selector, __sbp_erased) #overwritable
            }
        };
    }
}

/// Implementation of the `#[selector]` macro.
///
/// # Example
///
/// ```rust,ignore
/// #[sbp::selector("math/add")]
/// fn add(_: &DomainState, (a, b): (i64, i64)) -> Result<i64, BoxError> {
///     Ok(a + b)
/// }
/// ```
pub fn selector_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as SelectorArgs);
    let input = parse_macro_input!(item as ItemFn);

    if let Err(err) = validate_selector(&args.selector).and_then(|()| validate_signature(&input)) {
        return err.to_compile_error().into();
    }

    let registration = generate_registration(&input, &args);
    let expanded = quote! {
        #input
        #registration
    };

    TokenStream::from(expanded)
}
