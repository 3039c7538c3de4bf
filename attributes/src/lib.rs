#![deny(missing_docs)]

//! Macro attributes for Netlify functions.
//!
//! An asynchronous `main` annotated with the `#[netlify]` attribute must
//! accept a `netlify_functions::Request` and a `netlify_functions::Context`
//! and return a `netlify_functions::Response`; the attribute expands the
//! function into the handler-registration boilerplate. The `#[netlify(bg)]`
//! flavor registers a background handler returning `Result<(), Error>`
//! instead.

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote_spanned;
use syn::{spanned::Spanned, AttributeArgs, FnArg, ItemFn, Meta, NestedMeta};

/// Return true if the attribute args declare the background flavor in the
/// form `#[netlify(bg)]`
fn is_bg(args: &AttributeArgs) -> bool {
    args.iter().any(|arg| match arg {
        NestedMeta::Meta(Meta::Path(path)) => path.is_ident("bg"),
        _ => false,
    })
}

#[proc_macro_attribute]
/// Wrap an async main function into a registered function handler
pub fn netlify(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemFn);
    let args = syn::parse_macro_input!(attr as AttributeArgs);
    let ret = &input.sig.output;
    let name = &input.sig.ident;
    let body = &input.block;
    let attrs = &input.attrs;
    let asyncness = &input.sig.asyncness;
    let inputs = &input.sig.inputs;

    if name != "main" {
        let tokens = quote_spanned! { name.span() =>
            compile_error!("only the main function can be tagged with #[netlify]");
        };
        return TokenStream::from(tokens);
    }

    if asyncness.is_none() {
        let tokens = quote_spanned! { input.span() =>
          compile_error!("the async keyword is missing from the function declaration");
        };
        return TokenStream::from(tokens);
    }

    let result = match inputs.len() {
        2 => {
            let request = match inputs.first().expect("expected request argument") {
                FnArg::Typed(arg) => arg,
                _ => {
                    let tokens = quote_spanned! { inputs.span() =>
                        compile_error!("fn main's first argument must be fully formed");
                    };
                    return TokenStream::from(tokens);
                }
            };
            let request_name = &request.pat;
            let request_type = &request.ty;
            let context = match inputs.iter().nth(1).expect("expected context argument") {
                FnArg::Typed(arg) => arg,
                _ => {
                    let tokens = quote_spanned! { inputs.span() =>
                        compile_error!("fn main's second argument must be fully formed");
                    };
                    return TokenStream::from(tokens);
                }
            };
            let context_name = &context.pat;
            let context_type = &context.ty;

            if is_bg(&args) {
                quote_spanned! { input.span() =>

                    #(#attrs)*
                    #asyncness fn main() {
                        async fn actual(#request_name: #request_type, #context_name: #context_type) #ret #body

                        netlify_functions::start_bg(actual).await.unwrap();
                    }
                }
            } else {
                quote_spanned! { input.span() =>

                    #(#attrs)*
                    #asyncness fn main() {
                        async fn actual(#request_name: #request_type, #context_name: #context_type) #ret #body

                        netlify_functions::start(actual).await.unwrap();
                    }
                }
            }
        }
        _ => {
            let tokens = quote_spanned! { inputs.span() =>
                compile_error!("the #[netlify] macro expects two arguments: a request and its invocation context");
            };
            return TokenStream::from(tokens);
        }
    };

    result.into()
}
