//! Derive macros for commgraph's compile-time dependency injection.
//!
//! - `#[derive(Context)]` exposes every field of the root context through
//!   `crate::FromRef<Context>`.
//! - `#[derive(FromContext)]` builds a repository or service by resolving
//!   each of its fields from the context.
//!
//! Generated code refers to `crate::FromRef`, so the consuming crate must
//! re-export the trait at its root.

use proc_macro::TokenStream;

mod expand;
mod fields;

/// Implements `crate::FromRef<Self>` for the type of every named field.
///
/// Fields marked `#[context(skip)]` are left out, which is needed when two
/// fields share a type or a field is private plumbing.
///
/// ```ignore
/// #[derive(Context, Clone)]
/// pub struct Context {
///     pub graph: AppGraph,
///     pub config: Arc<Config>,
/// }
/// // impl FromRef<Context> for AppGraph { .. }
/// // impl FromRef<Context> for Arc<Config> { .. }
/// ```
#[proc_macro_derive(Context, attributes(context))]
pub fn derive_context(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    expand::context(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Implements `crate::FromRef<Ctx>` for a struct by resolving each field.
///
/// The context type defaults to `Context` in scope and can be overridden
/// with `#[from_context(Context = "path::To::Ctx")]`. Field-level
/// `#[from_context(default)]` initialises the field with `Default::default()`
/// instead of resolving it.
///
/// ```ignore
/// #[derive(FromContext, Clone)]
/// pub struct CommunicationRepository {
///     graph: AppGraph,
/// }
/// ```
#[proc_macro_derive(FromContext, attributes(from_context))]
pub fn derive_from_context(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    expand::from_context(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
