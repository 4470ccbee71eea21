//! Token generation for `Context` and `FromContext`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::fields;

pub fn context(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut impls = Vec::new();
    for field in fields::named(input, "Context")? {
        if fields::has_flag(&field.attrs, "context", "skip")? {
            continue;
        }
        let field_name = fields::ident(field)?;
        let field_type = &field.ty;
        impls.push(quote! {
            impl #impl_generics crate::FromRef<#name #ty_generics> for #field_type #where_clause {
                fn from_ref(ctx: &#name #ty_generics) -> Self {
                    ctx.#field_name.clone()
                }
            }
        });
    }

    Ok(quote! { #(#impls)* })
}

pub fn from_context(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let context = match fields::context_type(&input.attrs)? {
        Some(ty) => quote! { #ty },
        None => quote! { Context },
    };

    let mut inits = Vec::new();
    for field in fields::named(input, "FromContext")? {
        let field_name = fields::ident(field)?;
        let field_type = &field.ty;
        if fields::has_flag(&field.attrs, "from_context", "default")? {
            inits.push(quote! {
                #field_name: <#field_type as ::core::default::Default>::default()
            });
        } else {
            inits.push(quote! {
                #field_name: <#field_type as crate::FromRef<#context>>::from_ref(ctx)
            });
        }
    }

    Ok(quote! {
        impl #impl_generics crate::FromRef<#context> for #name #ty_generics #where_clause {
            fn from_ref(ctx: &#context) -> Self {
                Self { #(#inits),* }
            }
        }
    })
}
