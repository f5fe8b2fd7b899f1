//! Record derive macro implementation.
//!
//! Emits a `const` descriptor table (name, column, slot kind) in declaration
//! order and a `field_values` accessor reading the same fields in the same order.

use std::collections::HashSet;

use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

use crate::sql_ident::column_name;

/// Parsed `#[record(...)]` field attributes.
#[derive(Default)]
struct FieldAttr {
    column: Option<String>,
    skip: bool,
}

fn parse_field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut out = FieldAttr::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }

        let items = attr.parse_args_with(
            syn::punctuated::Punctuated::<syn::Meta, syn::Token![,]>::parse_terminated,
        )?;

        for meta in items {
            match meta {
                syn::Meta::Path(p) if p.is_ident("skip") => out.skip = true,
                syn::Meta::NameValue(nv) if nv.path.is_ident("column") => {
                    let syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(lit),
                        ..
                    }) = &nv.value
                    else {
                        return Err(syn::Error::new_spanned(
                            &nv.value,
                            "record(column = \"...\") expects a string literal",
                        ));
                    };
                    if out.column.is_some() {
                        return Err(syn::Error::new_spanned(
                            &nv,
                            "column can only be specified once",
                        ));
                    }
                    out.column = Some(column_name(lit)?);
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "unknown record attribute (supported: column = \"...\", skip)",
                    ));
                }
            }
        }
    }

    Ok(out)
}

/// `Option<..>` under any path (`Option`, `std::option::Option`, ...) with one type argument.
fn is_option(ty: &syn::Type) -> bool {
    let syn::Type::Path(path) = ty else {
        return false;
    };
    path.qself.is_none()
        && path.path.segments.last().is_some_and(|seg| {
            seg.ident == "Option"
                && matches!(
                    &seg.arguments,
                    syn::PathArguments::AngleBracketed(args)
                        if args.args.len() == 1
                            && matches!(args.args[0], syn::GenericArgument::Type(_))
                )
        })
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut defs = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());
    let mut seen_columns = HashSet::with_capacity(fields.len());

    for field in fields {
        let attr = parse_field_attr(field)?;
        if attr.skip {
            continue;
        }

        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = field_ident.unraw().to_string();
        let column = attr.column.unwrap_or_else(|| field_name.to_snake_case());

        if !seen_columns.insert(column.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate column '{column}' in Record"),
            ));
        }

        if is_option(&field.ty) {
            defs.push(quote! {
                ::recsql::FieldDef::new(#field_name, #column, ::recsql::SlotKind::Optional)
            });
            values.push(quote! {
                self.#field_ident.as_ref().map(::recsql::ToValue::to_value)
            });
        } else {
            defs.push(quote! {
                ::recsql::FieldDef::new(#field_name, #column, ::recsql::SlotKind::Plain)
            });
            values.push(quote! {
                ::core::option::Option::Some(::recsql::ToValue::to_value(&self.#field_ident))
            });
        }
    }

    // Every type parameter must convert into a bind value.
    let mut generics = input.generics.clone();
    let type_params: Vec<syn::Ident> = generics.type_params().map(|p| p.ident.clone()).collect();
    {
        let where_clause = generics.make_where_clause();
        for ident in type_params {
            where_clause
                .predicates
                .push(syn::parse_quote!(#ident: ::recsql::ToValue));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::recsql::Record for #name #ty_generics #where_clause {
            fn field_defs(&self) -> &[::recsql::FieldDef] {
                const FIELDS: &[::recsql::FieldDef] = &[#(#defs),*];
                FIELDS
            }

            fn field_values(
                &self,
            ) -> ::std::vec::Vec<::core::option::Option<::recsql::Value>> {
                ::std::vec![#(#values),*]
            }
        }
    })
}
