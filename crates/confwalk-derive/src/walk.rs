//! Implementation of the #[derive(Walk)] macro

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Fields, GenericParam, Ident, LitStr, Visibility};

pub fn derive_walk_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// One field of the generated record.
struct RecordField {
    ident: Ident,
    name: String,
    tag: String,
    exported: bool,
    embedded: bool,
}

fn expand(mut input: DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => {
                let mut fields = Vec::with_capacity(named.named.len());
                for field in &named.named {
                    if let Some(field) = parse_field(field)? {
                        fields.push(field);
                    }
                }
                fields
            }
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Walk requires a struct with named fields or a unit struct",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Walk can only be derived for structs",
            ));
        }
    };

    for param in &mut input.generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!(::confwalk::Walk));
        }
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let size = fields.len();

    let descriptors = fields.iter().map(|f| {
        let (name, tag, exported, embedded) = (&f.name, &f.tag, f.exported, f.embedded);
        quote! {
            ::confwalk::walk::Field::new(#name, #tag, #exported, #embedded)
        }
    });

    let arms = fields.iter().enumerate().map(|(index, f)| {
        let ident = &f.ident;
        quote! {
            #index => ::core::option::Option::Some(&self.#ident as &dyn ::confwalk::Walk),
        }
    });

    let arms_mut = fields.iter().enumerate().map(|(index, f)| {
        let ident = &f.ident;
        quote! {
            #index => ::core::option::Option::Some(&mut self.#ident as &mut dyn ::confwalk::Walk),
        }
    });

    let children = if fields.is_empty() {
        quote! {}
    } else {
        quote! {
            fn child(&self, index: usize) -> ::core::option::Option<&dyn ::confwalk::Walk> {
                match index {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn child_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn ::confwalk::Walk> {
                match index {
                    #(#arms_mut)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    };

    Ok(quote! {
        impl #impl_generics ::confwalk::Walk for #name #ty_generics #where_clause {
            fn shape(&self) -> ::confwalk::walk::Shape {
                ::confwalk::walk::Shape::Record
            }

            fn size(&self) -> usize {
                #size
            }

            fn fields(&self) -> &'static [::confwalk::walk::Field] {
                const FIELDS: &[::confwalk::walk::Field] = &[#(#descriptors),*];
                FIELDS
            }

            #children
        }
    })
}

/// Reads the `#[walk(...)]` attributes of a field; `None` for skipped fields.
fn parse_field(field: &syn::Field) -> syn::Result<Option<RecordField>> {
    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new_spanned(field, "expected a named field"));
    };

    let mut name = ident.unraw().to_string();
    let mut tag = String::new();
    let mut embedded = false;
    let mut skip = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("walk") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(meta.error("rename must not be empty"));
                }
                name = value.value();
            } else if meta.path.is_ident("tag") {
                let value: LitStr = meta.value()?.parse()?;
                tag = value.value();
            } else if meta.path.is_ident("embed") {
                embedded = true;
            } else if meta.path.is_ident("skip") {
                skip = true;
            } else {
                return Err(meta.error("unsupported walk attribute, expected rename, tag, embed or skip"));
            }
            Ok(())
        })?;
    }

    if skip {
        return Ok(None);
    }
    Ok(Some(RecordField {
        ident,
        name,
        tag,
        exported: !matches!(field.vis, Visibility::Inherited),
        embedded,
    }))
}
