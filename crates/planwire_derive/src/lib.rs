//! Derive macros for the `Identifiable` and `Payload` traits of `planwire`.
//!
//! # `Identifiable`
//!
//! Gives the type a stable key built from the crate name, crate version,
//! module path and type name. Generic types get a family key shared by all
//! instantiations, and a type key combining the family with the keys of the
//! type arguments.
//!
//! ```ignore
//! #[derive(Identifiable)]
//! struct Project<E> {
//!     input: Arc<PlanNode>,
//!     expressions: Vec<E>,
//! }
//! ```
//!
//! # `Payload`
//!
//! Writes structs field by field in declaration order, and enums as the
//! variant index (as `usize`) followed by the variant's fields. Every field
//! goes through the engine's dispatch, so nested environment references are
//! injected or resolved like top-level ones.
//!
//! ## Field attributes
//!
//! - `#[payload(skip)]`: the field is not written and decodes to
//!   `Default::default()`.
//!
//! ## Container attributes
//!
//! - `#[payload(placeholder)]`: shared instances of the type are allocated
//!   with `Default::default()` before their fields are read, so weak
//!   back-edges to them can be resolved while they are decoded.
//! - `#[payload(writable)]`: the type joins the writable category and travels
//!   as its native bytes. It must implement `planwire::Writable`.
//!
//! ```ignore
//! #[derive(Identifiable, Payload)]
//! #[payload(placeholder)]
//! struct Filter {
//!     parent: Weak<Filter>,
//!     condition: Expression,
//!     #[payload(skip)]
//!     digest: OnceLock<String>,
//! }
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DataEnum, DataStruct, DeriveInput, Field, Fields, Index,
    parse_macro_input,
};

// =============================================================================
// Identifiable
// =============================================================================

/// Derives `planwire::Identifiable`.
///
/// Lifetime and constant parameters are rejected; every type parameter gets
/// an `Identifiable` bound.
#[proc_macro_derive(Identifiable)]
pub fn derive_identifiable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    implements_identifiable(&input.ident, input.generics).into()
}

fn implements_identifiable(
    name: &syn::Ident,
    mut generics: syn::Generics,
) -> proc_macro2::TokenStream {
    if let Some(lt_param) = generics.lifetimes().next() {
        return syn::Error::new_spanned(
            lt_param,
            "lifetime parameters are not allowed in identifiable types",
        )
        .to_compile_error();
    }
    if let Some(const_param) = generics.const_params().next() {
        return syn::Error::new_spanned(
            const_param,
            "constant parameters are not allowed in identifiable types",
        )
        .to_compile_error();
    }

    let unique_type_name = quote! {
        concat!(
            env!("CARGO_PKG_NAME"),
            "@",
            env!("CARGO_PKG_VERSION"),
            "::",
            module_path!(),
            "::",
            stringify!(#name)
        )
    };

    let keys = if generics.params.is_empty() {
        quote! {
            const TYPE_KEY: ::planwire::TypeKey =
                ::planwire::TypeKey::of_name(#unique_type_name);
        }
    } else {
        for ty_param in generics.type_params_mut() {
            ty_param.bounds.push(syn::parse_quote!(::planwire::Identifiable));
        }

        let type_params = generics.type_params().map(|x| &x.ident);

        quote! {
            const FAMILY: ::planwire::TypeKey =
                ::planwire::TypeKey::of_name(#unique_type_name);

            const TYPE_KEY: ::planwire::TypeKey = {
                let key = <Self as ::planwire::Identifiable>::FAMILY;
                #(
                    let key = key.combine(
                        <#type_params as ::planwire::Identifiable>::TYPE_KEY
                    );
                )*
                key
            };
        }
    };

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        #[allow(clippy::trait_duplication_in_bounds)]
        impl #impl_generics
            ::planwire::Identifiable for #name #ty_generics #where_clause
        {
            #keys
        }
    }
}

// =============================================================================
// Payload
// =============================================================================

#[derive(Default)]
struct ContainerOptions {
    placeholder: bool,
    writable: bool,
}

impl ContainerOptions {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut options = Self::default();

        let attrs = attrs.iter().filter(|attr| attr.path().is_ident("payload"));

        for attr in attrs {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("placeholder") {
                    options.placeholder = true;
                    Ok(())
                } else if meta.path.is_ident("writable") {
                    options.writable = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown payload container attribute"))
                }
            })?;
        }

        Ok(options)
    }
}

/// Checks if a field has the `#[payload(skip)]` attribute.
fn should_skip(field: &Field) -> syn::Result<bool> {
    let mut skip = false;

    let attrs =
        field.attrs.iter().filter(|attr| attr.path().is_ident("payload"));

    for attr in attrs {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unknown payload field attribute"))
            }
        })?;
    }

    Ok(skip)
}

/// Derives `planwire::Payload`.
///
/// Every type parameter gets a `Payload` bound.
#[proc_macro_derive(Payload, attributes(payload))]
pub fn derive_payload(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    implements_payload(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn implements_payload(
    input: &DeriveInput,
) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let options = ContainerOptions::parse(&input.attrs)?;

    let (impl_generics, ty_generics, where_clause) =
        input.generics.split_for_impl();

    let mut where_clause =
        where_clause.cloned().unwrap_or_else(|| syn::parse_quote!(where));

    for param in &input.generics.params {
        if let syn::GenericParam::Type(type_param) = param {
            let ident = &type_param.ident;
            where_clause
                .predicates
                .push(syn::parse_quote!(#ident: ::planwire::Payload));
        }
    }

    let body = if options.writable {
        implements_writable()
    } else {
        let (write_impl, read_impl) = match &input.data {
            Data::Struct(data_struct) => (
                impl_write_struct(data_struct)?,
                impl_read_struct(data_struct)?,
            ),
            Data::Enum(data_enum) => {
                (impl_write_enum(data_enum)?, impl_read_enum(data_enum)?)
            }
            Data::Union(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Payload cannot be derived for unions",
                ));
            }
        };

        quote! {
            #[allow(unused_variables)]
            fn write_fields(
                &self,
                output: &mut ::planwire::Output<'_>,
            ) -> ::planwire::Result<()> {
                #write_impl
            }

            #[allow(unused_variables)]
            fn read_fields(
                input: &mut ::planwire::Input<'_>,
            ) -> ::planwire::Result<Self> {
                #read_impl
            }
        }
    };

    let placeholder = options.placeholder.then(|| {
        quote! {
            fn placeholder() -> ::std::option::Option<Self> {
                ::std::option::Option::Some(
                    ::std::default::Default::default()
                )
            }
        }
    });

    Ok(quote! {
        #[allow(clippy::trait_duplication_in_bounds)]
        impl #impl_generics
            ::planwire::Payload for #name #ty_generics #where_clause
        {
            #body
            #placeholder
        }
    })
}

fn implements_writable() -> proc_macro2::TokenStream {
    quote! {
        const CATEGORIES: &'static [::planwire::Category] =
            &[::planwire::Category::Writable];

        fn category_form(
            &self,
            category: ::planwire::Category,
        ) -> ::planwire::Result<::planwire::CategoryForm<'_>> {
            match category {
                ::planwire::Category::Writable => {
                    ::planwire::CategoryForm::native(self)
                }
                category => Err(::planwire::Error::CategoryMismatch {
                    type_name: ::std::any::type_name::<Self>(),
                    category,
                }),
            }
        }

        fn from_category_value(
            value: ::planwire::CategoryValue,
        ) -> ::planwire::Result<Self> {
            value.into_native()
        }
    }
}

fn write_field(access: &proc_macro2::TokenStream) -> proc_macro2::TokenStream {
    quote! {
        ::planwire::Output::write(output, #access)?;
    }
}

fn read_field(field: &Field) -> syn::Result<proc_macro2::TokenStream> {
    let field_type = &field.ty;

    Ok(if should_skip(field)? {
        quote! { <#field_type as ::std::default::Default>::default() }
    } else {
        quote! { ::planwire::Input::read::<#field_type>(input)? }
    })
}

fn impl_write_struct(
    data_struct: &DataStruct,
) -> syn::Result<proc_macro2::TokenStream> {
    let mut field_writes = Vec::new();

    for (i, field) in data_struct.fields.iter().enumerate() {
        if should_skip(field)? {
            continue;
        }

        let access = match &field.ident {
            Some(ident) => quote! { &self.#ident },
            None => {
                let index = Index::from(i);
                quote! { &self.#index }
            }
        };
        field_writes.push(write_field(&access));
    }

    Ok(quote! {
        #(#field_writes)*
        Ok(())
    })
}

fn impl_read_struct(
    data_struct: &DataStruct,
) -> syn::Result<proc_macro2::TokenStream> {
    let constructor = construct(quote! { Self }, &data_struct.fields)?;

    Ok(quote! { Ok(#constructor) })
}

/// Builds `path { .. }`, `path(..)` or `path` from decoded fields.
fn construct(
    path: proc_macro2::TokenStream,
    fields: &Fields,
) -> syn::Result<proc_macro2::TokenStream> {
    Ok(match fields {
        Fields::Named(fields) => {
            let field_reads = fields
                .named
                .iter()
                .map(|field| {
                    let field_name = &field.ident;
                    let read = read_field(field)?;
                    Ok(quote! { #field_name: #read, })
                })
                .collect::<syn::Result<Vec<_>>>()?;

            quote! { #path { #(#field_reads)* } }
        }
        Fields::Unnamed(fields) => {
            let field_reads = fields
                .unnamed
                .iter()
                .map(|field| {
                    let read = read_field(field)?;
                    Ok(quote! { #read, })
                })
                .collect::<syn::Result<Vec<_>>>()?;

            quote! { #path(#(#field_reads)*) }
        }
        Fields::Unit => path,
    })
}

fn impl_write_enum(
    data_enum: &DataEnum,
) -> syn::Result<proc_macro2::TokenStream> {
    let mut variant_matches = Vec::new();

    for (idx, variant) in data_enum.variants.iter().enumerate() {
        let variant_name = &variant.ident;
        let mut bindings = Vec::new();
        let mut field_writes = Vec::new();

        for (i, field) in variant.fields.iter().enumerate() {
            let skip = should_skip(field)?;
            let binding = syn::Ident::new(
                &format!("field_{i}"),
                proc_macro2::Span::call_site(),
            );

            bindings.push(match (&field.ident, skip) {
                (Some(ident), true) => quote! { #ident: _ },
                (Some(ident), false) => quote! { #ident: #binding },
                (None, true) => quote! { _ },
                (None, false) => quote! { #binding },
            });

            if !skip {
                field_writes.push(write_field(&quote! { #binding }));
            }
        }

        let pattern = match &variant.fields {
            Fields::Named(_) => {
                quote! { Self::#variant_name { #(#bindings),* } }
            }
            Fields::Unnamed(_) => {
                quote! { Self::#variant_name(#(#bindings),*) }
            }
            Fields::Unit => quote! { Self::#variant_name },
        };

        variant_matches.push(quote! {
            #pattern => {
                ::planwire::serialize::Encoder::emit_usize(
                    ::planwire::Output::encoder(output),
                    #idx,
                )?;
                #(#field_writes)*
            }
        });
    }

    Ok(quote! {
        match self {
            #(#variant_matches)*
        }
        Ok(())
    })
}

fn impl_read_enum(
    data_enum: &DataEnum,
) -> syn::Result<proc_macro2::TokenStream> {
    let variant_count = data_enum.variants.len();
    let mut variant_matches = Vec::new();

    for (idx, variant) in data_enum.variants.iter().enumerate() {
        let variant_name = &variant.ident;
        let constructor =
            construct(quote! { Self::#variant_name }, &variant.fields)?;

        variant_matches.push(quote! {
            #idx => Ok(#constructor),
        });
    }

    Ok(quote! {
        let variant_idx = ::planwire::serialize::Decoder::read_usize(
            ::planwire::Input::decoder(input),
        )?;
        match variant_idx {
            #(#variant_matches)*
            _ => Err(::planwire::Error::InvalidVariant {
                type_name: ::std::any::type_name::<Self>(),
                index: variant_idx,
                count: #variant_count,
            }),
        }
    })
}
