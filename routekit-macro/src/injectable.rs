use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Type};

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    generate_injectable_impl(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn generate_injectable_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                struct_name,
                "#[derive(Injectable)] can only be applied to structs",
            ))
        }
    };
    let construct = construct_fields(fields)?;

    // An alias makes the type resolvable as `Arc<dyn Trait>` too.
    let register = parse_alias(&input.attrs)?.map(|alias| {
        quote! {
            fn register(container: &mut ::routekit::Container) -> ::routekit::Result<()> {
                container.add_transient_as::<#alias, Self, _>(|instance| {
                    instance as ::std::sync::Arc<#alias>
                })?;
                Ok(())
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::routekit::Injectable for #struct_name #ty_generics #where_clause {
            fn inject(
                container: &::routekit::Container
            ) -> ::routekit::Result<Self> {
                Ok(#construct)
            }

            #register
        }
    })
}

/// Expression building `Self` with every field resolved from `container`.
pub(crate) fn construct_fields(fields: &Fields) -> syn::Result<TokenStream2> {
    match fields {
        Fields::Unit => Ok(quote!(Self)),
        Fields::Named(named) => {
            let injections = named
                .named
                .iter()
                .map(|field| {
                    let field_name = &field.ident;
                    let value = field_value(&field.attrs, &field.ty)?;
                    Ok(quote!(#field_name: #value))
                })
                .collect::<syn::Result<Vec<_>>>()?;
            Ok(quote!(Self { #(#injections),* }))
        }
        Fields::Unnamed(unnamed) => {
            let injections = unnamed
                .unnamed
                .iter()
                .map(|field| field_value(&field.attrs, &field.ty))
                .collect::<syn::Result<Vec<_>>>()?;
            Ok(quote!(Self(#(#injections),*)))
        }
    }
}

fn field_value(attrs: &[Attribute], ty: &Type) -> syn::Result<TokenStream2> {
    if is_default_field(attrs)? {
        return Ok(quote!(::core::default::Default::default()));
    }
    match extract_injectable_type(ty) {
        Some(inner) => Ok(quote!(container.resolve::<#inner>()?)),
        None => Err(syn::Error::new_spanned(
            ty,
            "injected fields must be `Arc<T>` or `Arc<dyn Trait>`; \
             mark other fields with #[injectable(default)]",
        )),
    }
}

/// Remove `#[injectable(..)]` helper attributes from the fields, for attribute
/// macros that re-emit the struct.
pub(crate) fn strip_field_attrs(fields: &mut Fields) {
    for field in fields.iter_mut() {
        field.attrs.retain(|attr| !attr.path().is_ident("injectable"));
    }
}

fn is_default_field(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut default = false;
    for attr in attrs.iter().filter(|a| a.path().is_ident("injectable")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                default = true;
                Ok(())
            } else {
                Err(meta.error("expected `default`"))
            }
        })?;
    }
    Ok(default)
}

fn parse_alias(attrs: &[Attribute]) -> syn::Result<Option<Type>> {
    let mut alias = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("injectable")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("alias") {
                alias = Some(meta.value()?.parse::<Type>()?);
                Ok(())
            } else {
                Err(meta.error("expected `alias = <type>`"))
            }
        })?;
    }
    Ok(alias)
}

/// Extract the inner type from Arc<T> or Arc<dyn Trait>
fn extract_injectable_type(ty: &Type) -> Option<Type> {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Arc" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(syn::GenericArgument::Type(inner_type)) = args.args.first() {
                        return Some(inner_type.clone());
                    }
                }
            }
        }
    }
    None
}
