use crate::http_methods::{parse_flag, parse_str_list, RouteArgs, VERB_ATTRS};
use crate::injectable::{construct_fields, strip_field_attrs};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    bracketed, parse::Parse, parse::ParseStream, parse_macro_input, Attribute, FnArg, ImplItem,
    ImplItemFn, ItemImpl, ItemStruct, LitBool, LitStr, Token, Type,
};

struct ControllerArgs {
    prefix: Option<LitStr>,
    tags: Vec<LitStr>,
    deprecated: Option<LitBool>,
    include_in_schema: Option<LitBool>,
    dependencies: Vec<Type>,
}

impl Parse for ControllerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = ControllerArgs {
            prefix: None,
            tags: Vec::new(),
            deprecated: None,
            include_in_schema: None,
            dependencies: Vec::new(),
        };
        while !input.is_empty() {
            let name: syn::Ident = input.parse()?;
            match name.to_string().as_str() {
                "prefix" => {
                    input.parse::<Token![=]>()?;
                    args.prefix = Some(input.parse()?);
                }
                "tags" => {
                    input.parse::<Token![=]>()?;
                    args.tags = parse_str_list(input)?;
                }
                "deprecated" => args.deprecated = Some(parse_flag(input, &name)?),
                "include_in_schema" => {
                    input.parse::<Token![=]>()?;
                    args.include_in_schema = Some(input.parse()?);
                }
                "dependencies" => {
                    input.parse::<Token![=]>()?;
                    let content;
                    bracketed!(content in input);
                    let types = content.parse_terminated(Type::parse, Token![,])?;
                    args.dependencies = types.into_iter().collect();
                }
                other => {
                    return Err(syn::Error::new(
                        name.span(),
                        format!("unknown controller option `{}`", other),
                    ))
                }
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(args)
    }
}

pub fn controller_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ControllerArgs);
    let input = parse_macro_input!(item as ItemStruct);
    generate_controller_impl(&args, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn generate_controller_impl(
    args: &ControllerArgs,
    mut input: ItemStruct,
) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[controller] does not support generic structs",
        ));
    }

    let struct_name = input.ident.clone();
    let name = struct_name.to_string();
    let construct = construct_fields(&input.fields)?;
    strip_field_attrs(&mut input.fields);

    let prefix = args.prefix.as_ref().map(|p| quote!(.prefix(#p)));
    let tags = args.tags.iter().map(|t| quote!(.tag(#t)));
    let deprecated = args.deprecated.as_ref().map(|d| quote!(.deprecated(#d)));
    let include_in_schema = args
        .include_in_schema
        .as_ref()
        .map(|i| quote!(.include_in_schema(#i)));
    let dependencies = args.dependencies.iter().map(|d| quote!(.dependency::<#d>()));

    Ok(quote! {
        #input

        impl ::routekit::Injectable for #struct_name {
            fn inject(container: &::routekit::Container) -> ::routekit::Result<Self> {
                Ok(#construct)
            }
        }

        impl ::routekit::ControllerMeta for #struct_name {
            const NAME: &'static str = #name;

            fn group_options() -> ::routekit::GroupOptions {
                ::routekit::GroupOptions::new()
                    #prefix
                    #(#tags)*
                    #deprecated
                    #include_in_schema
                    #(#dependencies)*
            }
        }
    })
}

#[derive(Clone, Copy, PartialEq)]
enum ParamKind {
    Body,
    Param,
    Query,
    Raw,
}

struct ParamInfo {
    ty: syn::Type,
    kind: ParamKind,
}

struct RouteInfo {
    args: RouteArgs,
    fn_name: syn::Ident,
    is_async: bool,
    params: Vec<ParamInfo>,
}

pub fn routes_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = TokenStream2::from(attr);
    if !attr.is_empty() {
        return syn::Error::new_spanned(attr, "#[routes] takes no arguments")
            .into_compile_error()
            .into();
    }
    let input = parse_macro_input!(item as ItemImpl);
    generate_routes_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn generate_routes_impl(mut input: ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[routes] must be placed on an inherent impl block",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[routes] does not support generic impl blocks",
        ));
    }

    let mut routes: Vec<RouteInfo> = Vec::new();
    for item in input.items.iter_mut() {
        if let ImplItem::Fn(method) = item {
            routes.extend(extract_route_info(method)?);
            method.attrs.retain(|attr| !is_http_method_attr(attr));
            for input in method.sig.inputs.iter_mut() {
                if let FnArg::Typed(pat_type) = input {
                    pat_type.attrs.retain(|attr| !is_param_attr(attr));
                }
            }
        }
    }

    let endpoints = routes.iter().map(|route| {
        let descriptor = route.args.descriptor_tokens(&route.fn_name);
        let fn_name = &route.fn_name;

        let extractor_patterns: Vec<_> = route
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let temp_ident = format_ident!("__p_{}", i);
                let ty = &p.ty;
                match p.kind {
                    ParamKind::Body => quote! {
                        ::routekit::axum::Json(#temp_ident): ::routekit::axum::Json<#ty>
                    },
                    ParamKind::Param => quote! {
                        ::routekit::axum::extract::Path(#temp_ident):
                            ::routekit::axum::extract::Path<#ty>
                    },
                    ParamKind::Query => quote! {
                        ::routekit::axum::extract::Query(#temp_ident):
                            ::routekit::axum::extract::Query<#ty>
                    },
                    ParamKind::Raw => quote! { #temp_ident: #ty },
                }
            })
            .collect();

        let internal_args: Vec<_> = (0..route.params.len())
            .map(|i| format_ident!("__p_{}", i))
            .collect();
        let await_call = route.is_async.then(|| quote!(.await));

        quote! {
            ::routekit::routing::Endpoint::new(
                #descriptor,
                |::routekit::Inject(__controller): ::routekit::Inject<Self>
                 #(, #extractor_patterns)*| async move {
                    use ::routekit::axum::response::IntoResponse;
                    __controller.#fn_name(#(#internal_args),*)#await_call.into_response()
                },
            )
        }
    });

    let self_ty = &input.self_ty;

    Ok(quote! {
        #input

        impl<__S> ::routekit::Controller<__S> for #self_ty
        where
            __S: Clone + Send + Sync + ::routekit::HasContainer + 'static,
        {
            fn endpoints() -> ::std::vec::Vec<::routekit::routing::Endpoint<__S>> {
                vec![#(#endpoints),*]
            }
        }
    })
}

/// One entry per endpoint attribute on `method`; empty for plain methods.
fn extract_route_info(method: &ImplItemFn) -> syn::Result<Vec<RouteInfo>> {
    let mut all_args = Vec::new();
    for attr in &method.attrs {
        if let Some(ident) = attr.path().get_ident() {
            let name = ident.to_string();
            if VERB_ATTRS.contains(&name.as_str()) {
                all_args.push(RouteArgs::from_attr(&name, attr)?);
            }
        }
    }
    if all_args.is_empty() {
        return Ok(Vec::new());
    }

    let sig = &method.sig;
    match sig.receiver() {
        Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(syn::Error::new_spanned(
                &sig.ident,
                "endpoint methods must take `&self` as their first parameter",
            ))
        }
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "endpoint methods cannot be generic",
        ));
    }

    let mut params = Vec::new();
    for input in sig.inputs.iter() {
        if let FnArg::Typed(pat_type) = input {
            let ty = (*pat_type.ty).clone();
            let kind = get_param_kind(&pat_type.attrs)?;
            params.push(ParamInfo { ty, kind });
        }
    }
    if let Some(position) = params.iter().position(|p| p.kind == ParamKind::Body) {
        if position + 1 != params.len() {
            return Err(syn::Error::new_spanned(
                &params[position].ty,
                "a #[body] parameter must be the last parameter",
            ));
        }
    }

    let mut routes = Vec::new();
    let last = all_args.len() - 1;
    for (i, args) in all_args.into_iter().enumerate() {
        let params = if i == last {
            std::mem::take(&mut params)
        } else {
            params
                .iter()
                .map(|p| ParamInfo {
                    ty: p.ty.clone(),
                    kind: p.kind,
                })
                .collect()
        };
        routes.push(RouteInfo {
            args,
            fn_name: sig.ident.clone(),
            is_async: sig.asyncness.is_some(),
            params,
        });
    }
    Ok(routes)
}

fn get_param_kind(attrs: &[Attribute]) -> syn::Result<ParamKind> {
    let mut kind = ParamKind::Raw;
    for attr in attrs.iter().filter(|attr| is_param_attr(attr)) {
        if kind != ParamKind::Raw {
            return Err(syn::Error::new_spanned(
                attr,
                "a parameter takes at most one of #[body], #[param] or #[query]",
            ));
        }
        kind = if attr.path().is_ident("body") {
            ParamKind::Body
        } else if attr.path().is_ident("param") {
            ParamKind::Param
        } else {
            ParamKind::Query
        };
    }
    Ok(kind)
}

fn is_http_method_attr(attr: &Attribute) -> bool {
    attr.path()
        .get_ident()
        .is_some_and(|ident| VERB_ATTRS.contains(&ident.to_string().as_str()))
}

fn is_param_attr(attr: &Attribute) -> bool {
    attr.path().get_ident().is_some_and(|ident| {
        ["body", "param", "query"].contains(&ident.to_string().as_str())
    })
}
