use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::parse::ParseStream;
use syn::{bracketed, Attribute, Ident, LitBool, LitInt, LitStr, Token};

pub(crate) const VERB_ATTRS: [&str; 6] = ["get", "post", "put", "delete", "patch", "route"];

const SUPPORTED_METHODS: [&str; 8] = [
    "GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS", "TRACE",
];

/// Endpoint attributes only mean something inside a `#[routes]` block, which
/// removes them before the compiler sees them. Reaching this is a mistake.
pub fn http_method_attribute(name: &str, _attr: TokenStream, item: TokenStream) -> TokenStream {
    let message = format!(
        "`#[{}]` can only be used on methods inside a `#[routes]` impl block",
        name
    );
    let error = match syn::parse::<syn::ImplItemFn>(item.clone()) {
        Ok(method) => syn::Error::new_spanned(&method.sig.ident, message),
        Err(_) => syn::Error::new(Span::call_site(), message),
    };
    let error = error.into_compile_error();
    let item = TokenStream2::from(item);
    quote!(#error #item).into()
}

/// Arguments of `#[get("/path", ..)]` and friends.
pub(crate) struct RouteArgs {
    pub methods: Vec<String>,
    pub path: LitStr,
    status: Option<u16>,
    summary: Option<LitStr>,
    description: Option<LitStr>,
    response_description: Option<LitStr>,
    tags: Vec<LitStr>,
    deprecated: Option<LitBool>,
    include_in_schema: Option<LitBool>,
    name: Option<LitStr>,
    operation_id: Option<LitStr>,
}

impl RouteArgs {
    /// Parse an endpoint attribute. `verb` is the attribute name: one of the
    /// HTTP verbs, or `route` which takes an explicit `methods = [..]` list.
    pub fn from_attr(verb: &str, attr: &Attribute) -> syn::Result<Self> {
        attr.parse_args_with(|input: ParseStream| Self::parse_with(verb, attr, input))
    }

    fn parse_with(verb: &str, attr: &Attribute, input: ParseStream) -> syn::Result<Self> {
        let mut path = None;
        let mut methods = Vec::new();
        let mut args = RouteArgs {
            methods: Vec::new(),
            path: LitStr::new("", Span::call_site()),
            status: None,
            summary: None,
            description: None,
            response_description: None,
            tags: Vec::new(),
            deprecated: None,
            include_in_schema: None,
            name: None,
            operation_id: None,
        };

        if input.peek(LitStr) {
            path = Some(input.parse::<LitStr>()?);
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            match key.to_string().as_str() {
                "path" => {
                    input.parse::<Token![=]>()?;
                    path = Some(input.parse()?);
                }
                "methods" if verb == "route" => {
                    input.parse::<Token![=]>()?;
                    for method in parse_str_list(input)? {
                        let upper = method.value().to_uppercase();
                        if !SUPPORTED_METHODS.contains(&upper.as_str()) {
                            return Err(syn::Error::new_spanned(
                                &method,
                                format!("unsupported HTTP method `{}`", method.value()),
                            ));
                        }
                        methods.push(upper);
                    }
                }
                "status" | "status_code" => {
                    input.parse::<Token![=]>()?;
                    let lit: LitInt = input.parse()?;
                    let code: u16 = lit.base10_parse()?;
                    if !(100..=999).contains(&code) {
                        return Err(syn::Error::new_spanned(
                            &lit,
                            "status code must be between 100 and 999",
                        ));
                    }
                    args.status = Some(code);
                }
                "summary" => {
                    input.parse::<Token![=]>()?;
                    args.summary = Some(input.parse()?);
                }
                "description" => {
                    input.parse::<Token![=]>()?;
                    args.description = Some(input.parse()?);
                }
                "response_description" => {
                    input.parse::<Token![=]>()?;
                    args.response_description = Some(input.parse()?);
                }
                "tags" => {
                    input.parse::<Token![=]>()?;
                    args.tags = parse_str_list(input)?;
                }
                "deprecated" => args.deprecated = Some(parse_flag(input, &key)?),
                "include_in_schema" => {
                    input.parse::<Token![=]>()?;
                    args.include_in_schema = Some(input.parse()?);
                }
                "name" => {
                    input.parse::<Token![=]>()?;
                    args.name = Some(input.parse()?);
                }
                "operation_id" => {
                    input.parse::<Token![=]>()?;
                    args.operation_id = Some(input.parse()?);
                }
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("unknown endpoint option `{}`", other),
                    ))
                }
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        args.path = path.ok_or_else(|| {
            syn::Error::new_spanned(attr, format!("`#[{}]` requires a path", verb))
        })?;

        if verb == "route" {
            if methods.is_empty() {
                return Err(syn::Error::new_spanned(
                    attr,
                    "`#[route]` requires `methods = [\"GET\", ..]`",
                ));
            }
            args.methods = methods;
        } else {
            args.methods = vec![verb.to_uppercase()];
        }
        Ok(args)
    }

    /// Expression building the `EndpointDescriptor`; `fn_name` is the default
    /// endpoint name.
    pub fn descriptor_tokens(&self, fn_name: &Ident) -> TokenStream2 {
        let path = &self.path;
        let methods = self.methods.iter().map(|method| {
            let ident = format_ident!("{}", method);
            quote!(::routekit::axum::http::Method::#ident)
        });
        let name = match &self.name {
            Some(name) => quote!(#name),
            None => {
                let default = fn_name.to_string();
                quote!(#default)
            }
        };

        let status = self.status.map(|code| quote!(.status_code(#code)));
        let summary = self.summary.as_ref().map(|v| quote!(.summary(#v)));
        let description = self.description.as_ref().map(|v| quote!(.description(#v)));
        let response_description = self
            .response_description
            .as_ref()
            .map(|v| quote!(.response_description(#v)));
        let tags = &self.tags;
        let tags = (!tags.is_empty()).then(|| quote!(.tags([#(#tags),*])));
        let deprecated = self.deprecated.as_ref().map(|v| quote!(.deprecated(#v)));
        let include_in_schema = self
            .include_in_schema
            .as_ref()
            .map(|v| quote!(.include_in_schema(#v)));
        let operation_id = self.operation_id.as_ref().map(|v| quote!(.operation_id(#v)));

        quote! {
            ::routekit::routing::EndpointDescriptor::new(#path, [#(#methods),*])
                .name(#name)
                #status
                #summary
                #description
                #response_description
                #tags
                #deprecated
                #include_in_schema
                #operation_id
        }
    }
}

/// Parse `["a", "b"]`.
pub(crate) fn parse_str_list(input: ParseStream) -> syn::Result<Vec<LitStr>> {
    let content;
    bracketed!(content in input);
    let items = content.parse_terminated(|p: ParseStream| p.parse::<LitStr>(), Token![,])?;
    Ok(items.into_iter().collect())
}

/// Parse either a bare flag (`deprecated`) or `deprecated = <bool>`.
pub(crate) fn parse_flag(input: ParseStream, key: &Ident) -> syn::Result<LitBool> {
    if input.peek(Token![=]) {
        input.parse::<Token![=]>()?;
        input.parse()
    } else {
        Ok(LitBool::new(true, key.span()))
    }
}
