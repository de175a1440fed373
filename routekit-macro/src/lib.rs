use proc_macro::TokenStream;

mod controller;
mod http_methods;
mod injectable;

/// Derive macro for making a struct injectable into the DI container
///
/// Every field must be an `Arc<T>` (resolved from the container) or carry
/// `#[injectable(default)]`. `#[injectable(alias = dyn Trait)]` on the struct
/// also binds the type as the implementation of `dyn Trait`.
///
/// # Example
/// ```ignore
/// use routekit::prelude::*;
///
/// #[derive(Injectable)]
/// #[injectable(alias = dyn Greeter)]
/// pub struct EnglishGreeter {
///     config: Arc<ConfigService>,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(injectable))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}

/// Attribute macro turning a struct into a controller
///
/// Options: `prefix = "/path"`, `tags = ["a", "b"]`, `deprecated` and
/// `include_in_schema = false`. Fields are injected the same way as with
/// `#[derive(Injectable)]`.
///
/// # Example
/// ```ignore
/// use routekit::prelude::*;
///
/// #[controller(prefix = "/users", tags = ["users"])]
/// pub struct UserController {
///     user_service: Arc<UserService>,
/// }
/// ```
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::controller_attribute(attr, item)
}

/// Attribute macro collecting the endpoints of a controller's impl block
///
/// Methods marked with `#[get]`, `#[post]`, `#[put]`, `#[patch]`, `#[delete]`
/// or `#[route]` become endpoints. They must take `&self`; their other
/// parameters are axum extractors, or values marked `#[param]`, `#[query]` or
/// `#[body]`.
///
/// # Example
/// ```ignore
/// #[routes]
/// impl UserController {
///     #[get("/{id}", summary = "Fetch a user")]
///     async fn get_user(&self, #[param] id: u64) -> Json<User> {
///         // ...
///     }
///
///     #[post("", status = 201)]
///     async fn create_user(&self, #[body] user: NewUser) -> Json<User> {
///         // ...
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn routes(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::routes_attribute(attr, item)
}

/// GET endpoint, see [`routes`]
#[proc_macro_attribute]
pub fn get(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("get", attr, item)
}

/// POST endpoint, see [`routes`]
#[proc_macro_attribute]
pub fn post(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("post", attr, item)
}

/// PUT endpoint, see [`routes`]
#[proc_macro_attribute]
pub fn put(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("put", attr, item)
}

/// DELETE endpoint, see [`routes`]
#[proc_macro_attribute]
pub fn delete(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("delete", attr, item)
}

/// PATCH endpoint, see [`routes`]
#[proc_macro_attribute]
pub fn patch(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("patch", attr, item)
}

/// Endpoint answering several methods
///
/// ```ignore
/// #[route("/items", methods = ["GET", "HEAD"])]
/// ```
#[proc_macro_attribute]
pub fn route(attr: TokenStream, item: TokenStream) -> TokenStream {
    http_methods::http_method_attribute("route", attr, item)
}

/// Parameter marker: deserialize from the JSON request body
#[proc_macro_attribute]
pub fn body(_attr: TokenStream, item: TokenStream) -> TokenStream {
    item
}

/// Parameter marker: extract from path parameters
#[proc_macro_attribute]
pub fn param(_attr: TokenStream, item: TokenStream) -> TokenStream {
    item
}

/// Parameter marker: extract from the query string
#[proc_macro_attribute]
pub fn query(_attr: TokenStream, item: TokenStream) -> TokenStream {
    item
}
