use crate::di::HasContainer;
use crate::error::{Result, RoutekitError};
use crate::routing::dependency::{Dependency, GroupDependency, guarded};
use crate::routing::EndpointDescriptor;
use axum::handler::Handler;
use axum::http::{Method, StatusCode};
use axum::response::Response;
use axum::routing::{MethodFilter, MethodRouter};
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use tower::util::MapResponseLayer;

/// Group-level configuration shared by every endpoint of a controller.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupOptions {
    pub prefix: String,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub include_in_schema: bool,
    pub dependencies: Vec<GroupDependency>,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            tags: Vec::new(),
            deprecated: false,
            include_in_schema: true,
            dependencies: Vec::new(),
        }
    }
}

impl GroupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    pub fn include_in_schema(mut self, include: bool) -> Self {
        self.include_in_schema = include;
        self
    }

    /// Run `D` before every route.
    pub fn dependency<D: Dependency>(mut self) -> Self {
        self.dependencies.push(GroupDependency::of::<D>());
        self
    }
}

/// Overrides applied when a routing group is attached to a router.
///
/// The prefix is prepended to every route. Tags and dependencies are
/// prepended to the group's own, `deprecated` is OR-ed and
/// `include_in_schema` AND-ed with the group and endpoint settings.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeOptions {
    pub prefix: String,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub include_in_schema: bool,
    pub dependencies: Vec<GroupDependency>,
}

impl Default for IncludeOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            tags: Vec::new(),
            deprecated: false,
            include_in_schema: true,
            dependencies: Vec::new(),
        }
    }
}

impl IncludeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    pub fn include_in_schema(mut self, include: bool) -> Self {
        self.include_in_schema = include;
        self
    }

    /// Run `D` before every route.
    pub fn dependency<D: Dependency>(mut self) -> Self {
        self.dependencies.push(GroupDependency::of::<D>());
        self
    }
}

pub(crate) fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Ok(());
    }
    if !prefix.starts_with('/') {
        return Err(RoutekitError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason: "a prefix must start with '/'",
        });
    }
    if prefix.ends_with('/') {
        return Err(RoutekitError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason: "a prefix must not end with '/'",
        });
    }
    Ok(())
}

/// Default tag for a controller: its name without a trailing `Controller`.
pub fn controller_tag(name: &str) -> String {
    name.strip_suffix("Controller").unwrap_or(name).to_string()
}

fn method_filter(methods: &[Method]) -> Result<MethodFilter> {
    let mut filter: Option<MethodFilter> = None;
    for method in methods {
        let next = MethodFilter::try_from(method.clone()).map_err(|_| {
            RoutekitError::UnsupportedMethod {
                method: method.to_string(),
            }
        })?;
        filter = Some(match filter {
            Some(current) => current.or(next),
            None => next,
        });
    }
    filter.ok_or_else(|| RoutekitError::UnsupportedMethod {
        method: "<none>".to_string(),
    })
}

fn dependency_names(dependencies: &[GroupDependency]) -> Vec<String> {
    dependencies.iter().map(|d| d.name().to_string()).collect()
}

/// Documentation record of one registered route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteInfo {
    pub controller: String,
    pub path: String,
    pub methods: Vec<String>,
    pub name: Option<String>,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub response_description: String,
    pub status_code: Option<u16>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub dependencies: Vec<String>,
}

/// A controller method paired with its descriptor, ready to be registered.
pub struct Endpoint<S> {
    descriptor: EndpointDescriptor,
    make_route: Box<dyn FnOnce(MethodFilter) -> MethodRouter<S> + Send>,
}

impl<S> Endpoint<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new<H, T>(descriptor: EndpointDescriptor, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self {
            descriptor,
            make_route: Box::new(move |filter| axum::routing::on(filter, handler)),
        }
    }

    pub fn descriptor(&self) -> &EndpointDescriptor {
        &self.descriptor
    }
}

/// One path registration inside a routing group.
#[derive(Clone)]
pub struct GroupRoute<S> {
    info: RouteInfo,
    include_in_schema: bool,
    filter: MethodFilter,
    handler: MethodRouter<S>,
}

impl<S> GroupRoute<S> {
    pub fn info(&self) -> &RouteInfo {
        &self.info
    }

    pub fn path(&self) -> &str {
        &self.info.path
    }

    pub fn include_in_schema(&self) -> bool {
        self.include_in_schema
    }
}

/// The routes of one controller plus its group-level configuration.
///
/// Every endpoint is registered under its clean path and under a hidden
/// trailing-slash duplicate that shares the same handler (see
/// [`EndpointDescriptor`] for the exact rules). Groups are cheap to clone so
/// the same controller can be attached to several routers.
#[derive(Clone)]
pub struct RoutingGroup<S> {
    controller: &'static str,
    options: GroupOptions,
    routes: Vec<GroupRoute<S>>,
}

impl<S> RoutingGroup<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Create an empty group. When `options` carries no tags, the
    /// controller's default tag is used.
    pub fn new(controller: &'static str, mut options: GroupOptions) -> Result<Self> {
        validate_prefix(&options.prefix)?;
        if options.tags.is_empty() {
            options.tags.push(controller_tag(controller));
        }
        Ok(Self {
            controller,
            options,
            routes: Vec::new(),
        })
    }

    pub fn add_endpoint(&mut self, endpoint: Endpoint<S>) -> Result<&mut Self> {
        let Endpoint {
            descriptor,
            make_route,
        } = endpoint;
        descriptor.validate()?;

        let filter = method_filter(descriptor.methods())?;
        let mut handler = make_route(filter);

        let options = descriptor.options();
        if let Some(code) = options.status_code {
            let status =
                StatusCode::from_u16(code).map_err(|_| RoutekitError::InvalidStatusCode {
                    code,
                    endpoint: descriptor.label(),
                })?;
            handler = handler.layer(MapResponseLayer::new(move |mut response: Response| {
                if response.status() == StatusCode::OK {
                    *response.status_mut() = status;
                }
                response
            }));
        }

        let info = RouteInfo {
            controller: self.controller.to_string(),
            path: String::new(),
            methods: descriptor
                .methods()
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
            name: options.name.clone(),
            operation_id: options.operation_id.clone(),
            summary: options.summary.clone(),
            description: options.description.clone(),
            response_description: options.response_description.clone(),
            status_code: options.status_code,
            tags: self
                .options
                .tags
                .iter()
                .chain(options.tags.iter())
                .cloned()
                .collect(),
            deprecated: self.options.deprecated || options.deprecated,
            dependencies: dependency_names(&self.options.dependencies),
        };
        let include_in_schema = self.options.include_in_schema && options.include_in_schema;

        for (path, visible) in descriptor.registered_paths() {
            let path = format!("{}{}", self.options.prefix, path);
            tracing::debug!(
                "Registered {} {} for {}",
                info.methods.join("|"),
                path,
                self.controller
            );
            self.routes.push(GroupRoute {
                info: RouteInfo {
                    path,
                    ..info.clone()
                },
                include_in_schema: include_in_schema && visible,
                filter,
                handler: handler.clone(),
            });
        }
        Ok(self)
    }

    /// Attach every route of this group to `router`.
    ///
    /// Dependencies from `overrides` and from the group wrap each route,
    /// hidden slash duplicates included.
    pub fn attach(&self, mut router: Router<S>, overrides: &IncludeOptions) -> Result<Router<S>>
    where
        S: HasContainer,
    {
        validate_prefix(&overrides.prefix)?;
        let empty_path = self.routes.iter().any(|route| route.info.path.is_empty());
        if overrides.prefix.is_empty() && empty_path {
            return Err(RoutekitError::EmptyRoute {
                controller: self.controller,
            });
        }

        let dependencies: Arc<[GroupDependency]> = overrides
            .dependencies
            .iter()
            .chain(self.options.dependencies.iter())
            .cloned()
            .collect();

        for route in &self.routes {
            let path = format!("{}{}", overrides.prefix, route.info.path);
            let handler = if dependencies.is_empty() {
                route.handler.clone()
            } else {
                guarded(route.handler.clone(), route.filter, Arc::clone(&dependencies))
            };
            router = router.route(&path, handler);
        }
        Ok(router)
    }

    /// Schema-visible routes as they appear once attached with `overrides`.
    pub fn route_table(&self, overrides: &IncludeOptions) -> Vec<RouteInfo> {
        if !overrides.include_in_schema {
            return Vec::new();
        }
        self.routes
            .iter()
            .filter(|route| route.include_in_schema)
            .map(|route| RouteInfo {
                path: format!("{}{}", overrides.prefix, route.info.path),
                tags: overrides
                    .tags
                    .iter()
                    .chain(route.info.tags.iter())
                    .cloned()
                    .collect(),
                deprecated: overrides.deprecated || route.info.deprecated,
                dependencies: dependency_names(&overrides.dependencies)
                    .into_iter()
                    .chain(route.info.dependencies.iter().cloned())
                    .collect(),
                ..route.info.clone()
            })
            .collect()
    }
}

impl<S> RoutingGroup<S> {
    pub fn controller(&self) -> &'static str {
        self.controller
    }

    pub fn options(&self) -> &GroupOptions {
        &self.options
    }

    pub fn routes(&self) -> &[GroupRoute<S>] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::{AppState, Container, Injectable};
    use axum::body::Body;
    use axum::http::Request;
    use axum::http::request::Parts;
    use axum::response::IntoResponse;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState::new(Container::new())
    }

    fn endpoint(descriptor: EndpointDescriptor, body: &'static str) -> Endpoint<AppState> {
        Endpoint::new(descriptor, move || async move { body })
    }

    fn get(path: &str) -> EndpointDescriptor {
        EndpointDescriptor::new(path, [Method::GET])
    }

    async fn status_of(router: &Router, method: Method, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router.clone().oneshot(request).await.unwrap().status()
    }

    #[test]
    fn test_controller_tag() {
        assert_eq!(controller_tag("HomeController"), "Home");
        assert_eq!(controller_tag("Greetings"), "Greetings");
        assert_eq!(controller_tag("Controller"), "");
    }

    #[test]
    fn test_default_tag_only_when_none_given() {
        let group = RoutingGroup::<AppState>::new("HomeController", GroupOptions::new()).unwrap();
        assert_eq!(group.options().tags, vec!["Home"]);

        let options = GroupOptions::new().tag("greetings");
        let group = RoutingGroup::<AppState>::new("HomeController", options).unwrap();
        assert_eq!(group.options().tags, vec!["greetings"]);
    }

    #[test]
    fn test_prefix_validation() {
        assert!(RoutingGroup::<AppState>::new("A", GroupOptions::new().prefix("home")).is_err());
        assert!(RoutingGroup::<AppState>::new("A", GroupOptions::new().prefix("/home/")).is_err());
        assert!(RoutingGroup::<AppState>::new("A", GroupOptions::new().prefix("/home")).is_ok());
    }

    #[test]
    fn test_invalid_status_code() {
        let mut group = RoutingGroup::new("A", GroupOptions::new()).unwrap();
        let err = group
            .add_endpoint(endpoint(get("/x").status_code(42), "x"))
            .err()
            .unwrap();
        assert!(matches!(err, RoutekitError::InvalidStatusCode { code: 42, .. }));
    }

    #[test]
    fn test_route_metadata_is_merged() {
        let mut group =
            RoutingGroup::new("A", GroupOptions::new().prefix("/a").tag("group")).unwrap();
        group
            .add_endpoint(endpoint(get("/x").tags(["route"]).deprecated(true), "x"))
            .unwrap();

        let table = group.route_table(&IncludeOptions::new().prefix("/v1").tag("api"));
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].path, "/v1/a/x");
        assert_eq!(table[0].tags, vec!["api", "group", "route"]);
        assert!(table[0].deprecated);
        assert_eq!(group.routes().len(), 2);
        assert!(!group.routes()[1].include_in_schema());
    }

    #[test]
    fn test_route_info_serializes_to_json() {
        let mut group = RoutingGroup::new("HomeController", GroupOptions::new().prefix("/home"))
            .unwrap();
        group
            .add_endpoint(endpoint(get("/greet").name("greet").status_code(202), "x"))
            .unwrap();

        let json = serde_json::to_value(group.route_table(&IncludeOptions::new())).unwrap();
        assert_eq!(json[0]["path"], "/home/greet");
        assert_eq!(json[0]["methods"], serde_json::json!(["GET"]));
        assert_eq!(json[0]["name"], "greet");
        assert_eq!(json[0]["status_code"], 202);
        assert_eq!(json[0]["tags"], serde_json::json!(["Home"]));
        assert_eq!(json[0]["response_description"], "Successful Response");
        assert!(json[0]["summary"].is_null());
    }

    #[test]
    fn test_empty_route_is_rejected() {
        let mut group = RoutingGroup::new("A", GroupOptions::new()).unwrap();
        group.add_endpoint(endpoint(get(""), "root")).unwrap();
        let err = group
            .attach(Router::new(), &IncludeOptions::new())
            .err()
            .unwrap();
        assert!(matches!(err, RoutekitError::EmptyRoute { .. }));
        assert!(
            group
                .attach(Router::new(), &IncludeOptions::new().prefix("/api"))
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_both_slash_variants_are_served() {
        let mut group = RoutingGroup::new("A", GroupOptions::new().prefix("/home")).unwrap();
        group.add_endpoint(endpoint(get("/greet"), "hello")).unwrap();
        group.add_endpoint(endpoint(get("/"), "index")).unwrap();
        let router = group
            .attach(Router::new(), &IncludeOptions::new())
            .unwrap()
            .with_state(state());

        assert_eq!(status_of(&router, Method::GET, "/home/greet").await, StatusCode::OK);
        assert_eq!(status_of(&router, Method::GET, "/home/greet/").await, StatusCode::OK);
        assert_eq!(status_of(&router, Method::GET, "/home/").await, StatusCode::OK);
        assert_eq!(status_of(&router, Method::GET, "/home").await, StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(&router, Method::POST, "/home/greet").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn test_multiple_methods_and_status_default() {
        let mut group = RoutingGroup::new("A", GroupOptions::new()).unwrap();
        group
            .add_endpoint(endpoint(
                EndpointDescriptor::new("/items", [Method::POST, Method::PUT]).status_code(201),
                "created",
            ))
            .unwrap();
        let router = group
            .attach(Router::new(), &IncludeOptions::new())
            .unwrap()
            .with_state(state());

        assert_eq!(status_of(&router, Method::POST, "/items").await, StatusCode::CREATED);
        assert_eq!(status_of(&router, Method::PUT, "/items/").await, StatusCode::CREATED);
        assert_eq!(
            status_of(&router, Method::GET, "/items").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    struct DenyAll;

    impl Injectable for DenyAll {
        fn inject(_container: &Container) -> Result<Self> {
            Ok(DenyAll)
        }
    }

    impl Dependency for DenyAll {
        async fn check(&self, _parts: &mut Parts) -> std::result::Result<(), Response> {
            Err(StatusCode::FORBIDDEN.into_response())
        }
    }

    struct AllowAll;

    impl Injectable for AllowAll {
        fn inject(_container: &Container) -> Result<Self> {
            Ok(AllowAll)
        }
    }

    impl Dependency for AllowAll {
        async fn check(&self, _parts: &mut Parts) -> std::result::Result<(), Response> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_group_dependency_guards_both_slash_variants() {
        let options = GroupOptions::new().prefix("/x").dependency::<DenyAll>();
        let mut group = RoutingGroup::new("A", options).unwrap();
        group.add_endpoint(endpoint(get(""), "x")).unwrap();
        group.add_endpoint(endpoint(get("/y"), "y")).unwrap();
        let router = group
            .attach(Router::new(), &IncludeOptions::new())
            .unwrap()
            .with_state(state());

        for uri in ["/x", "/x/", "/x/y", "/x/y/"] {
            assert_eq!(status_of(&router, Method::GET, uri).await, StatusCode::FORBIDDEN);
        }
        assert_eq!(
            status_of(&router, Method::POST, "/x").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn test_include_dependency_applies_on_attach_only() {
        let mut group = RoutingGroup::new("A", GroupOptions::new().prefix("/a")).unwrap();
        group
            .add_endpoint(endpoint(get("/x").status_code(202), "x"))
            .unwrap();

        let open = group
            .attach(Router::new(), &IncludeOptions::new().dependency::<AllowAll>())
            .unwrap()
            .with_state(state());
        assert_eq!(status_of(&open, Method::GET, "/a/x/").await, StatusCode::ACCEPTED);

        let closed = group
            .attach(Router::new(), &IncludeOptions::new().dependency::<DenyAll>())
            .unwrap()
            .with_state(state());
        assert_eq!(status_of(&closed, Method::GET, "/a/x").await, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_dependencies_listed_include_first() {
        let options = GroupOptions::new().dependency::<DenyAll>();
        let mut group = RoutingGroup::<AppState>::new("A", options).unwrap();
        group.add_endpoint(endpoint(get("/x"), "x")).unwrap();

        let table = group.route_table(&IncludeOptions::new().dependency::<AllowAll>());
        let names: Vec<_> = table[0]
            .dependencies
            .iter()
            .map(|name| name.rsplit("::").next().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["AllowAll", "DenyAll"]);
    }
}
