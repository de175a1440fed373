use crate::error::{Result, RoutekitError};
use axum::http::Method;

/// Route options passed through to the registered endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOptions {
    /// Status used when the handler answers with `200 OK`.
    pub status_code: Option<u16>,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub response_description: String,
    pub deprecated: bool,
    pub include_in_schema: bool,
    pub name: Option<String>,
    pub operation_id: Option<String>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            status_code: None,
            tags: Vec::new(),
            summary: None,
            description: None,
            response_description: "Successful Response".to_string(),
            deprecated: false,
            include_in_schema: true,
            name: None,
            operation_id: None,
        }
    }
}

/// Path, verb(s) and options attached to a controller method.
///
/// The `#[get]`/`#[post]`/... attributes expand to one of these; it can also
/// be built by hand:
///
/// ```
/// use routekit::routing::EndpointDescriptor;
/// use routekit::axum::http::Method;
///
/// let descriptor = EndpointDescriptor::new("/items/{id}", [Method::GET])
///     .summary("Fetch one item")
///     .tags(["items"]);
/// assert_eq!(descriptor.path(), "/items/{id}");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDescriptor {
    path: String,
    methods: Vec<Method>,
    options: RouteOptions,
}

impl EndpointDescriptor {
    pub fn new(path: impl Into<String>, methods: impl IntoIterator<Item = Method>) -> Self {
        Self {
            path: path.into(),
            methods: methods.into_iter().collect(),
            options: RouteOptions::default(),
        }
    }

    pub fn status_code(mut self, code: u16) -> Self {
        self.options.status_code = Some(code);
        self
    }

    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.options.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.options.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.options.description = Some(description.into());
        self
    }

    pub fn response_description(mut self, description: impl Into<String>) -> Self {
        self.options.response_description = description.into();
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.options.deprecated = deprecated;
        self
    }

    pub fn include_in_schema(mut self, include: bool) -> Self {
        self.options.include_in_schema = include;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.options.name = Some(name.into());
        self
    }

    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.options.operation_id = Some(operation_id.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    /// Human-readable label used in logs and errors.
    pub(crate) fn label(&self) -> String {
        let methods = self
            .methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join("|");
        match &self.options.name {
            Some(name) => format!("{} {} ({})", methods, self.path, name),
            None => format!("{} {}", methods, self.path),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.path.is_empty() && !self.path.starts_with('/') {
            return Err(RoutekitError::InvalidPath {
                path: self.path.clone(),
                reason: "a path must start with '/'",
            });
        }
        Ok(())
    }

    /// The paths this endpoint is served under, relative to its group, each
    /// paired with whether it may appear in the schema.
    ///
    /// `/items` and `/items/` both register `/items` (visible) and `/items/`
    /// (hidden). The root path `/` registers only `/`, hidden. A trailing
    /// catch-all segment already matches the slash form and is registered once.
    pub(crate) fn registered_paths(&self) -> Vec<(String, bool)> {
        let path_no_slash = self.path.strip_suffix('/').unwrap_or(&self.path);
        if self.path == "/" {
            return vec![("/".to_string(), false)];
        }

        let last_segment = path_no_slash.rsplit('/').next().unwrap_or_default();
        if last_segment.starts_with("{*") {
            return vec![(path_no_slash.to_string(), true)];
        }

        vec![
            (path_no_slash.to_string(), true),
            (format!("{}/", path_no_slash), false),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(path: &str) -> EndpointDescriptor {
        EndpointDescriptor::new(path, [Method::GET])
    }

    #[test]
    fn test_clean_path_gets_hidden_slash_duplicate() {
        assert_eq!(
            get("/greet").registered_paths(),
            vec![("/greet".to_string(), true), ("/greet/".to_string(), false)]
        );
    }

    #[test]
    fn test_declared_slash_is_normalised() {
        assert_eq!(get("/greet/").registered_paths(), get("/greet").registered_paths());
    }

    #[test]
    fn test_root_path_registers_slash_only() {
        assert_eq!(get("/").registered_paths(), vec![("/".to_string(), false)]);
    }

    #[test]
    fn test_empty_path_serves_group_root() {
        assert_eq!(
            get("").registered_paths(),
            vec![(String::new(), true), ("/".to_string(), false)]
        );
    }

    #[test]
    fn test_catch_all_is_registered_once() {
        assert_eq!(
            get("/files/{*rest}").registered_paths(),
            vec![("/files/{*rest}".to_string(), true)]
        );
    }

    #[test]
    fn test_validate_rejects_relative_path() {
        assert!(get("greet").validate().is_err());
        assert!(get("").validate().is_ok());
    }

    #[test]
    fn test_options_builder() {
        let descriptor = EndpointDescriptor::new("/items", [Method::POST])
            .status_code(201)
            .tags(["items", "write"])
            .deprecated(true)
            .include_in_schema(false)
            .name("create_item");
        let options = descriptor.options();
        assert_eq!(options.status_code, Some(201));
        assert_eq!(options.tags, vec!["items", "write"]);
        assert!(options.deprecated);
        assert!(!options.include_in_schema);
        assert_eq!(descriptor.label(), "POST /items (create_item)");
    }
}
