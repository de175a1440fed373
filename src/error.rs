use thiserror::Error;

pub type Result<T> = std::result::Result<T, RoutekitError>;

#[derive(Debug, Error)]
pub enum RoutekitError {
    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    #[error("Alias '{alias}' is already bound to '{existing}'")]
    AliasConflict { alias: String, existing: String },

    #[error("Invalid prefix '{prefix}': {reason}")]
    InvalidPrefix { prefix: String, reason: &'static str },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("Unsupported HTTP method: {method}")]
    UnsupportedMethod { method: String },

    #[error("Invalid status code {code} on endpoint '{endpoint}'")]
    InvalidStatusCode { code: u16, endpoint: String },

    #[error("Route of controller '{controller}' resolves to an empty path")]
    EmptyRoute { controller: &'static str },

    #[error("Controller not bound: {controller}")]
    ControllerNotBound { controller: &'static str },

    #[error("Controller already bound: {controller}")]
    ControllerAlreadyBound { controller: &'static str },

    #[error("Invalid configuration value for '{key}': {message}")]
    Config { key: String, message: String },
}

impl axum::response::IntoResponse for RoutekitError {
    fn into_response(self) -> axum::response::Response {
        (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            self.to_string(),
        )
            .into_response()
    }
}
