use crate::di::Container;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode as HttpStatusCode, request::Parts},
};
use std::sync::Arc;

/// Axum extractor for dependency injection
///
/// Resolves `T` from the state's container on every request, so each handler
/// invocation receives a freshly constructed instance. Works for concrete
/// types and for aliases such as `dyn Trait`.
///
/// # Example
/// ```rust,ignore
/// use routekit::Inject;
///
/// async fn greet(Inject(greeter): Inject<dyn Greeter>) -> String {
///     greeter.greet()
/// }
/// ```
pub struct Inject<T: ?Sized>(pub Arc<T>);

/// Trait that the router state must implement to provide the DI container
pub trait HasContainer {
    fn get_container(&self) -> &Container;
}

impl<S, T> FromRequestParts<S> for Inject<T>
where
    S: Send + Sync + HasContainer,
    T: ?Sized + Send + Sync + 'static,
{
    type Rejection = (HttpStatusCode, String);

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let container = state.get_container();

        container.resolve::<T>().map(Inject).map_err(|e| {
            tracing::error!("Dependency injection failed: {}", e);
            (
                HttpStatusCode::INTERNAL_SERVER_ERROR,
                format!("Dependency injection failed: {}", e),
            )
        })
    }
}

/// Deref implementation for convenient access to the inner service
impl<T: ?Sized> std::ops::Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: ?Sized> Clone for Inject<T> {
    fn clone(&self) -> Self {
        Inject(Arc::clone(&self.0))
    }
}

/// Ready-made router state holding a shared container.
#[derive(Clone)]
pub struct AppState {
    container: Arc<Container>,
}

impl AppState {
    pub fn new(container: Container) -> Self {
        Self {
            container: Arc::new(container),
        }
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }
}

impl From<Arc<Container>> for AppState {
    fn from(container: Arc<Container>) -> Self {
        Self { container }
    }
}

impl HasContainer for AppState {
    fn get_container(&self) -> &Container {
        &self.container
    }
}
