use crate::di::{Container, Injectable};
use crate::error::{Result, RoutekitError};
use std::sync::Arc;

/// Builder for constructing a dependency injection container
///
/// Registration errors do not interrupt the chain; the first one is returned
/// from [`ContainerBuilder::build`].
///
/// # Example
/// ```rust,ignore
/// let container = ContainerBuilder::new()
///     .provide::<EnglishGreeter>()
///     .transient::<WelcomeService>()
///     .instance(ConfigService::from_env())
///     .build()?;
/// ```
pub struct ContainerBuilder {
    container: Container,
    error: Option<RoutekitError>,
}

impl ContainerBuilder {
    /// Create a new container builder
    pub fn new() -> Self {
        Self {
            container: Container::new(),
            error: None,
        }
    }

    fn record(mut self, f: impl FnOnce(&mut Container) -> Result<()>) -> Self {
        if self.error.is_none() {
            if let Err(e) = f(&mut self.container) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Register a type through its own [`Injectable::register`], honouring
    /// any alias declared with `#[injectable(alias = ...)]`.
    pub fn provide<T: Injectable>(self) -> Self {
        self.record(T::register)
    }

    /// Register a transient service
    pub fn transient<T: Injectable>(self) -> Self {
        self.record(|c| c.add_transient::<T>().map(|_| ()))
    }

    /// Register a transient service and bind an alias to it
    pub fn transient_as<A, T, F>(self, cast: F) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
        T: Injectable,
        F: Fn(Arc<T>) -> Arc<A> + Send + Sync + 'static,
    {
        self.record(|c| c.add_transient_as::<A, T, F>(cast).map(|_| ()))
    }

    /// Register a constructor closure
    pub fn factory<T, F>(self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        self.record(|c| c.add_factory::<T, F>(factory).map(|_| ()))
    }

    /// Register a value that is cloned on every resolution
    pub fn instance<T: Clone + Send + Sync + 'static>(self, value: T) -> Self {
        self.record(|c| c.add_instance(value).map(|_| ()))
    }

    /// Build the container
    pub fn build(self) -> Result<Container> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.container),
        }
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
