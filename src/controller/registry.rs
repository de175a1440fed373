use crate::controller::{Controller, ControllerMeta};
use crate::di::{Container, HasContainer};
use crate::error::{Result, RoutekitError};
use crate::routing::{IncludeOptions, RouteInfo, RoutingGroup};
use axum::Router;
use std::any::TypeId;

struct BoundController<S> {
    type_id: TypeId,
    group: RoutingGroup<S>,
}

/// Ordered registry of bound controllers.
///
/// Binding a controller registers it in the container as a transient service
/// and builds its routing group once. The registry can then attach one
/// controller, or all of them in bind order, to any number of routers.
///
/// ```rust,ignore
/// let mut container = Container::new();
/// let mut controllers = Controllers::<AppState>::new();
/// controllers.bind::<HomeController>(&mut container)?;
///
/// let state = AppState::new(container);
/// let api = controllers
///     .attach_all(Router::new(), &IncludeOptions::default())?
///     .with_state(state.clone());
/// let admin = controllers
///     .attach::<HomeController>(Router::new(), &IncludeOptions::new().prefix("/admin"))?
///     .with_state(state);
/// ```
pub struct Controllers<S> {
    entries: Vec<BoundController<S>>,
}

impl<S> Controllers<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build `C`'s routing group and register `C` in the container.
    ///
    /// # Errors
    /// Invalid prefixes, paths, verbs or status codes are reported here,
    /// before any request is served, and leave the container untouched.
    /// Binding the same controller twice is an error as well.
    pub fn bind<C: Controller<S>>(&mut self, container: &mut Container) -> Result<&mut Self> {
        let type_id = TypeId::of::<C>();
        if self.entries.iter().any(|entry| entry.type_id == type_id) {
            return Err(RoutekitError::ControllerAlreadyBound {
                controller: C::NAME,
            });
        }

        let group = C::routing_group()?;
        C::register(container)?;
        tracing::debug!(
            "Bound controller {} with {} routes",
            C::NAME,
            group.routes().len()
        );
        self.entries.push(BoundController { type_id, group });
        Ok(self)
    }

    /// The routing group of a bound controller.
    pub fn group<C: ControllerMeta + 'static>(&self) -> Option<&RoutingGroup<S>> {
        let type_id = TypeId::of::<C>();
        self.entries
            .iter()
            .find(|entry| entry.type_id == type_id)
            .map(|entry| &entry.group)
    }

    /// Attach a single controller's routes to `router`.
    pub fn attach<C: ControllerMeta + 'static>(
        &self,
        router: Router<S>,
        overrides: &IncludeOptions,
    ) -> Result<Router<S>>
    where
        S: HasContainer,
    {
        let group = self
            .group::<C>()
            .ok_or(RoutekitError::ControllerNotBound {
                controller: C::NAME,
            })?;
        let router = group.attach(router, overrides)?;
        tracing::info!("Attached controller {}", C::NAME);
        Ok(router)
    }

    /// Attach every bound controller, in bind order.
    pub fn attach_all(&self, mut router: Router<S>, overrides: &IncludeOptions) -> Result<Router<S>>
    where
        S: HasContainer,
    {
        for entry in &self.entries {
            router = entry.group.attach(router, overrides)?;
        }
        tracing::info!("Attached {} controllers", self.entries.len());
        Ok(router)
    }

    /// Schema-visible routes of every bound controller, in bind order.
    pub fn route_table(&self, overrides: &IncludeOptions) -> Vec<RouteInfo> {
        self.entries
            .iter()
            .flat_map(|entry| entry.group.route_table(overrides))
            .collect()
    }

    /// Names of the bound controllers, in bind order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .map(|entry| entry.group.controller())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S> Default for Controllers<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
