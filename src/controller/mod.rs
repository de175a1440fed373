// Controllers are normally declared through macros:
// - #[controller(prefix = "...", tags = [...])] on the struct
// - #[routes] on its impl block, with #[get], #[post], #[put], #[delete],
//   #[patch] or #[route] on the endpoint methods
//
// The macros generate:
// 1. Injectable implementation so the controller is built from the container
// 2. ControllerMeta (name, group options) and Controller<S> (endpoints)

mod registry;

pub use registry::Controllers;

use crate::di::Injectable;
use crate::error::Result;
use crate::routing::{Endpoint, GroupOptions, RoutingGroup};

/// Static description of a controller, generated by `#[controller]`.
pub trait ControllerMeta {
    /// The controller's type name, used for the default tag and in errors.
    const NAME: &'static str;

    fn group_options() -> GroupOptions;
}

/// A controller whose endpoints can be served with router state `S`.
///
/// Generated by `#[routes]`. Every endpoint receives a controller instance
/// resolved from the container for the current request.
pub trait Controller<S>: ControllerMeta + Injectable
where
    S: Clone + Send + Sync + 'static,
{
    fn endpoints() -> Vec<Endpoint<S>>;

    /// Build this controller's routing group from its options and endpoints.
    fn routing_group() -> Result<RoutingGroup<S>> {
        let mut group = RoutingGroup::new(Self::NAME, Self::group_options())?;
        for endpoint in Self::endpoints() {
            group.add_endpoint(endpoint)?;
        }
        Ok(group)
    }
}
