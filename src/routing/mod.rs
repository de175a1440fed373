//! Endpoint descriptors and routing groups.
//!
//! A controller's `#[routes]` block produces one [`Endpoint`] per tagged
//! method. [`RoutingGroup`] registers them on top of axum's router, adding a
//! hidden trailing-slash duplicate for every path. A group may also carry
//! [`Dependency`] checks that run before each of its routes.

mod dependency;
mod descriptor;
mod group;

pub use dependency::{Dependency, GroupDependency};
pub use descriptor::{EndpointDescriptor, RouteOptions};
pub use group::{
    Endpoint, GroupOptions, GroupRoute, IncludeOptions, RouteInfo, RoutingGroup, controller_tag,
};
