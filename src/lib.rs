//! # Routekit
//!
//! Controller-based routing and constructor dependency injection for axum.
//!
//! Routekit does not route requests or parse bodies itself; axum does. It adds
//! the glue that lets a plain struct act as a controller:
//!
//! - **Dependency Injection**: a container of transient services, resolvable by
//!   concrete type or by alias (`Arc<dyn Trait>`)
//! - **Controller-based Routing**: `#[controller]` structs with `#[get]`,
//!   `#[post]`, ... methods, served under both `/path` and `/path/`
//! - **Per-request Controllers**: every request gets a controller freshly built
//!   from the container
//! - **Composition**: attach one controller or all of them to any number of
//!   routers
//! - **Dependencies**: per-request checks, declared on a controller or at
//!   attach time, that run before every route of the group
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use routekit::prelude::*;
//!
//! // 1. Declare an abstraction and an implementation bound to it
//! pub trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Injectable)]
//! #[injectable(alias = dyn Greeter)]
//! pub struct EnglishGreeter;
//!
//! impl Greeter for EnglishGreeter {
//!     fn greet(&self) -> String {
//!         "Hello, world!".to_string()
//!     }
//! }
//!
//! // 2. Define your controller
//! #[controller(prefix = "/home")]
//! pub struct HomeController {
//!     greeter: Arc<dyn Greeter>,
//! }
//!
//! #[routes]
//! impl HomeController {
//!     #[get("/greet")]
//!     async fn greet(&self) -> String {
//!         self.greeter.greet()
//!     }
//! }
//!
//! // 3. Bind and compose
//! #[tokio::main]
//! async fn main() -> routekit::Result<()> {
//!     let mut container = Container::new();
//!     EnglishGreeter::register(&mut container)?;
//!
//!     let mut controllers = Controllers::new();
//!     controllers.bind::<HomeController>(&mut container)?;
//!
//!     let app = controllers
//!         .attach_all(Router::new(), &IncludeOptions::default())?
//!         .with_state(AppState::new(container));
//!
//!     // Serve your app...
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod di;
pub mod error;
pub mod routing;

// Re-export core types
pub use config::ConfigService;
pub use controller::{Controller, ControllerMeta, Controllers};
pub use di::{AppState, Container, ContainerBuilder, Factory, HasContainer, Inject, Injectable};
pub use error::{Result, RoutekitError};
pub use routing::{
    Dependency, EndpointDescriptor, GroupOptions, IncludeOptions, RouteInfo, RoutingGroup,
};

// Re-export macros
pub use routekit_macro::{
    Injectable as DeriveInjectable, body, controller, delete, get, param, patch, post, put, query,
    route, routes,
};

// Re-export commonly used types from dependencies
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use routekit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::ConfigService;
    pub use crate::controller::{Controller, ControllerMeta, Controllers};
    pub use crate::di::{
        AppState, Container, ContainerBuilder, Factory, HasContainer, Inject, Injectable,
    };
    pub use crate::error::{Result, RoutekitError};
    pub use crate::routing::{
        Dependency, EndpointDescriptor, GroupOptions, IncludeOptions, RouteInfo, RoutingGroup,
    };
    pub use crate::{
        DeriveInjectable as Injectable, body, controller, delete, get, param, patch, post, put,
        query, route, routes,
    };
    pub use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::{StatusCode, request::Parts},
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
