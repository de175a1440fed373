use crate::greeters::{Greeter, NestedGreeter, SpanishGreeter};
use routekit::prelude::*;
use serde::Serialize;

#[controller(prefix = "/home")]
pub struct HomeController {
    greeter: Arc<dyn Greeter>,
    spanish: Arc<SpanishGreeter>,
    nested: Arc<NestedGreeter>,
}

#[routes]
impl HomeController {
    #[get("/greet")]
    async fn get_greet(&self) -> String {
        self.greeter.greet()
    }

    #[get("/spanish_greet")]
    async fn get_spanish_greet(&self) -> String {
        self.spanish.greet()
    }

    #[get("/nested_greet", summary = "Spanish greeting through a nested service")]
    async fn get_nested_greet(&self) -> String {
        self.nested.greet()
    }
}

#[derive(Serialize)]
struct Status {
    service: String,
    mode: String,
}

/// Requires `x-status-key` to match `STATUS_KEY` when that key is configured.
#[derive(Injectable)]
pub struct StatusKey {
    config: Arc<ConfigService>,
}

impl Dependency for StatusKey {
    async fn check(&self, parts: &mut Parts) -> std::result::Result<(), Response> {
        let Some(expected) = self.config.get("STATUS_KEY") else {
            return Ok(());
        };
        match parts.headers.get("x-status-key") {
            Some(key) if key.to_str().ok() == Some(expected.as_str()) => Ok(()),
            _ => Err(StatusCode::UNAUTHORIZED.into_response()),
        }
    }
}

#[controller(prefix = "/status", tags = ["ops"], dependencies = [StatusKey])]
pub struct StatusController {
    config: Arc<ConfigService>,
}

#[routes]
impl StatusController {
    #[get("")]
    async fn status(&self) -> Json<Status> {
        Json(Status {
            service: self.config.get_or("SERVICE_NAME", "greeter-server"),
            mode: self.config.get_or("MODE", "development"),
        })
    }
}
