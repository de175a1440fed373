use crate::di::{Container, HasContainer, Injectable};
use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodFilter, MethodRouter};
use std::any::TypeId;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tower::ServiceExt;

/// A per-request check shared by every route of a group.
///
/// Dependencies are built from the container on each request, like
/// controllers, and run in order before the handler. Returning `Err` rejects
/// the request with that response and the handler is never called.
///
/// ```rust,ignore
/// #[derive(Injectable)]
/// pub struct RequireApiKey {
///     config: Arc<ConfigService>,
/// }
///
/// impl Dependency for RequireApiKey {
///     async fn check(&self, parts: &mut Parts) -> std::result::Result<(), Response> {
///         let expected = self.config.get("API_KEY");
///         match parts.headers.get("x-api-key") {
///             Some(key) if expected.as_deref() == key.to_str().ok() => Ok(()),
///             _ => Err(StatusCode::UNAUTHORIZED.into_response()),
///         }
///     }
/// }
///
/// #[controller(prefix = "/admin", dependencies = [RequireApiKey])]
/// pub struct AdminController;
/// ```
pub trait Dependency: Injectable {
    fn check(
        &self,
        parts: &mut Parts,
    ) -> impl Future<Output = std::result::Result<(), Response>> + Send;
}

type CheckFuture<'a> = Pin<Box<dyn Future<Output = std::result::Result<(), Response>> + Send + 'a>>;

type CheckFn = Arc<dyn for<'a> Fn(&'a mut Parts, &'a Container) -> CheckFuture<'a> + Send + Sync>;

fn run_check<'a, D: Dependency>(parts: &'a mut Parts, container: &'a Container) -> CheckFuture<'a> {
    Box::pin(async move {
        let dependency = container.instantiate::<D>().map_err(|e| {
            tracing::error!("Failed to build dependency {}: {}", std::any::type_name::<D>(), e);
            e.into_response()
        })?;
        dependency.check(parts).await
    })
}

/// A type-erased [`Dependency`], as stored in group and include options.
#[derive(Clone)]
pub struct GroupDependency {
    type_id: TypeId,
    name: &'static str,
    check: CheckFn,
}

impl GroupDependency {
    pub fn of<D: Dependency>() -> Self {
        Self {
            type_id: TypeId::of::<D>(),
            name: std::any::type_name::<D>(),
            check: Arc::new(run_check::<D>),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for GroupDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GroupDependency").field(&self.name).finish()
    }
}

impl PartialEq for GroupDependency {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

/// Wrap `inner` so that `dependencies` run before it on every request.
pub(crate) fn guarded<S>(
    inner: MethodRouter<S>,
    filter: MethodFilter,
    dependencies: Arc<[GroupDependency]>,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + HasContainer + 'static,
{
    axum::routing::on(
        filter,
        move |State(state): State<S>, request: Request| async move {
            let (mut parts, body) = request.into_parts();
            let container = state.get_container();
            for dependency in dependencies.iter() {
                if let Err(rejection) = (dependency.check)(&mut parts, container).await {
                    tracing::debug!("Request to {} rejected by {}", parts.uri, dependency.name);
                    return rejection;
                }
            }

            let request = Request::from_parts(parts, body);
            match inner.with_state::<()>(state).oneshot(request).await {
                Ok(response) => response,
                Err(never) => match never {},
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::AppState;
    use axum::body::Body;
    use axum::Router;
    use axum::http::{Extensions, StatusCode};

    struct RequireToken;

    impl Injectable for RequireToken {
        fn inject(_container: &Container) -> crate::Result<Self> {
            Ok(RequireToken)
        }
    }

    impl Dependency for RequireToken {
        async fn check(&self, parts: &mut Parts) -> std::result::Result<(), Response> {
            if parts.headers.contains_key("x-token") {
                parts.extensions.insert("checked");
                Ok(())
            } else {
                Err(StatusCode::UNAUTHORIZED.into_response())
            }
        }
    }

    struct Unbuildable;

    impl Injectable for Unbuildable {
        fn inject(container: &Container) -> crate::Result<Self> {
            container.resolve::<String>()?;
            Ok(Unbuildable)
        }
    }

    impl Dependency for Unbuildable {
        async fn check(&self, _parts: &mut Parts) -> std::result::Result<(), Response> {
            Ok(())
        }
    }

    fn router(dependency: GroupDependency) -> Router {
        let inner = axum::routing::get(|extensions: Extensions| async move {
            match extensions.get::<&'static str>() {
                Some(mark) => mark.to_string(),
                None => "unchecked".to_string(),
            }
        });
        Router::new()
            .route("/x", guarded(inner, MethodFilter::GET, Arc::from(vec![dependency])))
            .with_state(AppState::new(Container::new()))
    }

    async fn send(router: &Router, request: Request) -> (StatusCode, String) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_rejection_skips_handler() {
        let router = router(GroupDependency::of::<RequireToken>());
        let request = Request::builder().uri("/x").body(Body::empty()).unwrap();
        assert_eq!(send(&router, request).await.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_handler_sees_parts_after_check() {
        let router = router(GroupDependency::of::<RequireToken>());
        let request = Request::builder()
            .uri("/x")
            .header("x-token", "1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&router, request).await, (StatusCode::OK, "checked".to_string()));
    }

    #[tokio::test]
    async fn test_unresolvable_dependency_is_server_error() {
        let router = router(GroupDependency::of::<Unbuildable>());
        let request = Request::builder().uri("/x").body(Body::empty()).unwrap();
        assert_eq!(send(&router, request).await.0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_equality_by_type() {
        assert_eq!(GroupDependency::of::<RequireToken>(), GroupDependency::of::<RequireToken>());
        assert_ne!(GroupDependency::of::<RequireToken>(), GroupDependency::of::<Unbuildable>());
        assert!(GroupDependency::of::<RequireToken>().name().ends_with("RequireToken"));
    }
}
