use crate::di::Container;
use crate::error::Result;

/// Trait for types that can be constructed from the DI container
///
/// This trait is typically implemented automatically via `#[derive(Injectable)]`
/// (or `#[controller]` for controllers).
///
/// # Example
/// ```rust,ignore
/// use routekit::prelude::*;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// // Registered under `dyn Greeter` as well as under its own type.
/// #[derive(Injectable)]
/// #[injectable(alias = dyn Greeter)]
/// pub struct EnglishGreeter;
///
/// #[derive(Injectable)]
/// pub struct WelcomeService {
///     // This field is resolved from the container on every construction
///     greeter: Arc<dyn Greeter>,
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Create an instance by resolving dependencies from the container
    ///
    /// # Errors
    /// Returns an error if any required dependency is not found in the container.
    fn inject(container: &Container) -> Result<Self>;

    /// Register this type in the container as a transient service.
    ///
    /// The derive macro overrides this when an alias is declared.
    fn register(container: &mut Container) -> Result<()> {
        container.add_transient::<Self>()?;
        Ok(())
    }
}
