use crate::di::{Factory, Injectable};
use crate::error::{Result, RoutekitError};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::sync::Arc;

type Instance = Arc<dyn Any + Send + Sync>;

/// Builds a fresh instance of a concrete service.
type ConstructorFn = Arc<dyn Fn(&Container) -> Result<Instance> + Send + Sync>;

/// Turns a concrete instance into a boxed `Arc<Key>`, where the key is either
/// the concrete type itself or an alias such as `dyn Trait`.
type CasterFn = Arc<dyn Fn(Instance) -> Option<Box<dyn Any + Send>> + Send + Sync>;

#[derive(Clone)]
struct Provider {
    type_name: &'static str,
    construct: ConstructorFn,
}

#[derive(Clone)]
struct Binding {
    concrete: TypeId,
    concrete_name: &'static str,
    alias: bool,
    cast: CasterFn,
}

thread_local! {
    static RESOLVING: RefCell<Vec<(TypeId, &'static str)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a concrete type as under construction on the current thread.
struct ResolutionGuard;

impl ResolutionGuard {
    fn enter(type_id: TypeId, type_name: &'static str) -> Result<Self> {
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(start) = stack.iter().position(|(id, _)| *id == type_id) {
                let cycle = stack[start..]
                    .iter()
                    .map(|(_, name)| *name)
                    .chain(std::iter::once(type_name))
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(RoutekitError::CircularDependency { cycle });
            }
            stack.push((type_id, type_name));
            Ok(ResolutionGuard)
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLVING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Thread-safe dependency injection container.
///
/// Every registration is transient: each resolution runs the registered
/// constructor again and hands out a new instance. Lookups go through two
/// levels, `key -> concrete type -> constructor`, where the key is either the
/// concrete type or an alias bound to it (usually `dyn Trait`). Resolving an
/// alias and resolving its concrete type therefore run the same constructor.
pub struct Container {
    providers: DashMap<TypeId, Provider>,
    bindings: DashMap<TypeId, Binding>,
}

impl Clone for Container {
    fn clone(&self) -> Self {
        Self {
            providers: self.providers.clone(),
            bindings: self.bindings.clone(),
        }
    }
}

impl Container {
    pub fn new() -> Self {
        Self {
            providers: DashMap::new(),
            bindings: DashMap::new(),
        }
    }

    /// Register `T` so that every resolution calls [`Injectable::inject`].
    pub fn add_transient<T: Injectable>(&mut self) -> Result<&mut Self> {
        self.add_factory::<T, _>(T::inject)
    }

    /// Register `T` and bind the alias `A` to it.
    ///
    /// ```rust,ignore
    /// container.add_transient_as::<dyn Greeter, EnglishGreeter, _>(|g| g as Arc<dyn Greeter>)?;
    /// ```
    pub fn add_transient_as<A, T, F>(&mut self, cast: F) -> Result<&mut Self>
    where
        A: ?Sized + Send + Sync + 'static,
        T: Injectable,
        F: Fn(Arc<T>) -> Arc<A> + Send + Sync + 'static,
    {
        self.add_transient::<T>()?;
        self.bind_alias::<A, T, F>(cast)
    }

    /// Register an arbitrary constructor for `T`.
    pub fn add_factory<T, F>(&mut self, factory: F) -> Result<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        if let Some(existing) = self.bindings.get(&type_id) {
            if existing.alias {
                return Err(RoutekitError::AliasConflict {
                    alias: type_name.to_string(),
                    existing: existing.concrete_name.to_string(),
                });
            }
        }

        let construct: ConstructorFn = Arc::new(move |container: &Container| {
            factory(container).map(|v| Arc::new(v) as Instance)
        });
        let previous = self.providers.insert(
            type_id,
            Provider {
                type_name,
                construct,
            },
        );
        if previous.is_some() {
            tracing::warn!("Replacing registration for {}", type_name);
        } else {
            tracing::debug!("Registered transient service {}", type_name);
        }

        let cast: CasterFn = Arc::new(|instance: Instance| {
            instance
                .downcast::<T>()
                .ok()
                .map(|concrete| Box::new(concrete) as Box<dyn Any + Send>)
        });
        self.bindings.insert(
            type_id,
            Binding {
                concrete: type_id,
                concrete_name: type_name,
                alias: false,
                cast,
            },
        );
        Ok(self)
    }

    /// Register a value that is cloned on every resolution.
    pub fn add_instance<T>(&mut self, value: T) -> Result<&mut Self>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.add_factory::<T, _>(move |_| Ok(value.clone()))
    }

    /// Bind the alias `A` to the constructor registered for `T`.
    ///
    /// `T` does not have to be registered yet; a missing implementation is
    /// reported when the alias is resolved. Rebinding an alias to a different
    /// implementation, or using a registered concrete type as an alias, is a
    /// conflict.
    pub fn bind_alias<A, T, F>(&mut self, cast: F) -> Result<&mut Self>
    where
        A: ?Sized + Send + Sync + 'static,
        T: Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<A> + Send + Sync + 'static,
    {
        let alias_id = TypeId::of::<A>();
        let impl_id = TypeId::of::<T>();
        if alias_id == impl_id {
            return Ok(self);
        }

        if let Some(existing) = self.bindings.get(&alias_id) {
            if !existing.alias || existing.concrete != impl_id {
                return Err(RoutekitError::AliasConflict {
                    alias: std::any::type_name::<A>().to_string(),
                    existing: existing.concrete_name.to_string(),
                });
            }
        }

        let cast: CasterFn = Arc::new(move |instance: Instance| {
            let concrete = instance.downcast::<T>().ok()?;
            Some(Box::new(cast(concrete)) as Box<dyn Any + Send>)
        });
        self.bindings.insert(
            alias_id,
            Binding {
                concrete: impl_id,
                concrete_name: std::any::type_name::<T>(),
                alias: true,
                cast,
            },
        );
        tracing::debug!(
            "Bound alias {} to {}",
            std::any::type_name::<A>(),
            std::any::type_name::<T>()
        );
        Ok(self)
    }

    /// Construct a fresh `T`, looked up by concrete type or by alias.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let type_name = std::any::type_name::<T>();
        let binding = self
            .bindings
            .get(&TypeId::of::<T>())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RoutekitError::DependencyNotFound {
                type_name: type_name.to_string(),
            })?;

        let provider = self
            .providers
            .get(&binding.concrete)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RoutekitError::DependencyNotFound {
                type_name: format!(
                    "Implementation '{}' for '{}' not registered",
                    binding.concrete_name, type_name
                ),
            })?;

        tracing::trace!("Resolving {} via {}", type_name, provider.type_name);
        let instance = {
            let _guard = ResolutionGuard::enter(binding.concrete, provider.type_name)?;
            (provider.construct)(self)?
        };

        let downcast_failed = || RoutekitError::DowncastFailed {
            type_name: type_name.to_string(),
        };
        let boxed = (binding.cast)(instance).ok_or_else(downcast_failed)?;
        boxed
            .downcast::<Arc<T>>()
            .map(|arc| *arc)
            .map_err(|_| downcast_failed())
    }

    /// A zero-argument accessor that resolves `T` each time it is called.
    pub fn factory<T: ?Sized + Send + Sync + 'static>(self: &Arc<Self>) -> Factory<T> {
        Factory::new(Arc::clone(self))
    }

    /// Build a `T` right away from this container's services.
    ///
    /// Unlike [`Container::resolve`], `T` itself does not need to be registered.
    pub fn instantiate<T: Injectable>(&self) -> Result<T> {
        let _guard = ResolutionGuard::enter(TypeId::of::<T>(), std::any::type_name::<T>())?;
        T::inject(self)
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    static ENGLISH_BUILT: AtomicUsize = AtomicUsize::new(0);

    struct English;

    impl Injectable for English {
        fn inject(_container: &Container) -> Result<Self> {
            ENGLISH_BUILT.fetch_add(1, Ordering::SeqCst);
            Ok(English)
        }
    }

    impl Greeter for English {
        fn greet(&self) -> String {
            "Hello, world!".to_string()
        }
    }

    struct Spanish;

    impl Injectable for Spanish {
        fn inject(_container: &Container) -> Result<Self> {
            Ok(Spanish)
        }
    }

    impl Greeter for Spanish {
        fn greet(&self) -> String {
            "Hola, mundo!".to_string()
        }
    }

    struct Nested {
        inner: Arc<Spanish>,
    }

    impl Injectable for Nested {
        fn inject(container: &Container) -> Result<Self> {
            Ok(Self {
                inner: container.resolve::<Spanish>()?,
            })
        }
    }

    struct Ping;
    struct Pong;

    impl Injectable for Ping {
        fn inject(container: &Container) -> Result<Self> {
            container.resolve::<Pong>()?;
            Ok(Ping)
        }
    }

    impl Injectable for Pong {
        fn inject(container: &Container) -> Result<Self> {
            container.resolve::<Ping>()?;
            Ok(Pong)
        }
    }

    #[test]
    fn test_transient_resolution_builds_every_time() {
        let mut container = Container::new();
        container.add_transient::<Spanish>().unwrap();
        let first = container.resolve::<Spanish>().unwrap();
        let second = container.resolve::<Spanish>().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_alias_and_concrete_share_constructor() {
        let mut container = Container::new();
        container
            .add_transient_as::<dyn Greeter, English, _>(|g| g as Arc<dyn Greeter>)
            .unwrap();

        let before = ENGLISH_BUILT.load(Ordering::SeqCst);
        let by_alias = container.resolve::<dyn Greeter>().unwrap();
        let by_type = container.resolve::<English>().unwrap();
        assert_eq!(ENGLISH_BUILT.load(Ordering::SeqCst) - before, 2);
        assert_eq!(by_alias.greet(), by_type.greet());
    }

    #[test]
    fn test_nested_dependency_is_fresh() {
        let mut container = Container::new();
        container.add_transient::<Spanish>().unwrap();
        container.add_transient::<Nested>().unwrap();
        let a = container.resolve::<Nested>().unwrap();
        let b = container.resolve::<Nested>().unwrap();
        assert!(!Arc::ptr_eq(&a.inner, &b.inner));
        assert_eq!(a.inner.greet(), "Hola, mundo!");
    }

    #[test]
    fn test_missing_dependency() {
        let container = Container::new();
        let err = container.resolve::<dyn Greeter>().err().unwrap();
        assert!(matches!(err, RoutekitError::DependencyNotFound { .. }));
    }

    #[test]
    fn test_alias_without_implementation() {
        let mut container = Container::new();
        container
            .bind_alias::<dyn Greeter, English, _>(|g| g as Arc<dyn Greeter>)
            .unwrap();
        assert!(container.contains::<dyn Greeter>());
        let err = container.resolve::<dyn Greeter>().err().unwrap();
        assert!(err.to_string().contains("not registered"));
    }

    #[test]
    fn test_alias_conflict() {
        let mut container = Container::new();
        container
            .add_transient_as::<dyn Greeter, English, _>(|g| g as Arc<dyn Greeter>)
            .unwrap();
        let err = container
            .add_transient_as::<dyn Greeter, Spanish, _>(|g| g as Arc<dyn Greeter>)
            .err()
            .unwrap();
        assert!(matches!(err, RoutekitError::AliasConflict { .. }));

        // Rebinding to the same implementation is fine.
        container
            .bind_alias::<dyn Greeter, English, _>(|g| g as Arc<dyn Greeter>)
            .unwrap();
    }

    #[test]
    fn test_circular_dependency() {
        let mut container = Container::new();
        container.add_transient::<Ping>().unwrap();
        container.add_transient::<Pong>().unwrap();
        match container.resolve::<Ping>() {
            Err(RoutekitError::CircularDependency { cycle }) => {
                assert!(cycle.contains("Ping"));
                assert!(cycle.contains("Pong"));
            }
            other => panic!("expected a cycle, got {:?}", other.map(|_| ())),
        }

        // The guard stack is unwound after a failure.
        container.add_transient::<Spanish>().unwrap();
        assert!(container.resolve::<Spanish>().is_ok());
    }

    #[test]
    fn test_instance_is_cloned() {
        let mut container = Container::new();
        container.add_instance(String::from("value")).unwrap();
        let a = container.resolve::<String>().unwrap();
        let b = container.resolve::<String>().unwrap();
        assert_eq!(*a, "value");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_factory_accessor() {
        let mut container = Container::new();
        container.add_transient::<Spanish>().unwrap();
        let container = Arc::new(container);
        let factory = container.factory::<Spanish>();
        assert_eq!(factory.get().unwrap().greet(), "Hola, mundo!");
    }

    #[test]
    fn test_instantiate_unregistered() {
        let mut container = Container::new();
        container.add_transient::<Spanish>().unwrap();
        assert!(!container.contains::<Nested>());
        let nested = container.instantiate::<Nested>().unwrap();
        assert_eq!(nested.inner.greet(), "Hola, mundo!");
        assert_eq!(container.len(), 1);
    }
}
