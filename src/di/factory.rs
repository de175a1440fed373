use crate::di::Container;
use crate::error::Result;
use std::marker::PhantomData;
use std::sync::Arc;

/// A zero-argument accessor for a registered service.
///
/// Holds on to the container and resolves `T` every time [`Factory::get`] is
/// called, so each call yields a freshly constructed instance. Obtained from
/// [`Container::factory`].
pub struct Factory<T: ?Sized> {
    container: Arc<Container>,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Factory<T> {
    pub(crate) fn new(container: Arc<Container>) -> Self {
        Self {
            container,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> Result<Arc<T>> {
        self.container.resolve::<T>()
    }
}

impl<T: ?Sized> Clone for Factory<T> {
    fn clone(&self) -> Self {
        Self {
            container: Arc::clone(&self.container),
            _marker: PhantomData,
        }
    }
}
