//! The container contract the registry is written against, plus an in-memory implementation.

pub mod channel;
pub mod collection;
pub mod singleton;

use std::sync::Arc;

use crate::consumer::ConsumerId;
use crate::host::BackgroundService;

pub use channel::Channel;
pub use collection::ServiceCollection;

/// How a channel entry produces its view.
pub enum Provider<C, S: ?Sized> {
    /// A live instance, handed out as is.
    Instance(Arc<S>),
    /// Built on first resolution from the container, then cached by the channel.
    Deferred(Box<dyn Fn(&C) -> Option<Arc<S>> + Send + Sync>),
}

impl<C, S: ?Sized> Provider<C, S> {
    pub fn deferred<F>(factory: F) -> Self
    where
        F: Fn(&C) -> Option<Arc<S>> + Send + Sync + 'static,
    {
        Provider::Deferred(Box::new(factory))
    }
}

/// Operations the registry and the listeners need from a dependency container.
///
/// Every `add_*` method is "add if absent" and reports whether it added anything.
pub trait Container: Send + Sync + Sized + 'static {
    /// Registers `T` as a lazily constructed singleton. `factory` runs at most once.
    fn add_singleton_if_absent<T, F>(&self, factory: F) -> bool
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static;

    /// Resolves the singleton of `T`, constructing it on first use.
    fn resolve_singleton<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static;

    /// Adds `provider` to the channel of `S` unless `id` is already present there.
    fn add_enumerable_singleton_if_absent<S>(&self, id: ConsumerId, provider: Provider<Self, S>) -> bool
    where
        S: ?Sized + Send + Sync + 'static;

    /// Resolves every view in the channel of `S`, in registration order.
    fn resolve_enumerable<S>(&self) -> Vec<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static;

    /// Schedules `B` with the host unless a service of that type is already scheduled.
    fn add_background_service_if_absent<B, F>(&self, factory: F) -> bool
    where
        B: BackgroundService<Self>,
        F: FnOnce() -> B;
}
