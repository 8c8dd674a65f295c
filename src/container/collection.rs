use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use super::channel::Channel;
use super::singleton::Lazy;
use super::{Container, Provider};
use crate::consumer::ConsumerId;
use crate::host::BackgroundService;

type Erased = Arc<dyn Any + Send + Sync>;

/// In-memory [`Container`] keyed by `TypeId`.
///
/// Shared as `Arc<ServiceCollection>` between composition code, listeners and the host.
#[derive(Default)]
pub struct ServiceCollection {
    singletons: RwLock<HashMap<TypeId, Erased>>,
    channels: RwLock<HashMap<TypeId, Erased>>,
    background: Mutex<IndexMap<TypeId, Arc<dyn BackgroundService<ServiceCollection>>>>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the channel of `S`, without resolving any of them.
    pub fn channel_len<S>(&self) -> usize
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.channel::<S>().map_or(0, |channel| channel.len())
    }

    pub fn channel_contains<S>(&self, id: ConsumerId) -> bool
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.channel::<S>().is_some_and(|channel| channel.contains(&id))
    }

    /// Number of channels created so far.
    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }

    pub fn has_singleton<T: Send + Sync + 'static>(&self) -> bool {
        self.singletons.read().contains_key(&TypeId::of::<T>())
    }

    /// Whether the singleton of `T` has been built yet.
    pub fn is_constructed<T: Send + Sync + 'static>(&self) -> bool {
        self.lazy::<T>().is_some_and(|lazy| lazy.is_constructed())
    }

    pub fn has_background_service<B: 'static>(&self) -> bool {
        self.background.lock().contains_key(&TypeId::of::<B>())
    }

    pub fn background_service_count(&self) -> usize {
        self.background.lock().len()
    }

    /// Scheduled background services in registration order.
    pub fn background_services(&self) -> Vec<(TypeId, Arc<dyn BackgroundService<ServiceCollection>>)> {
        self.background
            .lock()
            .iter()
            .map(|(id, service)| (*id, service.clone()))
            .collect()
    }

    fn lazy<T: Send + Sync + 'static>(&self) -> Option<Arc<Lazy<T>>> {
        let erased = self.singletons.read().get(&TypeId::of::<T>())?.clone();
        erased.downcast::<Lazy<T>>().ok()
    }

    fn channel<S>(&self) -> Option<Arc<Channel<Self, S>>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let erased = self.channels.read().get(&TypeId::of::<S>())?.clone();
        erased.downcast::<Channel<Self, S>>().ok()
    }

    fn channel_or_create<S>(&self) -> Option<Arc<Channel<Self, S>>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        if let Some(channel) = self.channel::<S>() {
            return Some(channel);
        }
        let erased = self
            .channels
            .write()
            .entry(TypeId::of::<S>())
            .or_insert_with(|| {
                debug!(view = std::any::type_name::<S>(), "channel created");
                Arc::new(Channel::<Self, S>::new()) as Erased
            })
            .clone();
        erased.downcast::<Channel<Self, S>>().ok()
    }
}

impl Container for ServiceCollection {
    fn add_singleton_if_absent<T, F>(&self, factory: F) -> bool
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let mut singletons = self.singletons.write();
        if singletons.contains_key(&TypeId::of::<T>()) {
            return false;
        }
        singletons.insert(TypeId::of::<T>(), Arc::new(Lazy::new(factory)));
        true
    }

    fn resolve_singleton<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        // The lock is released before construction so factories may resolve other services.
        self.lazy::<T>().map(|lazy| lazy.get())
    }

    fn add_enumerable_singleton_if_absent<S>(&self, id: ConsumerId, provider: Provider<Self, S>) -> bool
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.channel_or_create::<S>()
            .is_some_and(|channel| channel.insert_if_absent(id, provider))
    }

    fn resolve_enumerable<S>(&self) -> Vec<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.channel::<S>()
            .map(|channel| channel.resolve(self))
            .unwrap_or_default()
    }

    fn add_background_service_if_absent<B, F>(&self, factory: F) -> bool
    where
        B: BackgroundService<Self>,
        F: FnOnce() -> B,
    {
        let mut background = self.background.lock();
        if background.contains_key(&TypeId::of::<B>()) {
            return false;
        }
        let service = factory();
        debug!(service = service.name(), "background service scheduled");
        background.insert(TypeId::of::<B>(), Arc::new(service));
        true
    }
}
