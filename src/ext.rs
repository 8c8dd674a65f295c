use std::sync::Arc;

use crate::activator::Activator;
use crate::capability::Signal;
use crate::catalog::{EventCatalog, MetricsCatalog};
use crate::consumer::Consumer;
use crate::container::Container;
use crate::error::RejectionError;
use crate::listener::Feed;
use crate::registrar::{Registrar, Registration};

/// Composition-time shorthands available on every [`Container`].
pub trait ServicesExt: Container {
    fn add_event_consumer(&self, consumer: Arc<dyn Consumer>) -> Result<Registration, RejectionError> {
        Registrar::<EventCatalog, Self>::new(self).register_instance(consumer)
    }

    fn add_event_consumer_type<T: Consumer + Default>(&self) -> Result<Registration, RejectionError> {
        Registrar::<EventCatalog, Self>::new(self).register_type::<T>()
    }

    fn add_metrics_consumer(&self, consumer: Arc<dyn Consumer>) -> Result<Registration, RejectionError> {
        Registrar::<MetricsCatalog, Self>::new(self).register_instance(consumer)
    }

    fn add_metrics_consumer_type<T: Consumer + Default>(&self) -> Result<Registration, RejectionError> {
        Registrar::<MetricsCatalog, Self>::new(self).register_type::<T>()
    }

    fn activate_all_listeners(&self) -> usize {
        Activator::activate_all_listeners(self)
    }

    /// Publishes to the feed of `S`. Returns 0 when no listener has been activated
    /// for `S` or none is subscribed yet.
    fn publish<S: Signal>(&self, payload: S::Payload) -> usize {
        self.resolve_singleton::<Feed<S::Payload>>()
            .map_or(0, |feed| feed.publish(payload))
    }
}

impl<C: Container> ServicesExt for C {}
