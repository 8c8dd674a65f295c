//! Routes consumers into the channels of the capabilities they implement.
//!
//! Both forms walk the whole catalog before looking at the outcome, so a rejected
//! consumer has touched nothing and diagnostics do not depend on where a scan stopped.
//! A channel insert only ever follows a match, which makes "something was inserted"
//! imply "the registration succeeded".

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::activator::Activator;
use crate::capability::{CapabilityKind, Signal};
use crate::catalog::{CapabilityVisitor, Catalog, EventCatalog, MetricsCatalog};
use crate::consumer::{Consumer, ConsumerId};
use crate::container::{Container, Provider};
use crate::error::RejectionError;

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Matched kinds, in catalog order.
    pub matched: Vec<CapabilityKind>,
    /// How many of `matched` were new; the rest were already present for this consumer.
    pub added: usize,
}

impl Registration {
    pub fn duplicates(&self) -> usize {
        self.matched.len() - self.added
    }
}

pub type EventRegistrar<'a, C> = Registrar<'a, EventCatalog, C>;
pub type MetricsRegistrar<'a, C> = Registrar<'a, MetricsCatalog, C>;

pub struct Registrar<'a, K, C> {
    container: &'a C,
    _catalog: PhantomData<fn() -> K>,
}

impl<'a, K: Catalog, C: Container> Registrar<'a, K, C> {
    pub fn new(container: &'a C) -> Self {
        Self { container, _catalog: PhantomData }
    }

    /// Registers a live consumer under every catalog capability it implements.
    pub fn register_instance(&self, consumer: Arc<dyn Consumer>) -> Result<Registration, RejectionError> {
        let name = consumer.consumer_name();
        let mut attach = AttachInstance {
            container: self.container,
            id: ConsumerId::of_instance(&consumer),
            consumer,
            name,
            registration: Registration { matched: Vec::new(), added: 0 },
        };
        K::visit(&mut attach);
        self.finish(name, attach.registration)
    }

    /// Registers type `T` without constructing it.
    ///
    /// The container builds one `T` on the first read of any matched channel and
    /// shares it across all of them.
    pub fn register_type<T: Consumer + Default>(&self) -> Result<Registration, RejectionError> {
        let name = std::any::type_name::<T>();
        // The singleton must exist before any channel entry can be resolved against it.
        if K::KINDS.iter().any(|kind| T::capabilities().contains(kind))
            && self.container.add_singleton_if_absent(T::default)
        {
            debug!(consumer = name, "deferred singleton registered");
        }
        let mut attach = AttachType::<C, T> {
            container: self.container,
            name,
            registration: Registration { matched: Vec::new(), added: 0 },
            _consumer: PhantomData,
        };
        K::visit(&mut attach);
        self.finish(name, attach.registration)
    }

    fn finish(&self, name: &'static str, registration: Registration) -> Result<Registration, RejectionError> {
        if registration.matched.is_empty() {
            warn!(consumer = name, category = %K::CATEGORY, "consumer rejected: no recognized capability");
            return Err(RejectionError { consumer: name, category: K::CATEGORY });
        }
        Activator::ensure_listeners::<K, C>(self.container);
        info!(
            consumer = name,
            category = %K::CATEGORY,
            matched = registration.matched.len(),
            added = registration.added,
            "consumer registered"
        );
        Ok(registration)
    }
}

struct AttachInstance<'a, C> {
    container: &'a C,
    consumer: Arc<dyn Consumer>,
    id: ConsumerId,
    name: &'static str,
    registration: Registration,
}

impl<C: Container> CapabilityVisitor for AttachInstance<'_, C> {
    fn visit<S: Signal>(&mut self) {
        let Some(view) = self.consumer.clone().view(S::KIND).and_then(|v| v.downcast::<S::View>()) else {
            return;
        };
        let added = self
            .container
            .add_enumerable_singleton_if_absent::<S::View>(self.id, Provider::Instance(view));
        record::<S>(&mut self.registration, self.name, added);
    }
}

struct AttachType<'a, C, T> {
    container: &'a C,
    name: &'static str,
    registration: Registration,
    _consumer: PhantomData<fn() -> T>,
}

impl<C: Container, T: Consumer + Default> CapabilityVisitor for AttachType<'_, C, T> {
    fn visit<S: Signal>(&mut self) {
        if !T::capabilities().contains(&S::KIND) {
            return;
        }
        let provider = Provider::deferred(|container: &C| {
            let instance = container.resolve_singleton::<T>()?;
            instance.view(S::KIND)?.downcast::<S::View>()
        });
        let added = self
            .container
            .add_enumerable_singleton_if_absent::<S::View>(ConsumerId::of_type::<T>(), provider);
        record::<S>(&mut self.registration, self.name, added);
    }
}

fn record<S: Signal>(registration: &mut Registration, consumer: &'static str, added: bool) {
    registration.matched.push(S::KIND);
    if added {
        registration.added += 1;
        debug!(consumer, capability = %S::KIND, "capability attached");
    } else {
        debug!(consumer, capability = %S::KIND, "duplicate registration suppressed");
    }
}
