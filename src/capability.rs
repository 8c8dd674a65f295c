use std::any::Any;
use std::fmt;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{Domain, TelemetryDomain};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Events,
    Metrics,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Events => f.write_str("events"),
            Category::Metrics => f.write_str("metrics"),
        }
    }
}

/// One recognized consumer capability: a consumer category within a telemetry domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CapabilityKind {
    pub category: Category,
    pub domain: Domain,
}

impl CapabilityKind {
    pub const fn events(domain: Domain) -> Self {
        Self { category: Category::Events, domain }
    }

    pub const fn metrics(domain: Domain) -> Self {
        Self { category: Category::Metrics, domain }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.domain)
    }
}

/// Receives discrete events of one domain.
pub trait EventObserver<D: TelemetryDomain>: Send + Sync {
    fn on_event(&self, event: &D::Event);
}

/// Receives periodic metric samples of one domain.
pub trait MetricsObserver<D: TelemetryDomain>: Send + Sync {
    fn on_metrics(&self, sample: &D::Metrics);
}

/// Type-level description of one capability channel.
///
/// `View` is the trait object stored in the channel, `Payload` is what the
/// channel's listener hands to every view.
pub trait Signal: Send + Sync + 'static {
    const KIND: CapabilityKind;
    type Payload: Clone + Debug + Send + Sync + 'static;
    type View: ?Sized + Send + Sync + 'static;

    fn deliver(view: &Self::View, payload: &Self::Payload);
}

pub struct Events<D>(PhantomData<fn() -> D>);

pub struct Metrics<D>(PhantomData<fn() -> D>);

impl<D: TelemetryDomain> Signal for Events<D> {
    const KIND: CapabilityKind = CapabilityKind::events(D::DOMAIN);
    type Payload = D::Event;
    type View = dyn EventObserver<D>;

    fn deliver(view: &Self::View, payload: &Self::Payload) {
        view.on_event(payload);
    }
}

impl<D: TelemetryDomain> Signal for Metrics<D> {
    const KIND: CapabilityKind = CapabilityKind::metrics(D::DOMAIN);
    type Payload = D::Metrics;
    type View = dyn MetricsObserver<D>;

    fn deliver(view: &Self::View, payload: &Self::Payload) {
        view.on_metrics(payload);
    }
}

/// A consumer seen through one capability, erased until the channel claims it.
///
/// Holds an `Arc<S>` where `S` is the capability's view trait object.
pub struct View(Box<dyn Any + Send + Sync>);

impl View {
    pub fn new<S: ?Sized + Send + Sync + 'static>(view: Arc<S>) -> Self {
        Self(Box::new(view))
    }

    /// Recovers the typed view; `None` if it was built for a different capability.
    pub fn downcast<S: ?Sized + Send + Sync + 'static>(self) -> Option<Arc<S>> {
        self.0.downcast::<Arc<S>>().ok().map(|view| *view)
    }
}

impl Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View").finish_non_exhaustive()
    }
}
