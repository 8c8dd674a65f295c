//! # capwire
//!
//! Capability routing for telemetry consumers.
//!
//! A consumer declares which observation capabilities it implements
//! (`EventObserver<Http>`, `MetricsObserver<Cache>`, ...). Registration checks it
//! against a closed catalog, puts it into the channel of every matched capability
//! exactly once, and makes sure the listeners feeding those channels are scheduled.
//!
//! ```text
//! register_instance / register_type
//!        │
//!        ▼
//!   Catalog::visit ──► per kind: probe ──► match? ──► channel insert-if-absent
//!        │
//!        ▼
//!   zero matches? ──► RejectionError
//!        │
//!        ▼
//!   Activator::ensure_listeners ──► Host::start ──► Listener<S> ──► channel views
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use capwire::{consumer, EventObserver, ServiceCollection, ServicesExt};
//! use capwire::domain::{Database, DatabaseEvent};
//!
//! struct SlowQueries;
//!
//! impl EventObserver<Database> for SlowQueries {
//!     fn on_event(&self, event: &DatabaseEvent) {
//!         println!("{} took {:?}", event.operation, event.elapsed);
//!     }
//! }
//!
//! consumer!(SlowQueries, events: [Database]);
//!
//! let services = ServiceCollection::new();
//! let registration = services.add_event_consumer(Arc::new(SlowQueries)).unwrap();
//! assert_eq!(registration.added, 1);
//! ```

pub mod activator;
pub mod capability;
pub mod catalog;
pub mod config;
pub mod consumer;
pub mod container;
pub mod domain;
pub mod error;
pub mod ext;
pub mod host;
pub mod listener;
pub mod registrar;

pub use activator::Activator;
pub use capability::{CapabilityKind, Category, EventObserver, Events, Metrics, MetricsObserver, Signal, View};
pub use catalog::{CapabilityVisitor, Catalog, EventCatalog, MetricsCatalog};
pub use config::HostConfig;
pub use consumer::{Consumer, ConsumerId};
pub use container::{Container, Provider, ServiceCollection};
pub use domain::{Domain, TelemetryDomain};
pub use error::{ConfigError, HostError, RejectionError};
pub use ext::ServicesExt;
pub use host::{BackgroundService, Host};
pub use listener::{Feed, Listener};
pub use registrar::{EventRegistrar, MetricsRegistrar, Registrar, Registration};
