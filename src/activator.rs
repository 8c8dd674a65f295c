use tracing::{debug, info};

use crate::capability::Signal;
use crate::catalog::{CapabilityVisitor, Catalog, EventCatalog, MetricsCatalog};
use crate::config::{HostConfig, DEFAULT_FEED_CAPACITY};
use crate::container::Container;
use crate::listener::{Feed, Listener};

/// Makes sure every catalog kind has its feed and its listener scheduled.
///
/// Safe to call any number of times: everything is "add if absent". It only
/// schedules listeners; the host decides when they start.
pub struct Activator;

impl Activator {
    /// Schedules the listeners of catalog `K`. Returns how many were newly scheduled.
    pub fn ensure_listeners<K: Catalog, C: Container>(container: &C) -> usize {
        let feed_capacity = container
            .resolve_singleton::<HostConfig>()
            .map_or(DEFAULT_FEED_CAPACITY, |config| config.feed_capacity);
        let mut install = InstallListeners { container, feed_capacity, added: 0 };
        K::visit(&mut install);
        if install.added > 0 {
            info!(category = %K::CATEGORY, added = install.added, "listeners scheduled");
        }
        install.added
    }

    /// Schedules the listeners of both catalogs.
    pub fn activate_all_listeners<C: Container>(container: &C) -> usize {
        Self::ensure_listeners::<EventCatalog, C>(container) + Self::ensure_listeners::<MetricsCatalog, C>(container)
    }
}

struct InstallListeners<'a, C> {
    container: &'a C,
    feed_capacity: usize,
    added: usize,
}

impl<C: Container> CapabilityVisitor for InstallListeners<'_, C> {
    fn visit<S: Signal>(&mut self) {
        let capacity = self.feed_capacity;
        self.container.add_singleton_if_absent(move || Feed::<S::Payload>::new(capacity));
        if self.container.add_background_service_if_absent(Listener::<S>::new) {
            debug!(capability = %S::KIND, "listener scheduled");
            self.added += 1;
        }
    }
}
