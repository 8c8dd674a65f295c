//! The two closed capability catalogs.
//!
//! A catalog is a compile-time list. Adding a capability means adding a
//! domain in [`crate::domain`] and a line to both `KINDS` and `visit` here.

use crate::capability::{CapabilityKind, Category, Events, Metrics, Signal};
use crate::domain::{Cache, Database, Http, Messaging, Runtime};

/// Called once per catalog kind with the kind's typed [`Signal`].
pub trait CapabilityVisitor {
    fn visit<S: Signal>(&mut self);
}

pub trait Catalog: Send + Sync + 'static {
    const CATEGORY: Category;

    /// Kinds in catalog order. `visit` walks them in the same order.
    const KINDS: &'static [CapabilityKind];

    fn visit<V: CapabilityVisitor>(visitor: &mut V);
}

pub enum EventCatalog {}

pub enum MetricsCatalog {}

impl Catalog for EventCatalog {
    const CATEGORY: Category = Category::Events;

    const KINDS: &'static [CapabilityKind] = &[
        <Events<Http>>::KIND,
        <Events<Database>>::KIND,
        <Events<Messaging>>::KIND,
        <Events<Cache>>::KIND,
        <Events<Runtime>>::KIND,
    ];

    fn visit<V: CapabilityVisitor>(visitor: &mut V) {
        visitor.visit::<Events<Http>>();
        visitor.visit::<Events<Database>>();
        visitor.visit::<Events<Messaging>>();
        visitor.visit::<Events<Cache>>();
        visitor.visit::<Events<Runtime>>();
    }
}

impl Catalog for MetricsCatalog {
    const CATEGORY: Category = Category::Metrics;

    const KINDS: &'static [CapabilityKind] = &[
        <Metrics<Http>>::KIND,
        <Metrics<Database>>::KIND,
        <Metrics<Messaging>>::KIND,
        <Metrics<Cache>>::KIND,
        <Metrics<Runtime>>::KIND,
    ];

    fn visit<V: CapabilityVisitor>(visitor: &mut V) {
        visitor.visit::<Metrics<Http>>();
        visitor.visit::<Metrics<Database>>();
        visitor.visit::<Metrics<Messaging>>();
        visitor.visit::<Metrics<Cache>>();
        visitor.visit::<Metrics<Runtime>>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;

    #[derive(Default)]
    struct Collect(Vec<CapabilityKind>);

    impl CapabilityVisitor for Collect {
        fn visit<S: Signal>(&mut self) {
            self.0.push(S::KIND);
        }
    }

    fn visited<K: Catalog>() -> Vec<CapabilityKind> {
        let mut collect = Collect::default();
        K::visit(&mut collect);
        collect.0
    }

    #[test]
    fn visit_order_matches_kinds() {
        assert_eq!(visited::<EventCatalog>(), EventCatalog::KINDS);
        assert_eq!(visited::<MetricsCatalog>(), MetricsCatalog::KINDS);
    }

    #[test]
    fn kinds_stay_within_their_category() {
        assert!(EventCatalog::KINDS.iter().all(|k| k.category == Category::Events));
        assert!(MetricsCatalog::KINDS.iter().all(|k| k.category == Category::Metrics));
    }

    #[test]
    fn every_domain_appears_once_per_catalog() {
        let domains = [Domain::Http, Domain::Database, Domain::Messaging, Domain::Cache, Domain::Runtime];
        let events: Vec<Domain> = EventCatalog::KINDS.iter().map(|k| k.domain).collect();
        let metrics: Vec<Domain> = MetricsCatalog::KINDS.iter().map(|k| k.domain).collect();
        assert_eq!(events, domains);
        assert_eq!(metrics, domains);
    }
}
