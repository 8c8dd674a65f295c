use std::any::{type_name, TypeId};
use std::sync::Arc;

use crate::capability::{CapabilityKind, View};

/// An object that may observe one or more catalog capabilities.
///
/// Implement it with the [`consumer!`](crate::consumer!) macro rather than by hand:
/// the macro derives [`capabilities`](Consumer::capabilities) and
/// [`view`](Consumer::view) from a single list, so the static and the dynamic
/// answers cannot drift apart.
pub trait Consumer: Send + Sync + 'static {
    /// Capabilities declared by the type, known without an instance.
    fn capabilities() -> &'static [CapabilityKind]
    where
        Self: Sized;

    /// Returns this consumer viewed through `kind`, or `None` if it does not observe it.
    fn view(self: Arc<Self>, kind: CapabilityKind) -> Option<View>;

    fn consumer_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// Identity of a registered consumer inside a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumerId {
    /// Address of a live instance's shared allocation.
    Instance(usize),
    /// A deferred type; the container holds at most one instance of it.
    Type(TypeId),
}

impl ConsumerId {
    pub fn of_instance<T: ?Sized>(consumer: &Arc<T>) -> Self {
        ConsumerId::Instance(Arc::as_ptr(consumer).cast::<()>() as usize)
    }

    pub fn of_type<T: 'static>() -> Self {
        ConsumerId::Type(TypeId::of::<T>())
    }
}

/// Implements [`Consumer`] for a type from its list of observed domains.
///
/// Every listed domain must have a matching `EventObserver<D>` or
/// `MetricsObserver<D>` impl, otherwise the expansion does not compile.
///
/// ```ignore
/// struct SlowQueryLog;
///
/// impl EventObserver<Database> for SlowQueryLog { /* ... */ }
/// impl MetricsObserver<Database> for SlowQueryLog { /* ... */ }
///
/// consumer!(SlowQueryLog, events: [Database], metrics: [Database]);
/// ```
#[macro_export]
macro_rules! consumer {
    ($ty:ty $(, events: [$($ev:ty),* $(,)?])? $(, metrics: [$($me:ty),* $(,)?])? $(,)?) => {
        impl $crate::Consumer for $ty {
            fn capabilities() -> &'static [$crate::CapabilityKind] {
                const CAPABILITIES: &[$crate::CapabilityKind] = &[
                    $($($crate::CapabilityKind::events(<$ev as $crate::TelemetryDomain>::DOMAIN),)*)?
                    $($($crate::CapabilityKind::metrics(<$me as $crate::TelemetryDomain>::DOMAIN),)*)?
                ];
                CAPABILITIES
            }

            #[allow(unused_variables)]
            fn view(
                self: ::std::sync::Arc<Self>,
                kind: $crate::CapabilityKind,
            ) -> ::std::option::Option<$crate::View> {
                $($(
                    if kind == $crate::CapabilityKind::events(<$ev as $crate::TelemetryDomain>::DOMAIN) {
                        let view: ::std::sync::Arc<dyn $crate::EventObserver<$ev>> = self;
                        return ::std::option::Option::Some($crate::View::new(view));
                    }
                )*)?
                $($(
                    if kind == $crate::CapabilityKind::metrics(<$me as $crate::TelemetryDomain>::DOMAIN) {
                        let view: ::std::sync::Arc<dyn $crate::MetricsObserver<$me>> = self;
                        return ::std::option::Option::Some($crate::View::new(view));
                    }
                )*)?
                ::std::option::Option::None
            }
        }
    };
}
