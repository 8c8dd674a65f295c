use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use capwire::domain::{Cache, CacheEvent, CacheMetrics, Database, DatabaseEvent, Http, HttpEvent};
use capwire::{consumer, EventObserver, Events, Host, HostConfig, Metrics, MetricsObserver, ServicesExt};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Logs slow queries and failed requests.
struct SlowPathLog;

impl EventObserver<Http> for SlowPathLog {
    fn on_event(&self, event: &HttpEvent) {
        if event.status >= 500 {
            tracing::warn!(route = %event.route, status = event.status, "request failed");
        }
    }
}

impl EventObserver<Database> for SlowPathLog {
    fn on_event(&self, event: &DatabaseEvent) {
        if event.elapsed > Duration::from_millis(100) {
            tracing::warn!(operation = %event.operation, elapsed = ?event.elapsed, "slow query");
        }
    }
}

consumer!(SlowPathLog, events: [Http, Database]);

/// Tracks cache hit ratio. Built lazily by the container.
#[derive(Default)]
struct HitRatio {
    hits: AtomicU64,
    lookups: AtomicU64,
}

impl EventObserver<Cache> for HitRatio {
    fn on_event(&self, event: &CacheEvent) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if event.hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl MetricsObserver<Cache> for HitRatio {
    fn on_metrics(&self, sample: &CacheMetrics) {
        tracing::info!(
            hits = self.hits.load(Ordering::Relaxed),
            lookups = self.lookups.load(Ordering::Relaxed),
            evictions = sample.evictions,
            "cache sample"
        );
    }
}

consumer!(HitRatio, events: [Cache], metrics: [Cache]);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = HostConfig::from_env()?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut host = Host::new(config);
    let services = host.services().clone();

    services.add_event_consumer(Arc::new(SlowPathLog))?;
    services.add_event_consumer_type::<HitRatio>()?;
    services.add_metrics_consumer_type::<HitRatio>()?;
    host.start();

    // Let the listeners subscribe before anything is published.
    tokio::time::sleep(Duration::from_millis(50)).await;

    services.publish::<Events<Http>>(HttpEvent {
        method: "GET".into(),
        route: "/orders".into(),
        status: 503,
        elapsed: Duration::from_millis(12),
    });
    services.publish::<Events<Database>>(DatabaseEvent {
        operation: "SELECT".into(),
        target: "orders".into(),
        elapsed: Duration::from_millis(240),
        failed: false,
    });
    for hit in [true, true, false] {
        services.publish::<Events<Cache>>(CacheEvent { key: "order:42".into(), hit });
    }
    services.publish::<Metrics<Cache>>(CacheMetrics { hits: 2, misses: 1, evictions: 0 });

    tokio::time::sleep(Duration::from_millis(50)).await;
    host.shutdown().await?;
    Ok(())
}
