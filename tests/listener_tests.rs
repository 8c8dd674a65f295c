use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use capwire::domain::{Cache, CacheMetrics, Http, HttpEvent};
use capwire::{
    consumer, BackgroundService, Container, EventObserver, Events, Feed, Host, HostConfig, HostError,
    Listener, Metrics, MetricsObserver, ServiceCollection, ServicesExt,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

struct RouteRecorder {
    tx: mpsc::UnboundedSender<String>,
}

impl EventObserver<Http> for RouteRecorder {
    fn on_event(&self, event: &HttpEvent) {
        let _ = self.tx.send(event.route.clone());
    }
}

impl MetricsObserver<Cache> for RouteRecorder {
    fn on_metrics(&self, sample: &CacheMetrics) {
        let _ = self.tx.send(format!("evictions={}", sample.evictions));
    }
}

consumer!(RouteRecorder, events: [Http], metrics: [Cache]);

fn quick_host() -> Host {
    Host::new(HostConfig { shutdown_grace_ms: 200, ..HostConfig::default() })
}

fn request(route: &str) -> HttpEvent {
    HttpEvent {
        method: "GET".into(),
        route: route.into(),
        status: 200,
        elapsed: Duration::from_millis(3),
    }
}

async fn wait_for_subscriber<T: Clone + Send + Sync + 'static>(services: &ServiceCollection) {
    let feed = services.resolve_singleton::<Feed<T>>().expect("feed registered");
    tokio::time::timeout(Duration::from_secs(2), async {
        while feed.subscriber_count() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("listener subscribed");
}

#[tokio::test]
async fn test_activation_is_idempotent() {
    let mut host = quick_host();
    let services = host.services().clone();

    assert_eq!(services.activate_all_listeners(), 10);
    for _ in 0..4 {
        assert_eq!(services.activate_all_listeners(), 0);
    }
    assert_eq!(services.background_service_count(), 10);

    assert_eq!(host.start(), 10);
    services.activate_all_listeners();
    assert_eq!(host.start(), 0);
    assert_eq!(host.running(), 10);
    assert!(host.is_running::<Listener<Events<Http>>>());
    assert!(host.is_running::<Listener<Metrics<Cache>>>());

    host.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_published_events_reach_registered_consumers() {
    let mut host = quick_host();
    let services = host.services().clone();
    let (tx, mut rx) = mpsc::unbounded_channel();

    assert_eq!(services.publish::<Events<Http>>(request("/early")), 0, "nothing is listening yet");

    let recorder = Arc::new(RouteRecorder { tx });
    services.add_event_consumer(recorder.clone()).unwrap();
    services.add_metrics_consumer(recorder).unwrap();
    host.start();

    wait_for_subscriber::<HttpEvent>(&services).await;
    wait_for_subscriber::<CacheMetrics>(&services).await;

    assert_eq!(services.publish::<Events<Http>>(request("/orders")), 1);
    services.publish::<Metrics<Cache>>(CacheMetrics { hits: 10, misses: 2, evictions: 7 });

    let mut received = Vec::new();
    for _ in 0..2 {
        let item = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        received.push(item);
    }
    received.sort();
    assert_eq!(received, ["/orders", "evictions=7"]);

    host.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_late_registration_is_picked_up_by_next_start() {
    let mut host = quick_host();
    let services = host.services().clone();

    assert_eq!(host.start(), 0);

    let (tx, _rx) = mpsc::unbounded_channel();
    services.add_event_consumer(Arc::new(RouteRecorder { tx })).unwrap();
    assert_eq!(host.start(), 5);
    assert!(!host.is_running::<Listener<Metrics<Cache>>>());

    host.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_dispatch_fans_out_to_every_view() {
    let services = ServiceCollection::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    services.add_event_consumer(Arc::new(RouteRecorder { tx: tx.clone() })).unwrap();
    services.add_event_consumer(Arc::new(RouteRecorder { tx })).unwrap();

    let delivered = Listener::<Events<Http>>::dispatch(&services, &request("/fan"));
    assert_eq!(delivered, 2);
    assert_eq!(rx.recv().await.unwrap(), "/fan");
    assert_eq!(rx.recv().await.unwrap(), "/fan");
}

#[derive(Default)]
struct Crashes;

#[async_trait]
impl BackgroundService<ServiceCollection> for Crashes {
    async fn run(self: Arc<Self>, _: Arc<ServiceCollection>, _: CancellationToken) -> anyhow::Result<()> {
        anyhow::bail!("listener could not attach")
    }
}

#[derive(Default)]
struct IgnoresShutdown;

#[async_trait]
impl BackgroundService<ServiceCollection> for IgnoresShutdown {
    async fn run(self: Arc<Self>, _: Arc<ServiceCollection>, _: CancellationToken) -> anyhow::Result<()> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }
}

#[tokio::test]
async fn test_shutdown_reports_failed_service() {
    let mut host = quick_host();
    assert!(host.services().add_background_service_if_absent(Crashes::default));
    assert!(!host.services().add_background_service_if_absent(Crashes::default));
    host.start();

    let err = host.shutdown().await.unwrap_err();
    match err {
        HostError::ServiceFailed { service, source } => {
            assert!(service.contains("Crashes"));
            assert_eq!(source.to_string(), "listener could not attach");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_shutdown_aborts_stuck_service() {
    let mut host = Host::new(HostConfig { shutdown_grace_ms: 50, ..HostConfig::default() });
    host.services().add_background_service_if_absent(IgnoresShutdown::default);
    host.start();

    let err = host.shutdown().await.unwrap_err();
    assert!(matches!(err, HostError::GraceExceeded { ref stuck, .. } if stuck.len() == 1));
}

#[tokio::test]
async fn test_feed_capacity_follows_host_config() {
    let host = Host::new(HostConfig { feed_capacity: 2, ..HostConfig::default() });
    let services = host.services().clone();
    services.activate_all_listeners();

    let feed = services.resolve_singleton::<Feed<HttpEvent>>().unwrap();
    let mut rx = feed.subscribe();
    for i in 0..4 {
        feed.publish(request(&format!("/{i}")));
    }
    assert!(matches!(
        rx.recv().await,
        Err(tokio::sync::broadcast::error::RecvError::Lagged(2))
    ));
}

struct ReportsCancellation {
    stopped: mpsc::UnboundedSender<()>,
}

#[async_trait]
impl BackgroundService<ServiceCollection> for ReportsCancellation {
    async fn run(self: Arc<Self>, _: Arc<ServiceCollection>, shutdown: CancellationToken) -> anyhow::Result<()> {
        shutdown.cancelled().await;
        let _ = self.stopped.send(());
        Ok(())
    }
}

#[tokio::test]
async fn test_dropping_host_cancels_its_services() {
    let mut host = quick_host();
    let (tx, mut rx) = mpsc::unbounded_channel();
    host.services().add_background_service_if_absent(move || ReportsCancellation { stopped: tx });
    assert_eq!(host.start(), 1);

    drop(host);

    let stopped = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
    assert_eq!(stopped.expect("service saw cancellation"), Some(()));
}
