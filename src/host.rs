//! Runs scheduled background services on the tokio runtime.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{info, warn};

use crate::config::HostConfig;
use crate::container::{Container, ServiceCollection};
use crate::error::HostError;

/// A long-running service started by the [`Host`].
///
/// `run` should return once `shutdown` is cancelled.
#[async_trait]
pub trait BackgroundService<C: Send + Sync + 'static>: Send + Sync + 'static {
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    async fn run(self: Arc<Self>, services: Arc<C>, shutdown: CancellationToken) -> anyhow::Result<()>;
}

struct Running {
    name: &'static str,
    handle: JoinHandle<anyhow::Result<()>>,
}

/// Owns the services and the tasks running them.
///
/// Dropping a host without [`Host::shutdown`] still cancels its services, but
/// does not wait for them.
pub struct Host {
    config: HostConfig,
    services: Arc<ServiceCollection>,
    shutdown: CancellationToken,
    _cancel_on_drop: DropGuard,
    running: HashMap<TypeId, Running>,
}

impl Host {
    pub fn new(config: HostConfig) -> Self {
        let services = Arc::new(ServiceCollection::new());
        let shared = config.clone();
        services.add_singleton_if_absent(move || shared.clone());
        let shutdown = CancellationToken::new();
        Self {
            config,
            services,
            _cancel_on_drop: shutdown.clone().drop_guard(),
            shutdown,
            running: HashMap::new(),
        }
    }

    pub fn services(&self) -> &Arc<ServiceCollection> {
        &self.services
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Number of services currently started by this host.
    pub fn running(&self) -> usize {
        self.running.len()
    }

    pub fn is_running<B: 'static>(&self) -> bool {
        self.running.contains_key(&TypeId::of::<B>())
    }

    /// Spawns every scheduled service that is not running yet and returns how many were started.
    ///
    /// Must be called from within a tokio runtime. Calling it again after further
    /// activations picks up only the newly scheduled services.
    pub fn start(&mut self) -> usize {
        let mut started = 0;
        for (id, service) in self.services.background_services() {
            if self.running.contains_key(&id) {
                continue;
            }
            let name = service.name();
            let handle = tokio::spawn(service.run(self.services.clone(), self.shutdown.child_token()));
            self.running.insert(id, Running { name, handle });
            started += 1;
        }
        if started > 0 {
            info!(started, total = self.running.len(), "host started background services");
        }
        started
    }

    /// Cancels every service and waits for them within the configured grace period.
    ///
    /// Services still running after the grace period are aborted and reported as
    /// [`HostError::GraceExceeded`]; otherwise the first failure is returned.
    pub async fn shutdown(self) -> Result<(), HostError> {
        let grace = self.config.shutdown_grace();
        info!(services = self.running.len(), ?grace, "host shutting down");
        self.shutdown.cancel();

        let deadline = tokio::time::Instant::now() + grace;
        let mut stuck = Vec::new();
        let mut first_failure = None;

        for Running { name, mut handle } in self.running.into_values() {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(source))) => {
                    warn!(service = name, error = %source, "background service failed");
                    if first_failure.is_none() {
                        first_failure = Some(HostError::ServiceFailed { service: name, source });
                    }
                }
                Ok(Err(join)) => {
                    warn!(service = name, error = %join, "background service panicked");
                    if first_failure.is_none() {
                        first_failure = Some(HostError::ServicePanicked { service: name });
                    }
                }
                Err(_) => {
                    handle.abort();
                    stuck.push(name);
                }
            }
        }

        if !stuck.is_empty() {
            stuck.sort_unstable();
            return Err(HostError::GraceExceeded { grace, stuck });
        }
        match first_failure {
            Some(error) => Err(error),
            None => {
                info!("host stopped");
                Ok(())
            }
        }
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}
