//! Per-capability listeners: take payloads off a feed and fan them out to the channel.

use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::capability::Signal;
use crate::container::Container;
use crate::host::BackgroundService;

/// Broadcast source for one payload type. Held by the container as a singleton.
pub struct Feed<T> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> Feed<T> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes to every current subscriber and returns how many received it.
    /// Nothing is buffered for subscribers that arrive later.
    pub fn publish(&self, payload: T) -> usize {
        self.sender.send(payload).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Background service delivering every payload of `S` to the consumers in its channel.
pub struct Listener<S> {
    _signal: PhantomData<fn() -> S>,
}

impl<S: Signal> Listener<S> {
    pub fn new() -> Self {
        Self { _signal: PhantomData }
    }

    /// Delivers one payload to the channel. Returns how many consumers saw it.
    pub fn dispatch<C: Container>(services: &C, payload: &S::Payload) -> usize {
        let views = services.resolve_enumerable::<S::View>();
        for view in &views {
            S::deliver(view, payload);
        }
        views.len()
    }
}

impl<S: Signal> Default for Listener<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S: Signal, C: Container> BackgroundService<C> for Listener<S> {
    async fn run(self: Arc<Self>, services: Arc<C>, shutdown: CancellationToken) -> anyhow::Result<()> {
        let feed = services
            .resolve_singleton::<Feed<S::Payload>>()
            .ok_or_else(|| anyhow!("no feed registered for {}", S::KIND))?;
        let mut receiver = feed.subscribe();
        info!(capability = %S::KIND, "listener started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = receiver.recv() => match received {
                    Ok(payload) => {
                        let delivered = Self::dispatch(services.as_ref(), &payload);
                        debug!(capability = %S::KIND, delivered, "payload dispatched");
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(capability = %S::KIND, skipped, "listener lagged behind its feed");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        info!(capability = %S::KIND, "listener stopped");
        Ok(())
    }
}
