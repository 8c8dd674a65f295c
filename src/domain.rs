//! Telemetry domains.
//!
//! Each domain is an uninhabited marker type implementing [`TelemetryDomain`].
//! The payload types are intentionally thin: the registry only routes them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Debug;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Http,
    Database,
    Messaging,
    Cache,
    Runtime,
}

impl Domain {
    pub const fn as_str(self) -> &'static str {
        match self {
            Domain::Http => "http",
            Domain::Database => "database",
            Domain::Messaging => "messaging",
            Domain::Cache => "cache",
            Domain::Runtime => "runtime",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binds a domain marker to its runtime tag and payload types.
pub trait TelemetryDomain: Send + Sync + 'static {
    const DOMAIN: Domain;
    type Event: Clone + Debug + Send + Sync + 'static;
    type Metrics: Clone + Debug + Send + Sync + 'static;
}

pub enum Http {}
pub enum Database {}
pub enum Messaging {}
pub enum Cache {}
pub enum Runtime {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpEvent {
    pub method: String,
    pub route: String,
    pub status: u16,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpMetrics {
    pub requests: u64,
    pub failures: u64,
    pub active_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseEvent {
    pub operation: String,
    pub target: String,
    pub elapsed: Duration,
    pub failed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseMetrics {
    pub commands: u64,
    pub failures: u64,
    pub pool_in_use: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagingEvent {
    pub destination: String,
    pub published: bool,
    pub payload_bytes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagingMetrics {
    pub published: u64,
    pub consumed: u64,
    pub backlog: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEvent {
    pub key: String,
    pub hit: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuntimeEvent {
    GcPause { generation: u8, pause: Duration },
    ThreadPoolStarved { queued: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeMetrics {
    pub heap_bytes: u64,
    pub worker_threads: u32,
    pub blocked_tasks: u32,
}

impl TelemetryDomain for Http {
    const DOMAIN: Domain = Domain::Http;
    type Event = HttpEvent;
    type Metrics = HttpMetrics;
}

impl TelemetryDomain for Database {
    const DOMAIN: Domain = Domain::Database;
    type Event = DatabaseEvent;
    type Metrics = DatabaseMetrics;
}

impl TelemetryDomain for Messaging {
    const DOMAIN: Domain = Domain::Messaging;
    type Event = MessagingEvent;
    type Metrics = MessagingMetrics;
}

impl TelemetryDomain for Cache {
    const DOMAIN: Domain = Domain::Cache;
    type Event = CacheEvent;
    type Metrics = CacheMetrics;
}

impl TelemetryDomain for Runtime {
    const DOMAIN: Domain = Domain::Runtime;
    type Event = RuntimeEvent;
    type Metrics = RuntimeMetrics;
}
