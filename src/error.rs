use std::time::Duration;

use thiserror::Error;

use crate::capability::Category;

/// A consumer matched none of the catalog's capabilities.
///
/// Raised synchronously by registration; it signals a composition mistake and
/// is never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("consumer `{consumer}` implements no recognized {category} capability")]
pub struct RejectionError {
    pub consumer: &'static str,
    pub category: Category,
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HostError {
    #[error("shutdown grace {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded { grace: Duration, stuck: Vec<&'static str> },

    #[error("background service `{service}` failed")]
    ServiceFailed {
        service: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("background service `{service}` panicked")]
    ServicePanicked { service: &'static str },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidVar { var: &'static str, value: String, reason: String },
}
