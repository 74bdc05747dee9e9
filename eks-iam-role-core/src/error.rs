//! Error taxonomy for reconciliation

use crate::aws::CallError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    /// The desired policy document is not a well-formed policy. Never reaches the network.
    #[error("Invalid policy document: {0}")]
    Validation(String),

    /// The cluster could not be described, or it does not expose an OIDC issuer.
    #[error("Failed to resolve OIDC issuer for cluster '{cluster}': {reason}")]
    Resolution { cluster: String, reason: String },

    /// A provider call failed for a reason other than an expected absence.
    #[error("Failed to {operation} '{resource}': {source}")]
    Remote {
        operation: &'static str,
        resource: String,
        #[source]
        source: CallError,
    },
}

impl ReconcileError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn resolution(cluster: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            cluster: cluster.into(),
            reason: reason.into(),
        }
    }

    /// Returns a mapper that wraps a [`CallError`] with the operation and resource it targeted.
    ///
    /// Intended for `.map_err(ReconcileError::remote("get policy", &arn))?`.
    pub fn remote(
        operation: &'static str,
        resource: impl Into<String>,
    ) -> impl FnOnce(CallError) -> Self {
        let resource = resource.into();
        move |source| Self::Remote {
            operation,
            resource,
            source,
        }
    }

    /// Whether this error was raised before any remote state was consulted.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
