//! This crate provides the core logic for reconciling the IAM identity of an EKS workload:
//! - Trust policy synthesis for IAM Roles for Service Accounts
//! - OIDC issuer resolution from an EKS cluster
//! - Managed policy reconciliation with version retention
//! - Role reconciliation (trust document and policy attachment)
//!
//! Every reconciler talks to AWS through the capability traits in [`aws`], so the
//! same logic runs against the SDK clients or an in-memory account.

pub mod aws;
pub mod commands;
mod error;
pub mod parsing;
pub mod synthesis;
mod types;

#[cfg(test)]
#[allow(dead_code)]
pub(crate) mod test_utils;

// Re-exports for a small, focused public API
pub use aws::{CallError, CallResult, ClusterApi, IdentityApi, PolicyApi, RoleApi};
pub use commands::{
    reconcile, ClusterIssuerResolver, EksIamRoleService, PolicyReconciler, RoleReconciler,
};
pub use error::{ReconcileError, ReconcileResult};
pub use synthesis::build_trust_policy;
pub use types::{
    ClusterInfo, IssuerSource, ManagedPolicy, PolicyDocument, PolicyOutcome, PolicyVersion,
    ReconcileConfig, ReconcileReport, Role, RoleOutcome, Statement,
};
