//! AWS integration: capability traits consumed by the reconcilers, ARN derivation,
//! session bootstrap, and the SDK-backed implementations.

pub mod arn;
pub(crate) mod eks;
pub(crate) mod iam_client;
pub mod session;
pub(crate) mod sts;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{ClusterInfo, ManagedPolicy, PolicyVersion, Role};

/// Outcome tag for a failed provider call.
///
/// Reconcilers branch on `NotFound` to detect absence; everything else aborts the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Other(String),
}

pub type CallResult<T> = Result<T, CallError>;

/// Resolves the account of the calling credentials.
#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn caller_account_id(&self) -> CallResult<String>;
}

/// Describes EKS clusters.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn describe_cluster(&self, name: &str) -> CallResult<ClusterInfo>;
}

/// Managed policy operations.
#[async_trait]
pub trait PolicyApi: Send + Sync {
    async fn get_policy(&self, policy_arn: &str) -> CallResult<ManagedPolicy>;

    async fn create_policy(&self, policy_name: &str, document: &str) -> CallResult<ManagedPolicy>;

    /// Returns the version's document as stored by the provider (URL-encoded).
    async fn get_policy_version(&self, policy_arn: &str, version_id: &str) -> CallResult<String>;

    async fn list_policy_versions(&self, policy_arn: &str) -> CallResult<Vec<PolicyVersion>>;

    async fn create_policy_version(
        &self,
        policy_arn: &str,
        document: &str,
        set_as_default: bool,
    ) -> CallResult<PolicyVersion>;

    async fn delete_policy_version(&self, policy_arn: &str, version_id: &str) -> CallResult<()>;
}

/// Role operations.
#[async_trait]
pub trait RoleApi: Send + Sync {
    async fn get_role(&self, role_name: &str) -> CallResult<Role>;

    async fn create_role(&self, role_name: &str, trust_document: &str) -> CallResult<Role>;

    async fn update_assume_role_policy(
        &self,
        role_name: &str,
        trust_document: &str,
    ) -> CallResult<()>;

    /// ARNs of all managed policies attached to the role
    async fn list_attached_role_policies(&self, role_name: &str) -> CallResult<Vec<String>>;

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> CallResult<()>;
}

/// Map an SDK error onto the capability error tag.
///
/// `not_found_code` is the service's error code for a missing entity.
pub(crate) fn classify_sdk_error<E, R>(
    err: &aws_sdk_iam::error::SdkError<E, R>,
    not_found_code: &str,
) -> CallError
where
    E: aws_sdk_iam::error::ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata};

    if err.code() == Some(not_found_code) {
        CallError::NotFound(err.message().unwrap_or(not_found_code).to_string())
    } else {
        CallError::Other(DisplayErrorContext(err).to_string())
    }
}
