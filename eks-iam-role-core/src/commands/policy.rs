//! Managed policy reconciliation
//!
//! Converges a customer managed policy so that its default version carries the desired
//! document. IAM keeps at most five versions per policy and refuses to create a sixth,
//! so one non-default version is deleted before a new default is created.

use log::info;

use crate::aws::arn::policy_arn;
use crate::aws::{CallError, PolicyApi};
use crate::error::{ReconcileError, ReconcileResult};
use crate::parsing::{canonicalize, decode_document, parse_policy_document};
use crate::types::{ManagedPolicy, PolicyDocument, PolicyOutcome};

/// Ensures a named managed policy exists with a given document as its default version
pub struct PolicyReconciler<'a, P: ?Sized> {
    iam: &'a P,
    account_id: &'a str,
}

impl<'a, P: PolicyApi + ?Sized> PolicyReconciler<'a, P> {
    pub fn new(iam: &'a P, account_id: &'a str) -> Self {
        Self { iam, account_id }
    }

    /// Parse `document` and converge `policy_name` to it.
    ///
    /// Malformed JSON fails with [`ReconcileError::Validation`] before any remote call.
    pub async fn ensure(&self, policy_name: &str, document: &[u8]) -> ReconcileResult<PolicyOutcome> {
        let desired = parse_policy_document(document)?;
        self.ensure_document(policy_name, &desired).await
    }

    pub async fn ensure_document(
        &self,
        policy_name: &str,
        document: &PolicyDocument,
    ) -> ReconcileResult<PolicyOutcome> {
        info!("Ensuring policy {}", policy_name);
        let desired = canonicalize(document)?;
        let policy_arn = policy_arn(self.account_id, policy_name);

        let policy = match self.iam.get_policy(&policy_arn).await {
            Ok(policy) => policy,
            Err(CallError::NotFound(_)) => {
                self.iam
                    .create_policy(policy_name, &desired)
                    .await
                    .map_err(ReconcileError::remote("create policy", policy_name))?;
                info!("Created policy {}", policy_name);
                return Ok(PolicyOutcome::Created);
            }
            Err(e) => return Err(ReconcileError::remote("get policy", &policy_arn)(e)),
        };

        let current = self.current_document(&policy).await?;
        if current == desired {
            info!(
                "Existing policy document for {} matches requested policy",
                policy_name
            );
            return Ok(PolicyOutcome::Unchanged);
        }
        info!(
            "Existing policy document for {} does not match requested policy",
            policy_name
        );

        let deleted_version = self.delete_spare_version(&policy_arn).await?;

        let created = self
            .iam
            .create_policy_version(&policy_arn, &desired, true)
            .await
            .map_err(ReconcileError::remote("create policy version", &policy_arn))?;
        info!("Created policy version {}", created.version_id);

        Ok(PolicyOutcome::Updated {
            deleted_version,
            new_version: created.version_id,
        })
    }

    /// Canonical form of the policy's current default version
    async fn current_document(&self, policy: &ManagedPolicy) -> ReconcileResult<String> {
        let version_id = policy.default_version_id.as_deref().ok_or_else(|| {
            ReconcileError::remote("get policy", &policy.arn)(CallError::Other(
                "policy has no default version".to_string(),
            ))
        })?;

        let encoded = self
            .iam
            .get_policy_version(&policy.arn, version_id)
            .await
            .map_err(ReconcileError::remote("get policy version", &policy.arn))?;

        let decoded = decode_document(&encoded).map_err(|e| {
            ReconcileError::remote("decode policy version", &policy.arn)(CallError::Other(e))
        })?;
        let current = parse_policy_document(decoded.as_bytes()).map_err(|e| {
            ReconcileError::remote("parse policy version", &policy.arn)(CallError::Other(
                e.to_string(),
            ))
        })?;
        canonicalize(&current)
    }

    /// Delete the first non-default version, if any, to keep room under the version cap.
    ///
    /// Only one version is removed per run even if several spares exist.
    async fn delete_spare_version(&self, policy_arn: &str) -> ReconcileResult<Option<String>> {
        let versions = self
            .iam
            .list_policy_versions(policy_arn)
            .await
            .map_err(ReconcileError::remote("list policy versions", policy_arn))?;

        let Some(spare) = versions.into_iter().find(|v| !v.is_default) else {
            return Ok(None);
        };

        self.iam
            .delete_policy_version(policy_arn, &spare.version_id)
            .await
            .map_err(ReconcileError::remote("delete policy version", policy_arn))?;
        info!("Deleted policy version {}", spare.version_id);
        Ok(Some(spare.version_id))
    }
}
