//! Role reconciliation: trust document and policy attachment

use log::{debug, info};

use crate::aws::arn::policy_arn;
use crate::aws::{CallError, PolicyApi, RoleApi};
use crate::error::{ReconcileError, ReconcileResult};
use crate::parsing::decode_document;
use crate::types::{Role, RoleOutcome};

/// Ensures a named role exists, trusts the given principal, and has the target policy attached
pub struct RoleReconciler<'a, I: ?Sized> {
    iam: &'a I,
    account_id: &'a str,
}

impl<'a, I: PolicyApi + RoleApi + ?Sized> RoleReconciler<'a, I> {
    pub fn new(iam: &'a I, account_id: &'a str) -> Self {
        Self { iam, account_id }
    }

    pub async fn ensure(
        &self,
        role_name: &str,
        policy_name: &str,
        trust_document: &str,
    ) -> ReconcileResult<RoleOutcome> {
        info!("Ensuring role {}", role_name);
        let mut outcome = RoleOutcome::default();

        match self.iam.get_role(role_name).await {
            Ok(role) => {
                debug!("Found role {}", role.name);
                if trust_differs(&role, trust_document) {
                    self.iam
                        .update_assume_role_policy(role_name, trust_document)
                        .await
                        .map_err(ReconcileError::remote("update trust policy of role", role_name))?;
                    info!("Updated role {} trust policy", role_name);
                    outcome.trust_updated = true;
                }
            }
            Err(CallError::NotFound(_)) => {
                self.iam
                    .create_role(role_name, trust_document)
                    .await
                    .map_err(ReconcileError::remote("create role", role_name))?;
                info!("Created role {}", role_name);
                outcome.created = true;
            }
            Err(e) => return Err(ReconcileError::remote("get role", role_name)(e)),
        }

        let policy_arn = policy_arn(self.account_id, policy_name);
        if self.is_attached(role_name, &policy_arn).await? {
            info!("Policy {} already attached to role {}", policy_name, role_name);
        } else {
            self.iam
                .attach_role_policy(role_name, &policy_arn)
                .await
                .map_err(ReconcileError::remote("attach policy", &policy_arn))?;
            info!("Attached policy {} to role {}", policy_name, role_name);
            outcome.policy_attached = true;
        }

        Ok(outcome)
    }

    /// Scan the role's attachments, resolving each one's ARN; stops at the first match.
    async fn is_attached(&self, role_name: &str, policy_arn: &str) -> ReconcileResult<bool> {
        let attached = self
            .iam
            .list_attached_role_policies(role_name)
            .await
            .map_err(ReconcileError::remote("list attached policies of role", role_name))?;

        for attached_arn in &attached {
            let policy = self
                .iam
                .get_policy(attached_arn)
                .await
                .map_err(ReconcileError::remote("get attached policy", attached_arn))?;
            debug!("Role {} has policy {} attached", role_name, policy.arn);
            if policy.arn == policy_arn {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// The stored trust document is URL-encoded; compare its decoded text verbatim.
fn trust_differs(role: &Role, desired: &str) -> bool {
    match role.assume_role_policy_document.as_deref().map(decode_document) {
        Some(Ok(current)) => current != desired,
        Some(Err(_)) | None => true,
    }
}
