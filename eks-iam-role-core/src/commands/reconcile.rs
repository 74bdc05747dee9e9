//! Orchestration of one reconciliation run

use log::info;

use crate::aws::arn::policy_arn;
use crate::aws::{ClusterApi, IdentityApi, PolicyApi, RoleApi};
use crate::commands::issuer::ClusterIssuerResolver;
use crate::commands::policy::PolicyReconciler;
use crate::commands::role::RoleReconciler;
use crate::error::{ReconcileError, ReconcileResult};
use crate::parsing::parse_policy_document;
use crate::synthesis::build_trust_policy;
use crate::types::{IssuerSource, ReconcileConfig, ReconcileReport};

/// Converge the policy, then the role that references it.
///
/// The policy document is validated before any remote call. The caller's account id is
/// looked up once and threaded through every ARN built during the run. The first failure
/// aborts the run; mutations already made are left in place and a re-run picks up from
/// the provider's current state.
pub async fn reconcile<S, C, I>(
    identity: &S,
    cluster: &C,
    iam: &I,
    config: &ReconcileConfig,
) -> ReconcileResult<ReconcileReport>
where
    S: IdentityApi + ?Sized,
    C: ClusterApi + ?Sized,
    I: PolicyApi + RoleApi + ?Sized,
{
    let desired_policy = parse_policy_document(&config.policy_document)?;

    let account_id = identity
        .caller_account_id()
        .await
        .map_err(ReconcileError::remote("get caller identity", "current credentials"))?;
    info!("Using AWS account {}", account_id);

    let issuer = match &config.issuer_source {
        IssuerSource::Cluster(cluster_name) => {
            ClusterIssuerResolver::new(cluster)
                .resolve(cluster_name)
                .await?
        }
        IssuerSource::Issuer(issuer) => issuer.clone(),
    };
    let trust_document = build_trust_policy(
        &account_id,
        &issuer,
        &config.namespace,
        &config.service_account,
    );

    let policy = PolicyReconciler::new(iam, &account_id)
        .ensure_document(&config.policy_name, &desired_policy)
        .await?;

    let role = RoleReconciler::new(iam, &account_id)
        .ensure(&config.role_name, &config.policy_name, &trust_document)
        .await?;

    Ok(ReconcileReport {
        policy_arn: policy_arn(&account_id, &config.policy_name),
        account_id,
        policy,
        role,
    })
}
