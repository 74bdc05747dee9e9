//! AWS IAM client wrapper for managed policy and role operations

use async_trait::async_trait;
use aws_sdk_iam::error::SdkError;
use aws_sdk_iam::Client as IamClient;

use crate::aws::{classify_sdk_error, CallError, CallResult, PolicyApi, RoleApi};
use crate::types::{ManagedPolicy, PolicyVersion, Role};

const NO_SUCH_ENTITY: &str = "NoSuchEntity";

fn iam_error<E, R>(err: SdkError<E, R>) -> CallError
where
    E: aws_sdk_iam::error::ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    classify_sdk_error(&err, NO_SUCH_ENTITY)
}

fn missing(what: &str) -> CallError {
    CallError::Other(format!("IAM response missing {what}"))
}

fn managed_policy(policy: &aws_sdk_iam::types::Policy) -> CallResult<ManagedPolicy> {
    Ok(ManagedPolicy {
        arn: policy.arn().ok_or_else(|| missing("Policy.Arn"))?.to_string(),
        default_version_id: policy.default_version_id().map(ToString::to_string),
    })
}

fn role(role: &aws_sdk_iam::types::Role) -> Role {
    Role {
        name: role.role_name().to_string(),
        assume_role_policy_document: role.assume_role_policy_document().map(ToString::to_string),
    }
}

pub struct AwsIamClient {
    client: IamClient,
}

impl AwsIamClient {
    pub fn new(client: IamClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PolicyApi for AwsIamClient {
    async fn get_policy(&self, policy_arn: &str) -> CallResult<ManagedPolicy> {
        let response = self
            .client
            .get_policy()
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(iam_error)?;
        managed_policy(response.policy().ok_or_else(|| missing("Policy"))?)
    }

    async fn create_policy(&self, policy_name: &str, document: &str) -> CallResult<ManagedPolicy> {
        let response = self
            .client
            .create_policy()
            .policy_name(policy_name)
            .policy_document(document)
            .send()
            .await
            .map_err(iam_error)?;
        managed_policy(response.policy().ok_or_else(|| missing("Policy"))?)
    }

    async fn get_policy_version(&self, policy_arn: &str, version_id: &str) -> CallResult<String> {
        let response = self
            .client
            .get_policy_version()
            .policy_arn(policy_arn)
            .version_id(version_id)
            .send()
            .await
            .map_err(iam_error)?;
        response
            .policy_version()
            .and_then(|v| v.document())
            .map(ToString::to_string)
            .ok_or_else(|| missing("PolicyVersion.Document"))
    }

    async fn list_policy_versions(&self, policy_arn: &str) -> CallResult<Vec<PolicyVersion>> {
        let response = self
            .client
            .list_policy_versions()
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(iam_error)?;
        Ok(response
            .versions()
            .iter()
            .filter_map(|v| {
                v.version_id().map(|id| PolicyVersion {
                    version_id: id.to_string(),
                    is_default: v.is_default_version(),
                })
            })
            .collect())
    }

    async fn create_policy_version(
        &self,
        policy_arn: &str,
        document: &str,
        set_as_default: bool,
    ) -> CallResult<PolicyVersion> {
        let response = self
            .client
            .create_policy_version()
            .policy_arn(policy_arn)
            .policy_document(document)
            .set_as_default(set_as_default)
            .send()
            .await
            .map_err(iam_error)?;
        let version = response
            .policy_version()
            .ok_or_else(|| missing("PolicyVersion"))?;
        Ok(PolicyVersion {
            version_id: version
                .version_id()
                .ok_or_else(|| missing("PolicyVersion.VersionId"))?
                .to_string(),
            is_default: version.is_default_version(),
        })
    }

    async fn delete_policy_version(&self, policy_arn: &str, version_id: &str) -> CallResult<()> {
        self.client
            .delete_policy_version()
            .policy_arn(policy_arn)
            .version_id(version_id)
            .send()
            .await
            .map_err(iam_error)?;
        Ok(())
    }
}

#[async_trait]
impl RoleApi for AwsIamClient {
    async fn get_role(&self, role_name: &str) -> CallResult<Role> {
        let response = self
            .client
            .get_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(iam_error)?;
        Ok(role(response.role().ok_or_else(|| missing("Role"))?))
    }

    async fn create_role(&self, role_name: &str, trust_document: &str) -> CallResult<Role> {
        let response = self
            .client
            .create_role()
            .role_name(role_name)
            .assume_role_policy_document(trust_document)
            .send()
            .await
            .map_err(iam_error)?;
        Ok(role(response.role().ok_or_else(|| missing("Role"))?))
    }

    async fn update_assume_role_policy(
        &self,
        role_name: &str,
        trust_document: &str,
    ) -> CallResult<()> {
        self.client
            .update_assume_role_policy()
            .role_name(role_name)
            .policy_document(trust_document)
            .send()
            .await
            .map_err(iam_error)?;
        Ok(())
    }

    async fn list_attached_role_policies(&self, role_name: &str) -> CallResult<Vec<String>> {
        let mut pages = self
            .client
            .list_attached_role_policies()
            .role_name(role_name)
            .into_paginator()
            .send();

        let mut policy_arns = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(iam_error)?;
            policy_arns.extend(
                page.attached_policies()
                    .iter()
                    .filter_map(|p| p.policy_arn())
                    .map(ToString::to_string),
            );
        }
        Ok(policy_arns)
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> CallResult<()> {
        self.client
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(iam_error)?;
        Ok(())
    }
}
