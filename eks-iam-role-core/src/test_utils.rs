//! Test utilities: an in-memory AWS account implementing every capability.
//!
//! The fake keeps real state (policies with version history, roles, attachments),
//! stores documents URL-encoded the way IAM returns them, enforces the
//! five-version cap, and records every call for assertions.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::aws::arn::policy_arn;
use crate::aws::{CallError, CallResult, ClusterApi, IdentityApi, PolicyApi, RoleApi};
use crate::types::{ClusterInfo, ManagedPolicy, PolicyVersion, Role};

pub(crate) const ACCOUNT_ID: &str = "123456789012";
const MAX_POLICY_VERSIONS: usize = 5;

/// Common fixtures.
pub(crate) mod fixtures {
    pub const POLICY_DOCUMENT: &str = r#"{
  "Version": "2012-10-17",
  "Statement": [
    {"Effect": "Allow", "Action": ["s3:GetObject"], "Resource": "arn:aws:s3:::my-bucket/*"}
  ]
}"#;

    pub const OTHER_POLICY_DOCUMENT: &str =
        r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":["sqs:SendMessage"],"Resource":"*"}]}"#;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    CallerAccountId,
    DescribeCluster(String),
    GetPolicy(String),
    CreatePolicy {
        name: String,
        document: String,
    },
    GetPolicyVersion {
        arn: String,
        version_id: String,
    },
    ListPolicyVersions(String),
    CreatePolicyVersion {
        arn: String,
        document: String,
        set_as_default: bool,
    },
    DeletePolicyVersion {
        arn: String,
        version_id: String,
    },
    GetRole(String),
    CreateRole {
        name: String,
        trust_document: String,
    },
    UpdateAssumeRolePolicy {
        name: String,
        trust_document: String,
    },
    ListAttachedRolePolicies(String),
    AttachRolePolicy {
        name: String,
        policy_arn: String,
    },
}

impl Call {
    pub(crate) fn operation(&self) -> &'static str {
        match self {
            Self::CallerAccountId => "caller_account_id",
            Self::DescribeCluster(_) => "describe_cluster",
            Self::GetPolicy(_) => "get_policy",
            Self::CreatePolicy { .. } => "create_policy",
            Self::GetPolicyVersion { .. } => "get_policy_version",
            Self::ListPolicyVersions(_) => "list_policy_versions",
            Self::CreatePolicyVersion { .. } => "create_policy_version",
            Self::DeletePolicyVersion { .. } => "delete_policy_version",
            Self::GetRole(_) => "get_role",
            Self::CreateRole { .. } => "create_role",
            Self::UpdateAssumeRolePolicy { .. } => "update_assume_role_policy",
            Self::ListAttachedRolePolicies(_) => "list_attached_role_policies",
            Self::AttachRolePolicy { .. } => "attach_role_policy",
        }
    }

    /// Whether the call changes provider state
    pub(crate) fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreatePolicy { .. }
                | Self::CreatePolicyVersion { .. }
                | Self::DeletePolicyVersion { .. }
                | Self::CreateRole { .. }
                | Self::UpdateAssumeRolePolicy { .. }
                | Self::AttachRolePolicy { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakeVersion {
    pub id: String,
    /// Stored URL-encoded
    pub document: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default)]
struct FakePolicy {
    versions: Vec<FakeVersion>,
    next_version: u32,
}

impl FakePolicy {
    fn push_version(&mut self, document: String, is_default: bool) -> FakeVersion {
        self.next_version += 1;
        if is_default {
            for v in &mut self.versions {
                v.is_default = false;
            }
        }
        let version = FakeVersion {
            id: format!("v{}", self.next_version),
            document,
            is_default,
        };
        self.versions.push(version.clone());
        version
    }

    fn default_version(&self) -> Option<&FakeVersion> {
        self.versions.iter().find(|v| v.is_default)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakeRole {
    /// Stored URL-encoded
    pub trust_document: String,
    pub attached: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    clusters: HashMap<String, ClusterInfo>,
    policies: BTreeMap<String, FakePolicy>,
    roles: BTreeMap<String, FakeRole>,
    failures: HashMap<&'static str, CallError>,
    calls: Vec<Call>,
}

pub(crate) fn encode(document: &str) -> String {
    utf8_percent_encode(document, NON_ALPHANUMERIC).to_string()
}

/// In-memory AWS account
#[derive(Debug, Default)]
pub(crate) struct FakeAws {
    state: Mutex<State>,
}

impl FakeAws {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("fake state poisoned")
    }

    pub(crate) fn with_cluster(self, name: &str, issuer: Option<&str>) -> Self {
        self.state().clusters.insert(
            name.to_string(),
            ClusterInfo {
                oidc_issuer: issuer.map(ToString::to_string),
            },
        );
        self
    }

    /// Seed a customer managed policy in the fake account.
    ///
    /// `versions` are `(document, is_default)` pairs in listing order; documents are
    /// stored verbatim, so pass them pre-encoded to emulate IAM.
    pub(crate) fn with_policy(self, name: &str, versions: &[(&str, bool)]) -> Self {
        self.with_policy_arn(&policy_arn(ACCOUNT_ID, name), versions)
    }

    pub(crate) fn with_policy_arn(self, arn: &str, versions: &[(&str, bool)]) -> Self {
        let mut policy = FakePolicy::default();
        for (document, is_default) in versions {
            policy.next_version += 1;
            policy.versions.push(FakeVersion {
                id: format!("v{}", policy.next_version),
                document: (*document).to_string(),
                is_default: *is_default,
            });
        }
        self.state().policies.insert(arn.to_string(), policy);
        self
    }

    /// Seed a role; `trust_document` is stored verbatim.
    pub(crate) fn with_role(self, name: &str, trust_document: &str, attached: &[&str]) -> Self {
        self.state().roles.insert(
            name.to_string(),
            FakeRole {
                trust_document: trust_document.to_string(),
                attached: attached.iter().map(ToString::to_string).collect(),
            },
        );
        self
    }

    /// Make every call of `operation` fail with `error`.
    pub(crate) fn failing_with(self, operation: &'static str, error: CallError) -> Self {
        self.state().failures.insert(operation, error);
        self
    }

    pub(crate) fn failing(self, operation: &'static str) -> Self {
        let error = CallError::Other(format!("{operation} test error"));
        self.failing_with(operation, error)
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub(crate) fn operations(&self) -> Vec<&'static str> {
        self.state().calls.iter().map(Call::operation).collect()
    }

    pub(crate) fn count(&self, operation: &str) -> usize {
        self.operations()
            .into_iter()
            .filter(|op| *op == operation)
            .count()
    }

    pub(crate) fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub(crate) fn policy_versions(&self, name: &str) -> Vec<FakeVersion> {
        self.state()
            .policies
            .get(&policy_arn(ACCOUNT_ID, name))
            .map(|p| p.versions.clone())
            .unwrap_or_default()
    }

    pub(crate) fn role(&self, name: &str) -> Option<FakeRole> {
        self.state().roles.get(name).cloned()
    }

    /// Record the call and return the injected failure for it, if any.
    fn record(&self, call: Call) -> CallResult<MutexGuard<'_, State>> {
        let mut state = self.state();
        let operation = call.operation();
        state.calls.push(call);
        match state.failures.get(operation) {
            Some(error) => Err(error.clone()),
            None => Ok(state),
        }
    }
}

fn no_such_entity(what: &str) -> CallError {
    CallError::NotFound(format!("{what} not found"))
}

#[async_trait]
impl IdentityApi for FakeAws {
    async fn caller_account_id(&self) -> CallResult<String> {
        self.record(Call::CallerAccountId)?;
        Ok(ACCOUNT_ID.to_string())
    }
}

#[async_trait]
impl ClusterApi for FakeAws {
    async fn describe_cluster(&self, name: &str) -> CallResult<ClusterInfo> {
        let state = self.record(Call::DescribeCluster(name.to_string()))?;
        state
            .clusters
            .get(name)
            .cloned()
            .ok_or_else(|| no_such_entity(name))
    }
}

#[async_trait]
impl PolicyApi for FakeAws {
    async fn get_policy(&self, arn: &str) -> CallResult<ManagedPolicy> {
        let state = self.record(Call::GetPolicy(arn.to_string()))?;
        let policy = state.policies.get(arn).ok_or_else(|| no_such_entity(arn))?;
        Ok(ManagedPolicy {
            arn: arn.to_string(),
            default_version_id: policy.default_version().map(|v| v.id.clone()),
        })
    }

    async fn create_policy(&self, name: &str, document: &str) -> CallResult<ManagedPolicy> {
        let mut state = self.record(Call::CreatePolicy {
            name: name.to_string(),
            document: document.to_string(),
        })?;
        let arn = policy_arn(ACCOUNT_ID, name);
        if state.policies.contains_key(&arn) {
            return Err(CallError::Other(format!("EntityAlreadyExists: {arn}")));
        }
        let mut policy = FakePolicy::default();
        let version = policy.push_version(encode(document), true);
        state.policies.insert(arn.clone(), policy);
        Ok(ManagedPolicy {
            arn,
            default_version_id: Some(version.id),
        })
    }

    async fn get_policy_version(&self, arn: &str, version_id: &str) -> CallResult<String> {
        let state = self.record(Call::GetPolicyVersion {
            arn: arn.to_string(),
            version_id: version_id.to_string(),
        })?;
        state
            .policies
            .get(arn)
            .and_then(|p| p.versions.iter().find(|v| v.id == version_id))
            .map(|v| v.document.clone())
            .ok_or_else(|| no_such_entity(version_id))
    }

    async fn list_policy_versions(&self, arn: &str) -> CallResult<Vec<PolicyVersion>> {
        let state = self.record(Call::ListPolicyVersions(arn.to_string()))?;
        let policy = state.policies.get(arn).ok_or_else(|| no_such_entity(arn))?;
        Ok(policy
            .versions
            .iter()
            .map(|v| PolicyVersion {
                version_id: v.id.clone(),
                is_default: v.is_default,
            })
            .collect())
    }

    async fn create_policy_version(
        &self,
        arn: &str,
        document: &str,
        set_as_default: bool,
    ) -> CallResult<PolicyVersion> {
        let mut state = self.record(Call::CreatePolicyVersion {
            arn: arn.to_string(),
            document: document.to_string(),
            set_as_default,
        })?;
        let policy = state
            .policies
            .get_mut(arn)
            .ok_or_else(|| no_such_entity(arn))?;
        if policy.versions.len() >= MAX_POLICY_VERSIONS {
            return Err(CallError::Other(format!(
                "LimitExceeded: cannot exceed quota for PolicyVersionsPerPolicy: {MAX_POLICY_VERSIONS}"
            )));
        }
        let version = policy.push_version(encode(document), set_as_default);
        Ok(PolicyVersion {
            version_id: version.id,
            is_default: version.is_default,
        })
    }

    async fn delete_policy_version(&self, arn: &str, version_id: &str) -> CallResult<()> {
        let mut state = self.record(Call::DeletePolicyVersion {
            arn: arn.to_string(),
            version_id: version_id.to_string(),
        })?;
        let policy = state
            .policies
            .get_mut(arn)
            .ok_or_else(|| no_such_entity(arn))?;
        let index = policy
            .versions
            .iter()
            .position(|v| v.id == version_id)
            .ok_or_else(|| no_such_entity(version_id))?;
        if policy.versions[index].is_default {
            return Err(CallError::Other(
                "DeleteConflict: cannot delete the default version".to_string(),
            ));
        }
        policy.versions.remove(index);
        Ok(())
    }
}

#[async_trait]
impl RoleApi for FakeAws {
    async fn get_role(&self, name: &str) -> CallResult<Role> {
        let state = self.record(Call::GetRole(name.to_string()))?;
        let role = state.roles.get(name).ok_or_else(|| no_such_entity(name))?;
        Ok(Role {
            name: name.to_string(),
            assume_role_policy_document: Some(role.trust_document.clone()),
        })
    }

    async fn create_role(&self, name: &str, trust_document: &str) -> CallResult<Role> {
        let mut state = self.record(Call::CreateRole {
            name: name.to_string(),
            trust_document: trust_document.to_string(),
        })?;
        if state.roles.contains_key(name) {
            return Err(CallError::Other(format!("EntityAlreadyExists: {name}")));
        }
        let encoded = encode(trust_document);
        state.roles.insert(
            name.to_string(),
            FakeRole {
                trust_document: encoded.clone(),
                attached: Vec::new(),
            },
        );
        Ok(Role {
            name: name.to_string(),
            assume_role_policy_document: Some(encoded),
        })
    }

    async fn update_assume_role_policy(&self, name: &str, trust_document: &str) -> CallResult<()> {
        let mut state = self.record(Call::UpdateAssumeRolePolicy {
            name: name.to_string(),
            trust_document: trust_document.to_string(),
        })?;
        let role = state.roles.get_mut(name).ok_or_else(|| no_such_entity(name))?;
        role.trust_document = encode(trust_document);
        Ok(())
    }

    async fn list_attached_role_policies(&self, name: &str) -> CallResult<Vec<String>> {
        let state = self.record(Call::ListAttachedRolePolicies(name.to_string()))?;
        let role = state.roles.get(name).ok_or_else(|| no_such_entity(name))?;
        Ok(role.attached.clone())
    }

    async fn attach_role_policy(&self, name: &str, policy_arn: &str) -> CallResult<()> {
        let mut state = self.record(Call::AttachRolePolicy {
            name: name.to_string(),
            policy_arn: policy_arn.to_string(),
        })?;
        if !state.policies.contains_key(policy_arn) {
            return Err(no_such_entity(policy_arn));
        }
        let role = state.roles.get_mut(name).ok_or_else(|| no_such_entity(name))?;
        if !role.attached.iter().any(|a| a == policy_arn) {
            role.attached.push(policy_arn.to_string());
        }
        Ok(())
    }
}
