//! Core data structures for eks-iam-role

use serde::{Deserialize, Deserializer, Serialize};

/// IAM policy document in the shape used for comparison and upload.
///
/// Only `Version` and `Statement` are meaningful. Unknown fields are dropped on parse,
/// so two documents that differ only in ignored fields, key order, or whitespace
/// serialize to the same canonical string. A `null` field reads as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyDocument {
    #[serde(rename = "Version", default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(rename = "Statement", default, deserialize_with = "null_as_default")]
    pub statement: Vec<Statement>,
}

/// A single policy statement
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Statement {
    #[serde(rename = "Effect", default, deserialize_with = "null_as_default")]
    pub effect: String,
    #[serde(rename = "Action", default, deserialize_with = "one_or_many")]
    pub action: Vec<String>,
    #[serde(rename = "Resource", default, deserialize_with = "one_or_many")]
    pub resource: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// IAM accepts either a bare string or a list for Action and Resource.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}

/// Managed policy as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedPolicy {
    pub arn: String,
    pub default_version_id: Option<String>,
}

/// One entry of a managed policy's version history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyVersion {
    pub version_id: String,
    pub is_default: bool,
}

/// IAM role as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    /// Trust document exactly as stored by the provider (typically URL-encoded)
    pub assume_role_policy_document: Option<String>,
}

/// Subset of an EKS cluster description needed for trust resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterInfo {
    pub oidc_issuer: Option<String>,
}

/// Where the OIDC issuer for the trust policy comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuerSource {
    /// Look the issuer up from an EKS cluster
    Cluster(String),
    /// Use the issuer as given
    Issuer(String),
}

/// Fully validated input for one reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    pub role_name: String,
    pub policy_name: String,
    /// Raw bytes of the desired policy document
    pub policy_document: Vec<u8>,
    pub namespace: String,
    pub service_account: String,
    pub issuer_source: IssuerSource,
}

/// What the policy reconciler did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyOutcome {
    Created,
    Unchanged,
    Updated {
        deleted_version: Option<String>,
        new_version: String,
    },
}

/// What the role reconciler did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleOutcome {
    pub created: bool,
    pub trust_updated: bool,
    pub policy_attached: bool,
}

/// Summary of a successful reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub account_id: String,
    pub policy_arn: String,
    pub policy: PolicyOutcome,
    pub role: RoleOutcome,
}

impl ReconcileReport {
    /// Whether any mutating call was issued
    pub fn changed(&self) -> bool {
        self.policy != PolicyOutcome::Unchanged
            || self.role.created
            || self.role.trust_updated
            || self.role.policy_attached
    }
}
