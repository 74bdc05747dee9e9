//! Builds the role trust policy that lets a Kubernetes service account assume the role
//! through the cluster's OIDC identity provider (IRSA).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aws::arn::oidc_provider_arn;

const POLICY_VERSION: &str = "2012-10-17";
const ASSUME_ROLE_WITH_WEB_IDENTITY: &str = "sts:AssumeRoleWithWebIdentity";

#[derive(Serialize)]
struct TrustPolicy<'a> {
    #[serde(rename = "Version")]
    version: &'a str,
    #[serde(rename = "Statement")]
    statement: [TrustStatement<'a>; 1],
}

#[derive(Serialize)]
struct TrustStatement<'a> {
    #[serde(rename = "Effect")]
    effect: &'a str,
    #[serde(rename = "Principal")]
    principal: FederatedPrincipal,
    #[serde(rename = "Action")]
    action: &'a str,
    #[serde(rename = "Condition")]
    condition: TrustCondition,
}

#[derive(Serialize)]
struct FederatedPrincipal {
    #[serde(rename = "Federated")]
    federated: String,
}

#[derive(Serialize)]
struct TrustCondition {
    #[serde(rename = "StringEquals")]
    string_equals: BTreeMap<String, String>,
}

/// Trust document granting `sts:AssumeRoleWithWebIdentity` to
/// `system:serviceaccount:<namespace>:<service_account>` tokens issued by `issuer`.
///
/// Output is pretty-printed and byte-stable for identical inputs, so it can be
/// compared verbatim against the role's stored trust document.
pub fn build_trust_policy(
    account_id: &str,
    issuer: &str,
    namespace: &str,
    service_account: &str,
) -> String {
    let policy = TrustPolicy {
        version: POLICY_VERSION,
        statement: [TrustStatement {
            effect: "Allow",
            principal: FederatedPrincipal {
                federated: oidc_provider_arn(account_id, issuer),
            },
            action: ASSUME_ROLE_WITH_WEB_IDENTITY,
            condition: TrustCondition {
                string_equals: BTreeMap::from([(
                    format!("{issuer}:sub"),
                    format!("system:serviceaccount:{namespace}:{service_account}"),
                )]),
            },
        }],
    };

    serde_json::to_string_pretty(&policy).unwrap_or_default()
}
