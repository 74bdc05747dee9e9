//! Deterministic IAM ARN construction

/// ARN of a customer managed policy in `account_id`
pub fn policy_arn(account_id: &str, policy_name: &str) -> String {
    iam_arn(account_id, "policy", policy_name)
}

/// ARN of the IAM OIDC identity provider registered for `issuer`
pub fn oidc_provider_arn(account_id: &str, issuer: &str) -> String {
    iam_arn(account_id, "oidc-provider", issuer)
}

fn iam_arn(account_id: &str, resource_type: &str, resource_name: &str) -> String {
    format!("arn:aws:iam::{account_id}:{resource_type}/{resource_name}")
}
