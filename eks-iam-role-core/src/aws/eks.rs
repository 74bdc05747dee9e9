//! EKS cluster lookups

use async_trait::async_trait;
use aws_sdk_eks::Client as EksClient;

use crate::aws::{classify_sdk_error, CallResult, ClusterApi};
use crate::types::ClusterInfo;

const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";

/// Cluster descriptions backed by EKS DescribeCluster
pub struct EksClusterClient {
    client: EksClient,
}

impl EksClusterClient {
    pub fn new(client: EksClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterApi for EksClusterClient {
    async fn describe_cluster(&self, name: &str) -> CallResult<ClusterInfo> {
        let out = self
            .client
            .describe_cluster()
            .name(name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, RESOURCE_NOT_FOUND))?;
        let oidc_issuer = out
            .cluster()
            .and_then(|c| c.identity())
            .and_then(|i| i.oidc())
            .and_then(|o| o.issuer())
            .map(ToString::to_string);
        Ok(ClusterInfo { oidc_issuer })
    }
}
