//! OIDC issuer lookup for EKS clusters

use log::info;

use crate::aws::ClusterApi;
use crate::error::{ReconcileError, ReconcileResult};

/// Resolves a cluster's OIDC issuer through the cluster description
pub struct ClusterIssuerResolver<'a, C: ?Sized> {
    cluster: &'a C,
}

impl<'a, C: ClusterApi + ?Sized> ClusterIssuerResolver<'a, C> {
    pub fn new(cluster: &'a C) -> Self {
        Self { cluster }
    }

    /// Returns the issuer string exactly as the cluster reports it.
    pub async fn resolve(&self, cluster_name: &str) -> ReconcileResult<String> {
        let cluster = self
            .cluster
            .describe_cluster(cluster_name)
            .await
            .map_err(|e| ReconcileError::resolution(cluster_name, format!("describe cluster: {e}")))?;

        let issuer = cluster.oidc_issuer.ok_or_else(|| {
            ReconcileError::resolution(cluster_name, "describe cluster missing OIDC information")
        })?;
        info!("Cluster {} uses OIDC issuer {}", cluster_name, issuer);
        Ok(issuer)
    }
}
