//! eks-iam-role service layer
//!
//! Holds the SDK-backed capability implementations and exposes the single reconcile
//! entry point used by the CLI.

use aws_sdk_eks::Client as EksClient;
use aws_sdk_iam::Client as IamClient;
use aws_sdk_sts::Client as StsClient;

use crate::aws::eks::EksClusterClient;
use crate::aws::iam_client::AwsIamClient;
use crate::aws::session::load_sdk_config;
use crate::aws::sts::StsIdentityClient;
use crate::error::ReconcileResult;
use crate::types::{ReconcileConfig, ReconcileReport};

/// Main service struct that holds AWS clients
pub struct EksIamRoleService {
    pub(crate) identity: StsIdentityClient,
    pub(crate) cluster: EksClusterClient,
    pub(crate) iam: AwsIamClient,
}

impl EksIamRoleService {
    /// Create a new service instance with AWS clients
    ///
    /// Credentials come from the default provider chain; `endpoint` overrides the
    /// service endpoints when set.
    pub async fn new(region: &str, endpoint: Option<&str>) -> Self {
        let config = load_sdk_config(region, endpoint).await;

        Self {
            identity: StsIdentityClient::new(StsClient::new(&config)),
            cluster: EksClusterClient::new(EksClient::new(&config)),
            iam: AwsIamClient::new(IamClient::new(&config)),
        }
    }

    pub async fn reconcile(&self, config: &ReconcileConfig) -> ReconcileResult<ReconcileReport> {
        super::reconcile::reconcile(&self.identity, &self.cluster, &self.iam, config).await
    }
}
