//! STS helpers for caller identity

use async_trait::async_trait;
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::Client as StsClient;

use crate::aws::{CallError, CallResult, IdentityApi};

/// Caller identity lookups backed by STS GetCallerIdentity
pub struct StsIdentityClient {
    client: StsClient,
}

impl StsIdentityClient {
    pub fn new(client: StsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityApi for StsIdentityClient {
    async fn caller_account_id(&self) -> CallResult<String> {
        let out = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| CallError::Other(DisplayErrorContext(&e).to_string()))?;
        out.account()
            .map(ToString::to_string)
            .ok_or_else(|| CallError::Other("STS GetCallerIdentity missing Account".to_string()))
    }
}
