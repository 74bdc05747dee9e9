//! AWS SDK configuration loading

use aws_config::{BehaviorVersion, Region, SdkConfig};
use log::info;

/// Load SDK configuration from the standard credential provider chain, pinned to `region`.
///
/// A non-empty `endpoint` overrides the service endpoints, e.g. for LocalStack.
pub async fn load_sdk_config(region: &str, endpoint: Option<&str>) -> SdkConfig {
    let mut builder =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));

    if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
        info!("Using custom AWS endpoint {}", endpoint);
        builder = builder.endpoint_url(endpoint);
    }

    builder.load().await
}
