//! Karpenter CRD discovery

use super::labels::GROUP;
use super::version::ClusterCapabilities;
use crate::error::{Error, Result};
use tracing::{debug, warn};

/// Check which Karpenter CRDs the API server serves.
///
/// A failure listing API groups is returned as an error. A failure listing
/// the resources of a single Karpenter version is logged and skipped, so a
/// partially available aggregated API still yields the versions that answered.
pub async fn detect_capabilities(client: &kube::Client) -> Result<ClusterCapabilities> {
    let groups = client
        .list_api_groups()
        .await
        .map_err(|e| Error::fetch("api groups", e))?;

    let mut resources: Vec<(String, String)> = Vec::new();

    for group in groups.groups.iter().filter(|g| g.name == GROUP) {
        for version in &group.versions {
            match client.list_api_group_resources(&version.group_version).await {
                Ok(list) => {
                    resources.extend(
                        list.resources
                            .into_iter()
                            .map(|r| (list.group_version.clone(), r.name)),
                    );
                }
                Err(e) => {
                    warn!(
                        group_version = %version.group_version,
                        error = %e,
                        "Skipping unavailable Karpenter API version"
                    );
                }
            }
        }
    }

    let caps = ClusterCapabilities::from_resources(
        resources.iter().map(|(gv, name)| (gv.as_str(), name.as_str())),
    );
    debug!(?caps, "Detected Karpenter capabilities");

    Ok(caps)
}
