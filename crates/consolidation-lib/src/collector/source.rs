//! Kubernetes API backed resource source

use super::ResourceSource;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Event, Node, Pod};
use kube::api::{Api, ListParams};
use tracing::debug;

/// Lists nodes, pods and node events through a `kube::Client`
#[derive(Clone)]
pub struct KubeResourceSource {
    client: kube::Client,
}

impl KubeResourceSource {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceSource for KubeResourceSource {
    async fn list_nodes(&self, selector: Option<&str>) -> Result<Vec<Node>, kube::Error> {
        let api: Api<Node> = Api::all(self.client.clone());
        let mut params = ListParams::default();
        if let Some(selector) = selector.filter(|s| !s.is_empty()) {
            params = params.labels(selector);
        }

        let list = api.list(&params).await?;
        debug!(count = list.items.len(), "Listed nodes");
        Ok(list.items)
    }

    async fn list_all_pods(&self) -> Result<Vec<Pod>, kube::Error> {
        let api: Api<Pod> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        debug!(count = list.items.len(), "Listed pods");
        Ok(list.items)
    }

    async fn list_node_events(&self) -> Result<Vec<Event>, kube::Error> {
        let api: Api<Event> = Api::all(self.client.clone());
        let params = ListParams::default().fields("involvedObject.kind=Node");
        let list = api.list(&params).await?;
        debug!(count = list.items.len(), "Listed node events");
        Ok(list.items)
    }
}
