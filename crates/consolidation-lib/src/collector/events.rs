//! Node event grouping

use k8s_openapi::api::core::v1::Event;
use std::collections::HashMap;

/// Group events by the name of the node they were recorded against
pub fn group_by_node(events: Vec<Event>) -> HashMap<String, Vec<Event>> {
    let mut by_node: HashMap<String, Vec<Event>> = HashMap::new();

    for event in events {
        let Some(name) = event.involved_object.name.clone() else {
            continue;
        };
        by_node.entry(name).or_default().push(event);
    }

    by_node
}
