//! Consolidation blocker detection
//!
//! Blockers come from three places: node utilization above a fixed threshold,
//! Karpenter opt-out annotations on pods, and the free-text messages of
//! Karpenter events recorded against the node.

use crate::karpenter::labels::{
    ANNOTATION_DO_NOT_CONSOLIDATE, ANNOTATION_DO_NOT_DISRUPT, ANNOTATION_DO_NOT_EVICT,
};
use crate::models::BlockerType;
use k8s_openapi::api::core::v1::{Event, Pod};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

/// Percentage at or above which a node is considered too busy to consolidate
pub const HIGH_UTILIZATION_THRESHOLD: u64 = 80;

/// Event reasons Karpenter emits when it declines to consolidate
const CONSOLIDATION_REASONS: [&str; 3] = [
    "CannotConsolidate",
    "DeprovisioningBlocked",
    "DisruptionBlocked",
];

/// Message fragments that mark an event as consolidation-related
const CONSOLIDATION_KEYWORDS: [&str; 3] = ["consolidat", "deprovision", "disrupt"];

/// Annotations checked in priority order
const POD_ANNOTATIONS: [(&str, BlockerType); 3] = [
    (ANNOTATION_DO_NOT_EVICT, BlockerType::DoNotEvict),
    (ANNOTATION_DO_NOT_DISRUPT, BlockerType::DoNotDisrupt),
    (ANNOTATION_DO_NOT_CONSOLIDATE, BlockerType::DoNotConsolidate),
];

static MESSAGE_PATTERNS: OnceLock<Vec<(Regex, BlockerType)>> = OnceLock::new();
static POD_REFERENCE: OnceLock<Regex> = OnceLock::new();

/// Message patterns in match order. Messages are lower-cased before matching.
fn message_patterns() -> &'static [(Regex, BlockerType)] {
    MESSAGE_PATTERNS.get_or_init(|| {
        [
            (r"pdb.*prevent", BlockerType::PdbViolation),
            (r"local storage", BlockerType::LocalStorage),
            (r"non-replicated", BlockerType::NonReplicated),
            (r"would increase cost", BlockerType::WouldIncreaseCost),
            (r"in-use security group", BlockerType::InUseSecurityGroup),
            (r"on-demand", BlockerType::OnDemandProtection),
            (r"do-not-consolidate", BlockerType::DoNotConsolidate),
            (r"do-not-disrupt", BlockerType::DoNotDisrupt),
            (r"do-not-evict", BlockerType::DoNotEvict),
        ]
        .into_iter()
        .map(|(pattern, blocker)| {
            (
                Regex::new(pattern).expect("static blocker pattern must compile"),
                blocker,
            )
        })
        .collect()
    })
}

fn pod_reference() -> &'static Regex {
    POD_REFERENCE
        .get_or_init(|| Regex::new(r#"Pod "([^"]+)""#).expect("static pod pattern must compile"))
}

/// Check whether a pod carries an annotation that blocks consolidation.
///
/// Only the literal value `"true"` counts; do-not-evict wins over
/// do-not-disrupt, which wins over do-not-consolidate.
pub fn detect_pod_blocker(pod: &Pod) -> Option<BlockerType> {
    let annotations = pod.metadata.annotations.as_ref()?;

    POD_ANNOTATIONS
        .iter()
        .find(|(key, _)| annotations.get(*key).is_some_and(|v| v == "true"))
        .map(|(_, blocker)| *blocker)
}

/// Map a verbose Karpenter event message to a blocker type
pub fn normalize_event_message(message: &str) -> Option<BlockerType> {
    if message.is_empty() {
        return None;
    }

    let lower = message.to_lowercase();
    message_patterns()
        .iter()
        .find(|(pattern, _)| pattern.is_match(&lower))
        .map(|(_, blocker)| *blocker)
}

fn is_consolidation_event(event: &Event) -> bool {
    let reason = event.reason.as_deref().unwrap_or_default();
    if CONSOLIDATION_REASONS.contains(&reason) {
        return true;
    }

    let message = event.message.as_deref().unwrap_or_default().to_lowercase();
    CONSOLIDATION_KEYWORDS.iter().any(|k| message.contains(k))
}

/// Extract the `namespace/name` (or bare name) quoted after `Pod ` in a message
fn extract_pod_reference(message: &str) -> Option<&str> {
    pod_reference()
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Collect the deduplicated set of blockers for one node.
///
/// `existing_pod_names` holds `namespace/name` keys of the pods currently on
/// the node; events naming any other pod are stale and ignored.
pub fn detect_blockers(
    pods: &[Pod],
    events: &[Event],
    cpu_percent: u64,
    mem_percent: u64,
    existing_pod_names: &HashSet<String>,
) -> BTreeSet<BlockerType> {
    let mut blockers = BTreeSet::new();

    if cpu_percent >= HIGH_UTILIZATION_THRESHOLD || mem_percent >= HIGH_UTILIZATION_THRESHOLD {
        blockers.insert(BlockerType::HighUtilization);
    }

    blockers.extend(pods.iter().filter_map(detect_pod_blocker));

    for event in events.iter().filter(|e| is_consolidation_event(e)) {
        let message = event.message.as_deref().unwrap_or_default();

        if let Some(pod) = extract_pod_reference(message) {
            if !existing_pod_names.contains(pod) {
                continue;
            }
        }

        blockers.extend(normalize_event_message(message));
    }

    blockers
}

/// Render a blocker set for display, `<none>` when empty
pub fn format_blockers(blockers: &BTreeSet<BlockerType>) -> String {
    if blockers.is_empty() {
        return "<none>".to_string();
    }

    blockers
        .iter()
        .map(BlockerType::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pod_with_annotations(annotations: serde_json::Value) -> Pod {
        serde_json::from_value(json!({
            "metadata": {
                "name": "test-pod",
                "namespace": "default",
                "annotations": annotations
            }
        }))
        .unwrap()
    }

    fn event(reason: &str, message: &str) -> Event {
        serde_json::from_value(json!({
            "metadata": { "name": "evt", "namespace": "default" },
            "involvedObject": { "kind": "Node", "name": "node-1" },
            "reason": reason,
            "message": message
        }))
        .unwrap()
    }

    #[test]
    fn test_detect_pod_blocker() {
        let bare: Pod = serde_json::from_value(json!({
            "metadata": { "name": "test-pod" }
        }))
        .unwrap();
        assert_eq!(detect_pod_blocker(&bare), None);

        let cases = [
            (ANNOTATION_DO_NOT_EVICT, Some(BlockerType::DoNotEvict)),
            (ANNOTATION_DO_NOT_DISRUPT, Some(BlockerType::DoNotDisrupt)),
            (
                ANNOTATION_DO_NOT_CONSOLIDATE,
                Some(BlockerType::DoNotConsolidate),
            ),
        ];
        for (key, expected) in cases {
            let pod = pod_with_annotations(json!({ key: "true" }));
            assert_eq!(detect_pod_blocker(&pod), expected, "{}", key);
        }
    }

    #[test]
    fn test_detect_pod_blocker_requires_literal_true() {
        for value in ["false", "True", "yes", ""] {
            let pod = pod_with_annotations(json!({ ANNOTATION_DO_NOT_EVICT: value }));
            assert_eq!(detect_pod_blocker(&pod), None, "{:?}", value);
        }
    }

    #[test]
    fn test_detect_pod_blocker_priority() {
        let pod = pod_with_annotations(json!({
            ANNOTATION_DO_NOT_CONSOLIDATE: "true",
            ANNOTATION_DO_NOT_DISRUPT: "true",
            ANNOTATION_DO_NOT_EVICT: "true",
        }));
        assert_eq!(detect_pod_blocker(&pod), Some(BlockerType::DoNotEvict));

        let pod = pod_with_annotations(json!({
            ANNOTATION_DO_NOT_CONSOLIDATE: "true",
            ANNOTATION_DO_NOT_DISRUPT: "true",
        }));
        assert_eq!(detect_pod_blocker(&pod), Some(BlockerType::DoNotDisrupt));
    }

    #[test]
    fn test_normalize_event_message() {
        let cases = [
            ("", None),
            ("unrelated text", None),
            (
                "Cannot consolidate node because PDB would prevent eviction",
                Some(BlockerType::PdbViolation),
            ),
            (
                "Pod uses local storage and cannot be moved",
                Some(BlockerType::LocalStorage),
            ),
            (
                "Cannot disrupt: pod is non-replicated",
                Some(BlockerType::NonReplicated),
            ),
            (
                "Consolidation would increase cost",
                Some(BlockerType::WouldIncreaseCost),
            ),
            (
                "Node has in-use security group",
                Some(BlockerType::InUseSecurityGroup),
            ),
            (
                "Cannot replace On-Demand node with spot",
                Some(BlockerType::OnDemandProtection),
            ),
            (
                "Pod has do-not-consolidate annotation",
                Some(BlockerType::DoNotConsolidate),
            ),
            (
                "Pod has DO-NOT-DISRUPT annotation",
                Some(BlockerType::DoNotDisrupt),
            ),
            ("pod has do-not-evict set", Some(BlockerType::DoNotEvict)),
        ];

        for (message, expected) in cases {
            assert_eq!(normalize_event_message(message), expected, "{:?}", message);
        }
    }

    #[test]
    fn test_normalize_first_pattern_wins() {
        // Matches both pdb and on-demand; pdb comes first
        let message = "PDB would prevent eviction of on-demand pod";
        assert_eq!(
            normalize_event_message(message),
            Some(BlockerType::PdbViolation)
        );
    }

    #[test]
    fn test_detect_blockers_utilization() {
        let names = HashSet::new();

        let high = detect_blockers(&[], &[], 85, 50, &names);
        assert_eq!(high, BTreeSet::from([BlockerType::HighUtilization]));

        let high_mem = detect_blockers(&[], &[], 10, 80, &names);
        assert_eq!(high_mem, BTreeSet::from([BlockerType::HighUtilization]));

        let low = detect_blockers(&[], &[], 50, 50, &names);
        assert!(low.is_empty());
    }

    #[test]
    fn test_detect_blockers_deduplicates() {
        let pods = vec![
            pod_with_annotations(json!({ ANNOTATION_DO_NOT_EVICT: "true" })),
            pod_with_annotations(json!({ ANNOTATION_DO_NOT_EVICT: "true" })),
        ];
        let events = vec![event("DisruptionBlocked", "Pod has do-not-evict annotation")];

        let blockers = detect_blockers(&pods, &events, 90, 90, &HashSet::new());
        assert_eq!(
            blockers,
            BTreeSet::from([BlockerType::HighUtilization, BlockerType::DoNotEvict])
        );
    }

    #[test]
    fn test_detect_blockers_is_idempotent() {
        let pods = vec![pod_with_annotations(
            json!({ ANNOTATION_DO_NOT_DISRUPT: "true" }),
        )];
        let events = vec![event("CannotConsolidate", "would increase cost")];
        let names = HashSet::new();

        let first = detect_blockers(&pods, &events, 81, 20, &names);
        let second = detect_blockers(&pods, &events, 81, 20, &names);
        assert_eq!(first, second);
    }

    #[test]
    fn test_detect_blockers_ignores_unrelated_events() {
        let events = vec![event("NodeReady", "PDB would prevent eviction")];
        let blockers = detect_blockers(&[], &events, 0, 0, &HashSet::new());
        assert!(blockers.is_empty());
    }

    #[test]
    fn test_detect_blockers_keyword_qualifies_event() {
        let events = vec![event("Unconsolidatable", "Cannot consolidate: local storage")];
        let blockers = detect_blockers(&[], &events, 0, 0, &HashSet::new());
        assert_eq!(blockers, BTreeSet::from([BlockerType::LocalStorage]));
    }

    #[test]
    fn test_detect_blockers_skips_stale_pod_events() {
        let events = vec![event(
            "DisruptionBlocked",
            r#"Cannot disrupt Node: Pod "default/gone" has "karpenter.sh/do-not-disrupt" annotation"#,
        )];

        let blockers = detect_blockers(&[], &events, 0, 0, &HashSet::new());
        assert!(blockers.is_empty());

        let names = HashSet::from(["default/gone".to_string()]);
        let blockers = detect_blockers(&[], &events, 0, 0, &names);
        assert_eq!(blockers, BTreeSet::from([BlockerType::DoNotDisrupt]));
    }

    #[test]
    fn test_format_blockers() {
        assert_eq!(format_blockers(&BTreeSet::new()), "<none>");

        let set = BTreeSet::from([BlockerType::PdbViolation, BlockerType::HighUtilization]);
        assert_eq!(format_blockers(&set), "high-utilization,pdb-violation");
    }
}
