use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::PayloadError;
use super::graph::{GraphData, Link, LinkKind, Node, NodeKind, TypeStats};

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawPayload {
    #[serde(default)]
    pub(super) nodes: Vec<RawNode>,
    #[serde(default)]
    pub(super) links: Vec<RawLink>,
    #[serde(default)]
    pub(super) stats: Option<RawStats>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawNode {
    pub(super) id: String,
    #[serde(rename = "type")]
    pub(super) kind: String,
    #[serde(default)]
    pub(super) label: String,
    #[serde(default)]
    pub(super) data: Value,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawLink {
    pub(super) id: String,
    pub(super) source: String,
    pub(super) target: String,
    #[serde(rename = "type")]
    pub(super) kind: String,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub(super) struct RawStats {
    #[serde(default, rename = "entity-record")]
    entity_record: u64,
    #[serde(default)]
    person: u64,
    #[serde(default)]
    collection: u64,
    #[serde(default)]
    label: u64,
}

impl From<RawStats> for TypeStats {
    fn from(raw: RawStats) -> Self {
        Self {
            entity_record: raw.entity_record,
            person: raw.person,
            collection: raw.collection,
            label: raw.label,
        }
    }
}

impl TryFrom<RawNode> for Node {
    type Error = PayloadError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let kind = NodeKind::from_wire(&raw.kind).ok_or_else(|| PayloadError::UnknownNodeType {
            id: raw.id.clone(),
            kind: raw.kind.clone(),
        })?;

        let label = if raw.label.trim().is_empty() {
            raw.id.clone()
        } else {
            raw.label
        };

        Ok(Node {
            id: raw.id,
            kind,
            label,
            data: raw.data,
        })
    }
}

impl TryFrom<RawLink> for Link {
    type Error = PayloadError;

    fn try_from(raw: RawLink) -> Result<Self, Self::Error> {
        let kind = LinkKind::from_wire(&raw.kind).ok_or_else(|| PayloadError::UnknownLinkType {
            id: raw.id.clone(),
            kind: raw.kind.clone(),
        })?;

        Ok(Link {
            id: raw.id,
            source: raw.source,
            target: raw.target,
            kind,
        })
    }
}

pub fn parse_payload(raw: &str) -> Result<GraphData, PayloadError> {
    let payload: RawPayload = serde_json::from_str(raw)?;
    Ok(decode_payload(payload))
}

pub(super) fn decode_payload(payload: RawPayload) -> GraphData {
    let mut quarantined = 0usize;
    let mut seen_ids = HashSet::with_capacity(payload.nodes.len());
    let mut nodes = Vec::with_capacity(payload.nodes.len());

    for raw in payload.nodes {
        match Node::try_from(raw) {
            Ok(node) => {
                if seen_ids.insert(node.id.clone()) {
                    nodes.push(node);
                } else {
                    warn!(id = %node.id, "duplicate node id in payload, keeping first occurrence");
                }
            }
            Err(error) => {
                warn!(%error, "quarantined node");
                quarantined += 1;
            }
        }
    }

    let mut seen_links = HashSet::with_capacity(payload.links.len());
    let mut links = Vec::with_capacity(payload.links.len());
    for raw in payload.links {
        match Link::try_from(raw) {
            Ok(link) => {
                if seen_links.insert(link.id.clone()) {
                    links.push(link);
                } else {
                    warn!(id = %link.id, "duplicate link id in payload, keeping first occurrence");
                }
            }
            Err(error) => {
                warn!(%error, "quarantined link");
                quarantined += 1;
            }
        }
    }

    let unresolved = links
        .iter()
        .filter(|link| !seen_ids.contains(&link.source) || !seen_ids.contains(&link.target))
        .count();
    if unresolved > 0 {
        debug!(unresolved, "links with unresolved endpoints will not be displayed");
    }

    let stats = payload
        .stats
        .map(TypeStats::from)
        .unwrap_or_else(|| TypeStats::from_nodes(&nodes));

    GraphData::new(nodes, links, stats, quarantined)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"{
        "nodes": [
            { "id": "m1", "type": "entity-record", "label": "Weekly sync", "data": { "id": "rec-1" } },
            { "id": "p1", "type": "person", "label": "Ada" },
            { "id": "f1", "type": "collection", "label": "Planning" },
            { "id": "t1", "type": "label", "label": "roadmap" }
        ],
        "links": [
            { "id": "m1-p1", "source": "m1", "target": "p1", "type": "relationship" },
            { "id": "m1-f1", "source": "m1", "target": "f1", "type": "relationship" },
            { "id": "m1-t1", "source": "m1", "target": "t1", "type": "reference" }
        ],
        "stats": { "entity-record": 1, "person": 1, "collection": 1, "label": 1 }
    }"#;

    #[test]
    fn parses_full_payload() {
        let graph = parse_payload(SCENARIO).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.link_count(), 3);
        assert_eq!(graph.quarantined, 0);
        assert_eq!(graph.stats.count(NodeKind::Collection), 1);
        assert_eq!(graph.node("m1").unwrap().record_id().as_deref(), Some("rec-1"));
        assert_eq!(graph.node("p1").unwrap().data, Value::Null);
        assert_eq!(graph.links[2].kind, LinkKind::Reference);
    }

    #[test]
    fn quarantines_unknown_types() {
        let raw = r#"{
            "nodes": [
                { "id": "m1", "type": "entity-record", "label": "A" },
                { "id": "x1", "type": "meeting-room", "label": "B" }
            ],
            "links": [
                { "id": "l1", "source": "m1", "target": "x1", "type": "relationship" },
                { "id": "l2", "source": "m1", "target": "x1", "type": "mentions" }
            ]
        }"#;
        let graph = parse_payload(raw).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.link_count(), 1);
        assert_eq!(graph.quarantined, 2);
    }

    #[test]
    fn computes_stats_when_missing_and_defaults_labels() {
        let raw = r#"{
            "nodes": [
                { "id": "p1", "type": "person", "label": "" },
                { "id": "p2", "type": "person", "label": "Grace" }
            ],
            "links": []
        }"#;
        let graph = parse_payload(raw).unwrap();
        assert_eq!(graph.stats.count(NodeKind::Person), 2);
        assert_eq!(graph.node("p1").unwrap().label, "p1");
    }

    #[test]
    fn keeps_first_duplicate_node() {
        let raw = r#"{
            "nodes": [
                { "id": "p1", "type": "person", "label": "first" },
                { "id": "p1", "type": "label", "label": "second" }
            ]
        }"#;
        let graph = parse_payload(raw).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.nodes[0].label, "first");
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            parse_payload("{ nodes: "),
            Err(PayloadError::Json(_))
        ));
    }
}
