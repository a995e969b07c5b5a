use std::collections::HashMap;

use eframe::egui::Color32;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    EntityRecord,
    Person,
    Collection,
    Label,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::EntityRecord,
        NodeKind::Person,
        NodeKind::Collection,
        NodeKind::Label,
    ];

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "entity-record" => Some(Self::EntityRecord),
            "person" => Some(Self::Person),
            "collection" => Some(Self::Collection),
            "label" => Some(Self::Label),
            _ => None,
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            Self::EntityRecord => "entity-record",
            Self::Person => "person",
            Self::Collection => "collection",
            Self::Label => "label",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::EntityRecord => "Records",
            Self::Person => "People",
            Self::Collection => "Collections",
            Self::Label => "Labels",
        }
    }

    pub fn color(self) -> Color32 {
        match self {
            Self::EntityRecord => Color32::from_rgb(99, 141, 255),
            Self::Person => Color32::from_rgb(72, 196, 140),
            Self::Collection => Color32::from_rgb(241, 170, 76),
            Self::Label => Color32::from_rgb(196, 120, 232),
        }
    }

    /// World-space radius before zoom scaling.
    pub fn base_radius(self) -> f32 {
        match self {
            Self::EntityRecord => 11.0,
            Self::Person => 9.0,
            Self::Collection => 10.0,
            Self::Label => 6.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Relationship,
    Reference,
}

impl LinkKind {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "relationship" => Some(Self::Relationship),
            "reference" => Some(Self::Reference),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub data: Value,
}

impl Node {
    /// Domain id used when opening the entity view; accepts string or numeric ids.
    pub fn record_id(&self) -> Option<String> {
        match self.data.get("id")? {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: LinkKind,
}

impl Link {
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    pub fn opposite(&self, node_id: &str) -> Option<&str> {
        if self.source == node_id {
            Some(self.target.as_str())
        } else if self.target == node_id {
            Some(self.source.as_str())
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TypeStats {
    pub entity_record: u64,
    pub person: u64,
    pub collection: u64,
    pub label: u64,
}

impl TypeStats {
    pub fn count(&self, kind: NodeKind) -> u64 {
        match kind {
            NodeKind::EntityRecord => self.entity_record,
            NodeKind::Person => self.person,
            NodeKind::Collection => self.collection,
            NodeKind::Label => self.label,
        }
    }

    pub fn from_nodes(nodes: &[Node]) -> Self {
        let mut stats = Self::default();
        for node in nodes {
            let slot = match node.kind {
                NodeKind::EntityRecord => &mut stats.entity_record,
                NodeKind::Person => &mut stats.person,
                NodeKind::Collection => &mut stats.collection,
                NodeKind::Label => &mut stats.label,
            };
            *slot += 1;
        }
        stats
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub stats: TypeStats,
    /// Records dropped at the payload boundary because of an unknown type value.
    pub quarantined: usize,
    index_by_id: HashMap<String, usize>,
    /// Links touching each node, aligned with `nodes`.
    degrees: Vec<usize>,
}

impl GraphData {
    /// Builds the graph and its id index; node ids are expected to be unique.
    pub fn new(nodes: Vec<Node>, links: Vec<Link>, stats: TypeStats, quarantined: usize) -> Self {
        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect::<HashMap<_, _>>();

        let mut degrees = vec![0usize; nodes.len()];
        for link in &links {
            if let Some(&source) = index_by_id.get(&link.source) {
                degrees[source] += 1;
            }
            if link.target != link.source
                && let Some(&target) = index_by_id.get(&link.target)
            {
                degrees[target] += 1;
            }
        }

        Self {
            nodes,
            links,
            stats,
            quarantined,
            index_by_id,
            degrees,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_by_id
            .get(id)
            .and_then(|&index| self.nodes.get(index))
    }

    /// Display label for `id`, falling back to the id itself.
    pub fn label_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.node(id).map_or(id, |node| node.label.as_str())
    }

    /// Number of links touching `id`, counted once at load.
    pub fn degree(&self, id: &str) -> usize {
        self.index_by_id
            .get(id)
            .and_then(|&index| self.degrees.get(index))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn node(id: &str, kind: NodeKind, data: Value) -> Node {
        Node {
            id: id.to_owned(),
            kind,
            label: id.to_uppercase(),
            data,
        }
    }

    #[test]
    fn wire_names_round_trip_through_from_wire() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_wire(kind.wire_name()), Some(kind));
        }
        assert_eq!(NodeKind::from_wire("meeting"), None);
        assert_eq!(LinkKind::from_wire("reference"), Some(LinkKind::Reference));
        assert_eq!(LinkKind::from_wire("soft"), None);
    }

    #[test]
    fn record_id_accepts_strings_and_numbers() {
        assert_eq!(
            node("m1", NodeKind::EntityRecord, json!({ "id": "rec-7" })).record_id(),
            Some("rec-7".to_owned())
        );
        assert_eq!(
            node("m2", NodeKind::EntityRecord, json!({ "id": 42 })).record_id(),
            Some("42".to_owned())
        );
        assert_eq!(node("m3", NodeKind::EntityRecord, Value::Null).record_id(), None);
        assert_eq!(
            node("m4", NodeKind::EntityRecord, json!({ "id": "" })).record_id(),
            None
        );
    }

    #[test]
    fn link_opposite_endpoint() {
        let link = Link {
            id: "l1".to_owned(),
            source: "a".to_owned(),
            target: "b".to_owned(),
            kind: LinkKind::Relationship,
        };
        assert_eq!(link.opposite("a"), Some("b"));
        assert_eq!(link.opposite("b"), Some("a"));
        assert_eq!(link.opposite("c"), None);
        assert!(link.touches("a"));
        assert!(!link.touches("c"));
    }

    #[test]
    fn lookups_and_degrees_come_from_the_index() {
        let link = |id: &str, source: &str, target: &str| Link {
            id: id.to_owned(),
            source: source.to_owned(),
            target: target.to_owned(),
            kind: LinkKind::Relationship,
        };
        let nodes = vec![
            node("m1", NodeKind::EntityRecord, Value::Null),
            node("p1", NodeKind::Person, Value::Null),
        ];
        let stats = TypeStats::from_nodes(&nodes);
        let graph = GraphData::new(
            nodes,
            vec![
                link("l1", "m1", "p1"),
                link("l2", "m1", "m1"),
                link("l3", "m1", "ghost"),
            ],
            stats,
            0,
        );

        assert_eq!(graph.node("p1").map(|node| node.kind), Some(NodeKind::Person));
        assert!(graph.node("ghost").is_none());
        assert_eq!(graph.label_of("p1"), "P1");
        assert_eq!(graph.label_of("ghost"), "ghost");
        assert_eq!(graph.degree("m1"), 3);
        assert_eq!(graph.degree("p1"), 1);
        assert_eq!(graph.degree("ghost"), 0);
    }

    #[test]
    fn stats_from_nodes_counts_each_kind() {
        let nodes = vec![
            node("m1", NodeKind::EntityRecord, Value::Null),
            node("m2", NodeKind::EntityRecord, Value::Null),
            node("p1", NodeKind::Person, Value::Null),
            node("t1", NodeKind::Label, Value::Null),
        ];
        let stats = TypeStats::from_nodes(&nodes);
        assert_eq!(stats.count(NodeKind::EntityRecord), 2);
        assert_eq!(stats.count(NodeKind::Person), 1);
        assert_eq!(stats.count(NodeKind::Collection), 0);
        assert_eq!(stats.count(NodeKind::Label), 1);
    }
}
