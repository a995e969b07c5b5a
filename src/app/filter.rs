use std::collections::{BTreeSet, HashSet};

use crate::source::{GraphData, Link, Node, NodeKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterState {
    visible_kinds: BTreeSet<NodeKind>,
    hidden_node_ids: BTreeSet<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            visible_kinds: NodeKind::ALL.into_iter().collect(),
            hidden_node_ids: BTreeSet::new(),
        }
    }
}

impl FilterState {
    /// Returns `None` for an empty kind set.
    pub fn with_kinds(kinds: impl IntoIterator<Item = NodeKind>) -> Option<Self> {
        let visible_kinds = kinds.into_iter().collect::<BTreeSet<_>>();
        if visible_kinds.is_empty() {
            return None;
        }

        Some(Self {
            visible_kinds,
            hidden_node_ids: BTreeSet::new(),
        })
    }

    pub fn is_kind_visible(&self, kind: NodeKind) -> bool {
        self.visible_kinds.contains(&kind)
    }

    pub fn visible_kind_count(&self) -> usize {
        self.visible_kinds.len()
    }

    /// Flips one kind. Refuses to hide the last visible kind and returns `false` then.
    pub fn toggle_kind(&mut self, kind: NodeKind) -> bool {
        if self.visible_kinds.contains(&kind) {
            if self.visible_kinds.len() == 1 {
                return false;
            }
            self.visible_kinds.remove(&kind);
        } else {
            self.visible_kinds.insert(kind);
        }
        true
    }

    pub fn hide_node(&mut self, id: &str) -> bool {
        self.hidden_node_ids.insert(id.to_owned())
    }

    pub fn show_all_hidden(&mut self) -> bool {
        let changed = !self.hidden_node_ids.is_empty();
        self.hidden_node_ids.clear();
        changed
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden_node_ids.len()
    }

    pub fn node_passes(&self, node: &Node) -> bool {
        self.visible_kinds.contains(&node.kind) && !self.hidden_node_ids.contains(&node.id)
    }
}

#[derive(Clone, Debug, Default)]
pub struct FilteredGraph<'a> {
    pub nodes: Vec<&'a Node>,
    pub links: Vec<&'a Link>,
}

impl FilteredGraph<'_> {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Owned copy of the filtered graph, with stats recomputed for the kept nodes.
    #[cfg(test)]
    pub fn to_graph(&self) -> GraphData {
        let nodes = self.nodes.iter().map(|&node| node.clone()).collect::<Vec<_>>();
        let stats = crate::source::TypeStats::from_nodes(&nodes);
        let links = self.links.iter().map(|&link| link.clone()).collect();
        GraphData::new(nodes, links, stats, 0)
    }
}

pub fn filter_graph<'a>(graph: &'a GraphData, filter: &FilterState) -> FilteredGraph<'a> {
    let nodes = graph
        .nodes
        .iter()
        .filter(|node| filter.node_passes(node))
        .collect::<Vec<_>>();

    let passing = nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();

    let links = graph
        .links
        .iter()
        .filter(|link| {
            passing.contains(link.source.as_str()) && passing.contains(link.target.as_str())
        })
        .collect();

    FilteredGraph { nodes, links }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;
    use crate::source::{LinkKind, TypeStats};

    pub(crate) fn scenario_graph() -> GraphData {
        let node = |id: &str, kind: NodeKind| Node {
            id: id.to_owned(),
            kind,
            label: id.to_owned(),
            data: json!({ "id": format!("rec-{id}") }),
        };
        let link = |source: &str, target: &str, kind: LinkKind| Link {
            id: format!("{source}-{target}"),
            source: source.to_owned(),
            target: target.to_owned(),
            kind,
        };

        let nodes = vec![
            node("m1", NodeKind::EntityRecord),
            node("p1", NodeKind::Person),
            node("f1", NodeKind::Collection),
            node("t1", NodeKind::Label),
        ];
        let stats = TypeStats::from_nodes(&nodes);
        let links = vec![
            link("m1", "p1", LinkKind::Relationship),
            link("m1", "f1", LinkKind::Relationship),
            link("m1", "t1", LinkKind::Reference),
        ];
        GraphData::new(nodes, links, stats, 0)
    }

    fn node_ids(filtered: &FilteredGraph<'_>) -> Vec<String> {
        filtered.nodes.iter().map(|node| node.id.clone()).collect()
    }

    fn link_ids(filtered: &FilteredGraph<'_>) -> Vec<String> {
        filtered.links.iter().map(|link| link.id.clone()).collect()
    }

    fn all_filters() -> Vec<FilterState> {
        let mut filters = Vec::new();
        for mask in 1u8..16 {
            let kinds = NodeKind::ALL
                .into_iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, kind)| kind);
            let base = FilterState::with_kinds(kinds).unwrap();
            for hidden in [None, Some("m1"), Some("p1"), Some("t1")] {
                let mut filter = base.clone();
                if let Some(id) = hidden {
                    filter.hide_node(id);
                }
                filters.push(filter);
            }
        }
        filters
    }

    #[test]
    fn scenario_filters_to_records_and_people() {
        let graph = scenario_graph();
        let filter =
            FilterState::with_kinds([NodeKind::EntityRecord, NodeKind::Person]).unwrap();

        let filtered = filter_graph(&graph, &filter);
        assert_eq!(node_ids(&filtered), ["m1", "p1"]);
        assert_eq!(link_ids(&filtered), ["m1-p1"]);
    }

    #[test]
    fn displayed_links_always_have_displayed_endpoints() {
        let mut graph = scenario_graph();
        graph.links.push(Link {
            id: "dangling".to_owned(),
            source: "m1".to_owned(),
            target: "ghost".to_owned(),
            kind: LinkKind::Relationship,
        });

        for filter in all_filters() {
            let filtered = filter_graph(&graph, &filter);
            let shown = node_ids(&filtered);
            for link in &filtered.links {
                assert!(shown.contains(&link.source), "{filter:?}");
                assert!(shown.contains(&link.target), "{filter:?}");
            }
            assert!(!link_ids(&filtered).contains(&"dangling".to_owned()));
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let graph = scenario_graph();
        for filter in all_filters() {
            let once = filter_graph(&graph, &filter);
            let materialized = once.to_graph();
            let twice = filter_graph(&materialized, &filter);
            assert_eq!(node_ids(&once), node_ids(&twice));
            assert_eq!(link_ids(&once), link_ids(&twice));
        }
    }

    #[test]
    fn filter_excluding_present_kinds_is_empty() {
        let scenario = scenario_graph();
        let nodes = scenario
            .nodes
            .into_iter()
            .filter(|node| node.kind != NodeKind::Collection)
            .collect();
        let graph = GraphData::new(nodes, scenario.links, scenario.stats, 0);
        let filter = FilterState::with_kinds([NodeKind::Collection]).unwrap();

        let filtered = filter_graph(&graph, &filter);
        assert!(filtered.is_empty());
        assert!(filtered.links.is_empty());
    }

    #[test]
    fn hidden_nodes_drop_their_links() {
        let graph = scenario_graph();
        let mut filter = FilterState::default();
        filter.hide_node("f1");

        let filtered = filter_graph(&graph, &filter);
        assert_eq!(node_ids(&filtered), ["m1", "p1", "t1"]);
        assert_eq!(link_ids(&filtered), ["m1-p1", "m1-t1"]);

        assert!(filter.show_all_hidden());
        assert!(!filter.show_all_hidden());
        assert_eq!(filter_graph(&graph, &filter).nodes.len(), 4);
    }

    #[test]
    fn last_visible_kind_cannot_be_toggled_off() {
        let mut filter = FilterState::with_kinds([NodeKind::Person]).unwrap();
        assert!(!filter.toggle_kind(NodeKind::Person));
        assert!(filter.is_kind_visible(NodeKind::Person));

        assert!(filter.toggle_kind(NodeKind::Label));
        assert!(filter.toggle_kind(NodeKind::Person));
        assert_eq!(filter.visible_kind_count(), 1);
        assert!(FilterState::with_kinds([]).is_none());
    }
}
