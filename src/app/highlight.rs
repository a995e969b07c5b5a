use std::collections::HashSet;

use crate::source::Link;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected: Option<String>,
    pub highlight_nodes: HashSet<String>,
    pub highlight_links: HashSet<String>,
}

impl SelectionState {
    pub fn is_active(&self) -> bool {
        self.selected.is_some()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    pub fn is_node_highlighted(&self, id: &str) -> bool {
        self.highlight_nodes.contains(id)
    }

    pub fn is_link_highlighted(&self, id: &str) -> bool {
        self.highlight_links.contains(id)
    }

    /// Highlighted ids other than the selection itself, sorted for stable display.
    pub fn neighbor_ids(&self) -> Vec<&str> {
        let mut ids = self
            .highlight_nodes
            .iter()
            .map(String::as_str)
            .filter(|id| !self.is_selected(id))
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.highlight_nodes.clear();
        self.highlight_links.clear();
    }
}

/// One-hop neighborhood of `node_id` over the full link list.
///
/// Must be given the unfiltered links so that selection does not depend on the
/// active type or hidden-node filter. Cost is a single pass over `links`.
pub fn select_node(node_id: &str, links: &[Link]) -> SelectionState {
    let mut highlight_nodes = HashSet::from([node_id.to_owned()]);
    let mut highlight_links = HashSet::new();

    for link in links {
        let Some(other) = link.opposite(node_id) else {
            continue;
        };
        highlight_nodes.insert(other.to_owned());
        highlight_links.insert(link.id.clone());
    }

    SelectionState {
        selected: Some(node_id.to_owned()),
        highlight_nodes,
        highlight_links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::filter::tests::scenario_graph;
    use crate::app::filter::{FilterState, filter_graph};
    use crate::source::{LinkKind, NodeKind};

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| (*id).to_owned()).collect()
    }

    #[test]
    fn scenario_selection_covers_every_neighbor() {
        let graph = scenario_graph();
        let selection = select_node("m1", &graph.links);

        assert_eq!(selection.selected.as_deref(), Some("m1"));
        assert_eq!(selection.highlight_nodes, set(&["m1", "p1", "f1", "t1"]));
        assert_eq!(
            selection.highlight_links,
            set(&["m1-p1", "m1-f1", "m1-t1"])
        );
        assert_eq!(selection.neighbor_ids(), ["f1", "p1", "t1"]);
    }

    #[test]
    fn selection_is_independent_of_the_active_filter() {
        let graph = scenario_graph();
        let filter = FilterState::with_kinds([NodeKind::EntityRecord, NodeKind::Person]).unwrap();
        let filtered = filter_graph(&graph, &filter);
        assert_eq!(filtered.links.len(), 1);

        for node in &graph.nodes {
            let selection = select_node(&node.id, &graph.links);
            let mut expected = HashSet::from([node.id.clone()]);
            for link in &graph.links {
                if link.source == node.id {
                    expected.insert(link.target.clone());
                }
                if link.target == node.id {
                    expected.insert(link.source.clone());
                }
            }
            assert_eq!(selection.highlight_nodes, expected, "{}", node.id);
        }
    }

    #[test]
    fn isolated_node_highlights_only_itself() {
        let graph = scenario_graph();
        let selection = select_node("lonely", &graph.links);
        assert_eq!(selection.highlight_nodes, set(&["lonely"]));
        assert!(selection.highlight_links.is_empty());
    }

    #[test]
    fn self_loop_is_highlighted_once() {
        let links = vec![Link {
            id: "loop".to_owned(),
            source: "a".to_owned(),
            target: "a".to_owned(),
            kind: LinkKind::Reference,
        }];
        let selection = select_node("a", &links);
        assert_eq!(selection.highlight_nodes, set(&["a"]));
        assert_eq!(selection.highlight_links, set(&["loop"]));
    }

    #[test]
    fn hiding_a_neighbor_keeps_prior_highlight() {
        let graph = scenario_graph();
        let mut filter = FilterState::with_kinds([NodeKind::EntityRecord, NodeKind::Person]).unwrap();
        let selection = select_node("m1", &graph.links);

        filter.hide_node("p1");
        let filtered = filter_graph(&graph, &filter);
        let shown = filtered.nodes.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
        assert_eq!(shown, ["m1"]);
        assert!(filtered.links.is_empty());

        assert_eq!(selection.highlight_nodes, set(&["m1", "p1", "f1", "t1"]));
        assert_eq!(selection.highlight_links.len(), 3);
    }

    #[test]
    fn clear_resets_both_sets() {
        let graph = scenario_graph();
        let mut selection = select_node("m1", &graph.links);
        selection.clear();
        assert!(!selection.is_active());
        assert!(selection.highlight_nodes.is_empty());
        assert!(selection.highlight_links.is_empty());
    }
}
