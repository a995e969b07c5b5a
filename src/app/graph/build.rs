use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Rect, Vec2, vec2};
use tracing::debug;

use crate::source::Node;
use crate::util::stable_pair;

use super::super::filter::filter_graph;
use super::super::{Ownership, RenderGraph, RenderLink, RenderNode, ViewModel};

impl RenderNode {
    fn spawn(node: &Node, index: usize, total: usize) -> Self {
        let (jx, jy) = stable_pair(&node.id);
        let angle = (index as f32 / total.max(1) as f32) * TAU;
        let ring = (total as f32).sqrt() * 34.0;

        Self {
            id: node.id.clone(),
            kind: node.kind,
            world_pos: vec2(angle.cos(), angle.sin()) * ring + vec2(jx, jy) * 24.0,
            velocity: Vec2::ZERO,
            ownership: Ownership::Simulated,
        }
    }
}

impl RenderGraph {
    pub(in crate::app) fn node_mut(&mut self, id: &str) -> Option<&mut RenderNode> {
        let index = *self.index_by_id.get(id)?;
        self.nodes.get_mut(index)
    }

    pub(in crate::app) fn node(&self, id: &str) -> Option<&RenderNode> {
        self.index_by_id
            .get(id)
            .and_then(|&index| self.nodes.get(index))
    }

    /// Every laid-out node, displayed or parked.
    pub(in crate::app) fn all_nodes_mut(&mut self) -> impl Iterator<Item = &mut RenderNode> {
        self.nodes.iter_mut().chain(self.parked.values_mut())
    }

    pub(in crate::app) fn world_bounds(&self) -> Option<Rect> {
        let (first, rest) = self.nodes.split_first()?;
        let start = Rect::from_center_size(first.world_pos.to_pos2(), Vec2::ZERO);
        Some(rest.iter().fold(start, |bounds, node| {
            bounds.union(Rect::from_center_size(node.world_pos.to_pos2(), Vec2::ZERO))
        }))
    }
}

impl ViewModel {
    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        self.render_graph_revision = self.render_graph_revision.wrapping_add(1);
        self.search_match_cache = None;

        let filtered = filter_graph(&self.graph, &self.filter);
        let render = &mut self.render;

        let mut prior = render
            .nodes
            .drain(..)
            .map(|node| (node.id.clone(), node))
            .collect::<HashMap<_, _>>();

        let total = filtered.nodes.len();
        let mut nodes = Vec::with_capacity(total);
        for (index, node) in filtered.nodes.iter().enumerate() {
            let render_node = prior
                .remove(&node.id)
                .or_else(|| render.parked.remove(&node.id))
                .map(|mut existing| {
                    existing.kind = node.kind;
                    existing
                })
                .unwrap_or_else(|| RenderNode::spawn(node, index, total));
            nodes.push(render_node);
        }

        for (id, mut node) in prior {
            if node.ownership == Ownership::Dragged {
                node.ownership = Ownership::Pinned;
            }
            node.velocity = Vec2::ZERO;
            render.parked.insert(id, node);
        }

        render.index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();
        render.nodes = nodes;

        let index_by_id = &render.index_by_id;
        render.links = filtered
            .links
            .iter()
            .filter_map(|link| {
                Some(RenderLink {
                    id: link.id.clone(),
                    source: *index_by_id.get(&link.source)?,
                    target: *index_by_id.get(&link.target)?,
                    kind: link.kind,
                })
            })
            .collect();

        if filtered.is_empty() && !self.graph.nodes.is_empty() {
            debug!("filters exclude every node");
        }
        debug!(
            nodes = render.nodes.len(),
            links = render.links.len(),
            parked = render.parked.len(),
            "rebuilt displayed graph"
        );

        self.simulation.restart();
        self.graph_dirty = false;
    }
}
