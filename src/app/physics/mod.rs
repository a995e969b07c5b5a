mod quadtree;

use eframe::egui::Vec2;

use super::{Ownership, RenderGraph};
use crate::source::LinkKind;
use quadtree::Cell;

const BARNES_HUT_THETA: f32 = 0.72;
const SOFTENING: f32 = 420.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct PhysicsConfig {
    pub(in crate::app) intensity: f32,
    pub(in crate::app) repulsion: f32,
    pub(in crate::app) spring: f32,
    pub(in crate::app) damping: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            repulsion: 1.0,
            spring: 1.0,
            damping: 0.86,
        }
    }
}

fn rest_length(kind: LinkKind, radius_sum: f32) -> f32 {
    match kind {
        LinkKind::Relationship => 70.0 + radius_sum * 2.5,
        LinkKind::Reference => 110.0 + radius_sum * 2.5,
    }
}

fn spring_weight(kind: LinkKind) -> f32 {
    match kind {
        LinkKind::Relationship => 1.0,
        LinkKind::Reference => 0.45,
    }
}

/// Advances the layout by one frame. Returns `true` while any simulated node still moves.
///
/// Nodes that are dragged or pinned take part in the force computation but keep
/// their position.
pub(in crate::app) fn step_physics(
    graph: &mut RenderGraph,
    config: PhysicsConfig,
    delta_seconds: f32,
) -> bool {
    let node_count = graph.nodes.len();
    if node_count == 0 {
        return false;
    }

    let intensity = config.intensity.clamp(0.2, 2.5);
    let repulsion = 52_000.0 * intensity * config.repulsion.clamp(0.25, 3.0);
    let spring = 0.02 * intensity * config.spring.clamp(0.2, 2.5);
    let center_pull = 0.0016 * intensity;
    let time_scale = (delta_seconds * 60.0).clamp(0.25, 3.0);
    let damping = config.damping.clamp(0.7, 0.97).powf(time_scale);
    let max_force = 140.0 + intensity * 80.0;
    let max_speed = 10.0 + intensity * 14.0;

    let scratch = &mut graph.physics_scratch;
    scratch.positions.clear();
    scratch
        .positions
        .extend(graph.nodes.iter().map(|node| node.world_pos));
    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);
    let positions = &scratch.positions;
    let forces = &mut scratch.forces;

    if node_count > 1
        && let Some(tree) = Cell::build(positions)
    {
        for (index, force) in forces.iter_mut().enumerate() {
            *force += tree.repulsion_on(index, positions, repulsion, SOFTENING, BARNES_HUT_THETA);
        }
    }

    for link in &graph.links {
        let (from, to) = (link.source, link.target);
        if from == to || from >= node_count || to >= node_count {
            continue;
        }

        let delta = positions[from] - positions[to];
        let distance = delta.length();
        if distance <= 0.000_1 {
            continue;
        }

        let radius_sum = graph.nodes[from].kind.base_radius() + graph.nodes[to].kind.base_radius();
        let stretch = distance - rest_length(link.kind, radius_sum);
        let correction = delta / distance * stretch * spring * spring_weight(link.kind);
        forces[from] -= correction;
        forces[to] += correction;
    }

    let mut any_motion = false;
    for (node, force) in graph.nodes.iter_mut().zip(forces.iter()) {
        if node.ownership != Ownership::Simulated {
            node.velocity = Vec2::ZERO;
            continue;
        }

        let mut force = *force - node.world_pos * center_pull;
        let force_length = force.length();
        if force_length > max_force {
            force *= max_force / force_length;
        }

        let mut velocity = (node.velocity + force * (0.06 * time_scale)) * damping;
        let speed = velocity.length();
        if speed > max_speed {
            velocity *= max_speed / speed;
        }
        if speed < 0.03 && force_length < 0.1 {
            velocity = Vec2::ZERO;
        }

        node.velocity = velocity;
        node.world_pos += velocity * time_scale;
        any_motion |= velocity.length_sq() > 0.000_4;
    }

    any_motion
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::app::{PhysicsScratch, RenderLink, RenderNode, ViewScratch};
    use crate::source::NodeKind;

    fn graph(positions: &[Vec2], ownership: Ownership) -> RenderGraph {
        let nodes = positions
            .iter()
            .enumerate()
            .map(|(index, &world_pos)| RenderNode {
                id: format!("n{index}"),
                kind: NodeKind::Person,
                world_pos,
                velocity: Vec2::ZERO,
                ownership,
            })
            .collect::<Vec<_>>();
        RenderGraph {
            index_by_id: nodes
                .iter()
                .enumerate()
                .map(|(index, node)| (node.id.clone(), index))
                .collect(),
            nodes,
            links: Vec::new(),
            parked: Default::default(),
            physics_scratch: PhysicsScratch::default(),
            view_scratch: ViewScratch::default(),
        }
    }

    #[test]
    fn close_nodes_repel() {
        let mut graph = graph(&[vec2(-5.0, 0.0), vec2(5.0, 0.0)], Ownership::Simulated);
        for _ in 0..30 {
            step_physics(&mut graph, PhysicsConfig::default(), 1.0 / 60.0);
        }
        let distance = (graph.nodes[0].world_pos - graph.nodes[1].world_pos).length();
        assert!(distance > 10.0);
    }

    #[test]
    fn stretched_link_pulls_endpoints_together() {
        let mut graph = graph(&[vec2(-800.0, 0.0), vec2(800.0, 0.0)], Ownership::Simulated);
        graph.links.push(RenderLink {
            id: "l".to_owned(),
            source: 0,
            target: 1,
            kind: LinkKind::Relationship,
        });
        for _ in 0..60 {
            step_physics(&mut graph, PhysicsConfig::default(), 1.0 / 60.0);
        }
        let distance = (graph.nodes[0].world_pos - graph.nodes[1].world_pos).length();
        assert!(distance < 1600.0);
    }

    #[test]
    fn pinned_and_dragged_nodes_keep_their_position() {
        let start = [vec2(-5.0, 0.0), vec2(5.0, 0.0)];
        let mut graph = graph(&start, Ownership::Pinned);
        graph.nodes[1].ownership = Ownership::Dragged;

        let moving = step_physics(&mut graph, PhysicsConfig::default(), 1.0 / 60.0);
        assert!(!moving);
        assert_eq!(graph.nodes[0].world_pos, start[0]);
        assert_eq!(graph.nodes[1].world_pos, start[1]);
    }

    #[test]
    fn lone_node_at_origin_settles_immediately() {
        let mut graph = graph(&[Vec2::ZERO], Ownership::Simulated);
        assert!(!step_physics(&mut graph, PhysicsConfig::default(), 1.0 / 60.0));
    }

    #[test]
    fn empty_graph_does_not_move() {
        let mut graph = graph(&[], Ownership::Simulated);
        assert!(!step_physics(&mut graph, PhysicsConfig::default(), 1.0 / 60.0));
    }
}
