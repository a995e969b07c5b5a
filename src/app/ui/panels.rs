use eframe::egui::{self, Align, Context, Layout};
use tracing::info;

use crate::config::ViewSettings;
use crate::source::{GraphData, NodeKind};

use super::super::camera::Camera;
use super::super::filter::FilterState;
use super::super::highlight::SelectionState;
use super::super::interaction::InteractionMachine;
use super::super::physics::PhysicsConfig;
use super::super::simulation::SimulationController;
use super::super::{RenderGraph, ViewModel, default_canvas_rect};

impl ViewModel {
    pub(in crate::app) fn new(graph: GraphData, settings: &ViewSettings) -> Self {
        let filter = FilterState::with_kinds(settings.visible_kinds.iter().copied())
            .unwrap_or_default();

        Self {
            graph,
            filter,
            selection: SelectionState::default(),
            interaction: InteractionMachine::default(),
            simulation: SimulationController::default(),
            physics: PhysicsConfig::default(),
            camera: Camera::default(),
            show_labels: settings.show_labels,
            search: String::new(),
            graph_dirty: true,
            render_graph_revision: 0,
            render: RenderGraph::default(),
            search_match_cache: None,
            canvas_rect: default_canvas_rect(),
            pending_navigation: None,
            status: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        egui::TopBottomPanel::top("toolbar")
            .resizable(false)
            .show(ctx, |ui| self.draw_toolbar(ui, reload_requested, is_reloading));

        egui::TopBottomPanel::bottom("stats")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(self.stats_text());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.visible_graph_text());
                    });
                });
            });

        egui::SidePanel::left("legend")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                self.draw_legend(ui);
                ui.separator();
                self.draw_physics_tuning(ui);
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }

    /// Swaps in a freshly loaded payload. Filters, labels and the camera survive;
    /// layout, pins, selection and gesture memory start over.
    pub(in crate::app) fn replace_graph(&mut self, graph: GraphData) {
        info!(
            nodes = graph.node_count(),
            links = graph.link_count(),
            hidden = self.filter.hidden_count(),
            "graph refreshed"
        );

        self.graph = graph;
        self.render = RenderGraph::default();
        self.selection.clear();
        self.interaction.reset();
        self.simulation = SimulationController::default();
        self.pending_navigation = None;
        self.search_match_cache = None;
        self.graph_dirty = true;
        self.status = Some("Graph refreshed".to_owned());
    }

    pub(in crate::app) fn hide_node(&mut self, id: &str) {
        if self.filter.hide_node(id) {
            info!(%id, "node hidden");
            self.graph_dirty = true;
        }
    }

    pub(in crate::app) fn show_all_hidden(&mut self) {
        if self.filter.show_all_hidden() {
            info!("hidden nodes restored");
            self.graph_dirty = true;
        }
    }

    pub(in crate::app) fn toggle_kind(&mut self, kind: NodeKind) {
        if self.filter.toggle_kind(kind) {
            self.graph_dirty = true;
        } else {
            self.status = Some("At least one node type must stay visible".to_owned());
        }
    }

    pub(in crate::app) fn freeze(&mut self) {
        if self.simulation.freeze() {
            for node in self.render.all_nodes_mut() {
                node.velocity = egui::Vec2::ZERO;
            }
        }
    }

    pub(in crate::app) fn resume(&mut self, now: f64) {
        let unpinned = self.simulation.resume(now, self.render.all_nodes_mut());
        if unpinned > 0 {
            self.status = Some(format!("Released {unpinned} pinned nodes"));
        }
    }

    fn stats_text(&self) -> String {
        let stats = &self.graph.stats;
        let mut text = NodeKind::ALL
            .iter()
            .map(|&kind| format!("{}: {}", kind.display_name(), stats.count(kind)))
            .collect::<Vec<_>>()
            .join("  |  ");
        if self.graph.quarantined > 0 {
            text.push_str(&format!("  |  quarantined: {}", self.graph.quarantined));
        }
        text
    }

    pub(in crate::app) fn visible_graph_text(&self) -> String {
        format!(
            "showing {} / {} nodes, {} / {} links",
            self.render.nodes.len(),
            self.graph.node_count(),
            self.render.links.len(),
            self.graph.link_count()
        )
    }
}
