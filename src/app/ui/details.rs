use eframe::egui::{self, RichText, Ui};

use crate::source::NodeKind;

use super::super::navigation::navigation_for;
use super::super::{Ownership, ViewModel};

/// One-hop neighbor of the selection as listed in the details panel.
#[derive(Clone, Debug, PartialEq, Eq)]
struct NeighborEntry {
    id: String,
    label: String,
    kind: NodeKind,
    in_view: bool,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selection.selected.clone() else {
            ui.label("Click a node to inspect it; double-click a record to open it.");
            return;
        };

        let Some(node) = self.graph.node(&selected_id) else {
            ui.label("Selected node no longer exists in the graph.");
            return;
        };

        let label = node.label.clone();
        let kind = node.kind;
        let navigation = navigation_for(node);
        let data = (!node.data.is_null())
            .then(|| serde_json::to_string_pretty(&node.data).unwrap_or_else(|_| node.data.to_string()));
        let ownership = self.render.node(&selected_id).map(|render| render.ownership);

        ui.label(RichText::new(label).strong().color(kind.color()));
        ui.small(selected_id.as_str());
        ui.add_space(4.0);
        ui.label(format!("Type: {}", kind.display_name()));
        match ownership {
            Some(Ownership::Pinned) => ui.label("Position: pinned"),
            Some(_) => ui.label("Position: simulated"),
            None => ui.label("Position: hidden by filters"),
        };

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if let Some(request) = navigation {
                if ui
                    .button("Open record")
                    .on_hover_text(format!("Open record {}", request.record_id))
                    .clicked()
                {
                    self.pending_navigation = Some(request);
                }
            }
            if ownership.is_some() && ui.button("Hide node").clicked() {
                self.hide_node(&selected_id);
            }
        });

        ui.separator();
        let neighbors = self.neighbor_entries();
        ui.label(RichText::new(format!("Connected nodes ({})", neighbors.len())).strong());
        if neighbors.is_empty() {
            ui.label("This node has no links.");
        } else {
            let mut clicked = None;
            egui::ScrollArea::vertical()
                .id_salt("neighbor_scroll")
                .max_height(260.0)
                .auto_shrink([false, true])
                .show_rows(ui, 20.0, neighbors.len(), |ui, rows| {
                    for entry in &neighbors[rows] {
                        let text = format!(
                            "{}  ({}){}",
                            entry.label,
                            entry.kind.display_name(),
                            if entry.in_view { "" } else { "  [hidden]" }
                        );
                        if ui.link(text).on_hover_text(entry.id.as_str()).clicked() {
                            clicked = Some(entry.id.clone());
                        }
                    }
                });
            if let Some(id) = clicked {
                self.set_selected(Some(id));
            }
        }

        if let Some(data) = data {
            ui.separator();
            ui.collapsing("Data", |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("data_scroll")
                    .max_height(240.0)
                    .show(ui, |ui| ui.monospace(data));
            });
        }
    }

    /// Neighbors of the current selection, displayed ones first, then by label.
    fn neighbor_entries(&self) -> Vec<NeighborEntry> {
        let mut entries = self
            .selection
            .neighbor_ids()
            .into_iter()
            .filter_map(|id| {
                let node = self.graph.node(id)?;
                Some(NeighborEntry {
                    id: node.id.clone(),
                    label: node.label.clone(),
                    kind: node.kind,
                    in_view: self.render.index_by_id.contains_key(id),
                })
            })
            .collect::<Vec<_>>();

        entries.sort_by(|a, b| {
            b.in_view
                .cmp(&a.in_view)
                .then_with(|| a.label.cmp(&b.label))
                .then_with(|| a.id.cmp(&b.id))
        });
        entries
    }
}
