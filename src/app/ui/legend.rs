use eframe::egui::{self, RichText, Sense, Ui, vec2};

use crate::source::{LinkKind, NodeKind};

use super::super::ViewModel;
use super::super::paint::{LinkPaint, NodePaint, NodeShape, draw_link, draw_node};

fn node_swatch(ui: &mut Ui, kind: NodeKind, visible: bool) {
    let (rect, _) = ui.allocate_exact_size(vec2(18.0, 18.0), Sense::hover());
    let fill = if visible {
        kind.color()
    } else {
        kind.color().gamma_multiply(0.3)
    };
    let paint = NodePaint {
        shape: NodeShape::for_kind(kind),
        radius: 6.5,
        fill,
        outline: None,
        show_label: false,
    };
    draw_node(ui.painter(), rect.center(), &paint, "");
}

fn link_swatch(ui: &mut Ui, kind: LinkKind) {
    let (rect, _) = ui.allocate_exact_size(vec2(28.0, 18.0), Sense::hover());
    let paint = LinkPaint {
        stroke: egui::Stroke::new(1.6, egui::Color32::from_gray(170)),
        dashed: kind == LinkKind::Reference,
    };
    draw_link(ui.painter(), rect.left_center(), rect.right_center(), paint);
}

impl ViewModel {
    pub(in crate::app) fn draw_legend(&mut self, ui: &mut Ui) {
        ui.heading("Legend");
        ui.add_space(4.0);
        ui.label("Click a type to show or hide it.");
        ui.add_space(4.0);

        let mut toggled = None;
        for kind in NodeKind::ALL {
            let visible = self.filter.is_kind_visible(kind);
            let shown = self
                .render
                .nodes
                .iter()
                .filter(|node| node.kind == kind)
                .count();

            ui.horizontal(|ui| {
                node_swatch(ui, kind, visible);
                let text = RichText::new(kind.display_name());
                let text = if visible { text } else { text.weak().strikethrough() };
                let last_visible = visible && self.filter.visible_kind_count() == 1;
                let response = ui
                    .add_enabled(!last_visible, egui::Button::selectable(visible, text))
                    .on_hover_text(format!("Toggle {} nodes", kind.display_name()))
                    .on_disabled_hover_text("At least one node type must stay visible.");
                if response.clicked() {
                    toggled = Some(kind);
                }
                ui.weak(format!("{shown} / {}", self.graph.stats.count(kind)));
            });
        }

        if let Some(kind) = toggled {
            self.toggle_kind(kind);
        }

        ui.add_space(6.0);
        for (kind, text) in [
            (LinkKind::Relationship, "relationship"),
            (LinkKind::Reference, "reference"),
        ] {
            ui.horizontal(|ui| {
                link_swatch(ui, kind);
                ui.label(text);
            });
        }
    }
}
