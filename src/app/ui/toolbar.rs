use std::ops::RangeInclusive;

use eframe::egui::{self, Align, Layout, Ui};

use super::super::physics::PhysicsConfig;
use super::super::ViewModel;

struct TuningKnob<'a> {
    value: &'a mut f32,
    range: RangeInclusive<f32>,
    text: &'static str,
    hover: &'static str,
}

fn tuning_knobs(physics: &mut PhysicsConfig) -> [TuningKnob<'_>; 4] {
    [
        TuningKnob {
            value: &mut physics.intensity,
            range: 0.2..=2.5,
            text: "Intensity",
            hover: "Overall strength applied to all physics forces.",
        },
        TuningKnob {
            value: &mut physics.repulsion,
            range: 0.25..=3.0,
            text: "Repulsion",
            hover: "How strongly nodes push away from each other.",
        },
        TuningKnob {
            value: &mut physics.spring,
            range: 0.2..=2.5,
            text: "Link spring",
            hover: "How strongly linked nodes pull toward their rest distance.",
        },
        TuningKnob {
            value: &mut physics.damping,
            range: 0.7..=0.97,
            text: "Velocity damping",
            hover: "How quickly node movement slows each frame.",
        },
    ]
}

impl ViewModel {
    pub(in crate::app) fn draw_toolbar(
        &mut self,
        ui: &mut Ui,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        let now = ui.input(|input| input.time);

        ui.horizontal(|ui| {
            ui.heading("relgraph");
            ui.separator();

            let refresh = ui
                .add_enabled(!is_reloading, egui::Button::new("Refresh"))
                .on_hover_text("Reload the payload. Hidden nodes stay hidden; pins are released.");
            if refresh.clicked() {
                *reload_requested = true;
            }
            if is_reloading {
                ui.spinner();
            }

            ui.separator();
            if ui.button("−").on_hover_text("Zoom out").clicked() {
                self.camera.zoom_out();
            }
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                self.camera.zoom_in();
            }
            if ui
                .button("Center")
                .on_hover_text("Zoom to fit every displayed node.")
                .clicked()
            {
                self.fit_to_view();
            }

            ui.separator();
            if self.simulation.is_running() {
                if ui
                    .button("Freeze")
                    .on_hover_text("Stop the layout simulation.")
                    .clicked()
                {
                    self.freeze();
                }
                if let Some(deadline) = self.simulation.auto_freeze_at() {
                    ui.weak(format!("freezes in {:.1}s", (deadline - now).max(0.0)));
                }
            } else if ui
                .button("Resume")
                .on_hover_text("Release pinned nodes and run the layout for a few seconds.")
                .clicked()
            {
                self.resume(now);
            }

            ui.checkbox(&mut self.show_labels, "Labels");

            let hidden = self.filter.hidden_count();
            let show_hidden = ui.add_enabled(
                hidden > 0,
                egui::Button::new(format!("Show hidden ({hidden})")),
            );
            if show_hidden.clicked() {
                self.show_all_hidden();
            }

            ui.separator();
            ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("Search labels")
                    .desired_width(180.0),
            )
            .on_hover_text("Fuzzy-highlight matching nodes without changing the displayed graph.");

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if let Some(status) = &self.status {
                    ui.label(status.as_str());
                }
            });
        });
    }

    pub(in crate::app) fn draw_physics_tuning(&mut self, ui: &mut Ui) {
        ui.collapsing("Physics tuning", |ui| {
            let mut changed = false;
            for knob in tuning_knobs(&mut self.physics) {
                changed |= ui
                    .add(
                        egui::Slider::new(knob.value, knob.range)
                            .text(knob.text)
                            .clamping(egui::SliderClamping::Always),
                    )
                    .on_hover_text(knob.hover)
                    .changed();
            }

            if ui.button("Reset").clicked() {
                self.physics = PhysicsConfig::default();
                changed = true;
            }

            if changed && !self.simulation.is_running() {
                self.status = Some("Layout is frozen; resume to apply tuning".to_owned());
            }
        });
    }
}
