use eframe::egui::{self, Pos2, Rect, Response, Ui, Vec2};
use tracing::debug;

use super::super::highlight::select_node;
use super::super::interaction::{Gesture, PointerEvent};
use super::super::navigation::navigation_for;
use super::super::{Ownership, ViewModel};

const HIT_SLOP: f32 = 3.0;

/// Primary-button pointer state for one frame, as seen by the graph canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(in crate::app) struct PointerSnapshot {
    pub(in crate::app) pos: Option<Pos2>,
    pub(in crate::app) over_canvas: bool,
    pub(in crate::app) pressed: bool,
    pub(in crate::app) moved: bool,
    pub(in crate::app) released: bool,
}

impl PointerSnapshot {
    pub(in crate::app) fn capture(ui: &Ui, response: &Response) -> Self {
        ui.input(|input| Self {
            pos: input.pointer.latest_pos(),
            over_canvas: response.hovered(),
            pressed: input.pointer.primary_pressed(),
            moved: input.pointer.delta() != Vec2::ZERO,
            released: input.pointer.primary_released(),
        })
    }
}

impl ViewModel {
    pub(in crate::app) fn handle_wheel_zoom(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let factor = (1.0 + scroll * 0.0018).clamp(0.85, 1.15);
        self.camera.zoom_around(rect, pointer, factor);
    }

    /// Secondary and middle drags pan regardless of what is under the pointer.
    pub(in crate::app) fn handle_secondary_pan(&mut self, response: &Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.camera.pan_by(response.drag_delta());
        }
    }

    /// Nearest displayed node under `pos`, using the current frame's screen positions.
    pub(in crate::app) fn node_at(&self, pos: Pos2) -> Option<String> {
        let scratch = &self.render.view_scratch;
        scratch
            .screen_positions
            .iter()
            .zip(&scratch.screen_radii)
            .enumerate()
            .filter_map(|(index, (center, radius))| {
                let distance = center.distance(pos);
                (distance <= radius + HIT_SLOP).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .and_then(|(index, _)| self.render.nodes.get(index))
            .map(|node| node.id.clone())
    }

    /// Translates one frame of pointer input into gestures and applies them in order.
    pub(in crate::app) fn feed_pointer(&mut self, snapshot: PointerSnapshot, now: f64) {
        let mut events = Vec::new();

        let hovered = snapshot
            .pos
            .filter(|_| snapshot.over_canvas)
            .and_then(|pos| self.node_at(pos));
        events.push(PointerEvent::Hover { node: hovered });

        if let Some(pos) = snapshot.pos {
            if snapshot.pressed && snapshot.over_canvas {
                events.push(PointerEvent::Press {
                    node: self.node_at(pos),
                    pos,
                });
            }
            if snapshot.moved {
                events.push(PointerEvent::Move { pos });
            }
            if snapshot.released {
                events.push(PointerEvent::Release {
                    node: self.node_at(pos),
                    pos,
                });
            }
        } else if snapshot.released {
            events.push(PointerEvent::Cancel);
        }

        for event in events {
            if matches!(event, PointerEvent::Release { .. }) && !self.interaction.is_engaged() {
                continue;
            }
            for gesture in self.interaction.handle(event, now) {
                self.apply_gesture(gesture);
            }
        }

        if let Some(gesture) = self.interaction.poll(now) {
            self.apply_gesture(gesture);
        }
    }

    pub(in crate::app) fn apply_gesture(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::BackgroundClick => self.set_selected(None),
            Gesture::SingleClick(id) => self.set_selected(Some(id)),
            Gesture::DoubleClick(id) => {
                if let Some(request) = self.graph.node(&id).and_then(navigation_for) {
                    self.pending_navigation = Some(request);
                }
            }
            Gesture::DragStart(id) => {
                if let Some(node) = self.render.node_mut(&id) {
                    node.ownership = Ownership::Dragged;
                    node.velocity = Vec2::ZERO;
                }
            }
            Gesture::DragMove { id, pos } => self.move_dragged(&id, pos, Ownership::Dragged),
            Gesture::DragEnd { id, pos } => self.move_dragged(&id, pos, Ownership::Pinned),
            Gesture::Pan(delta) => self.camera.pan_by(delta),
            Gesture::Hover(node) => debug!(?node, "hover changed"),
        }
    }

    fn move_dragged(&mut self, id: &str, pos: Pos2, ownership: Ownership) {
        let world = self.camera.screen_to_world(self.canvas_rect, pos);
        if let Some(node) = self.render.node_mut(id) {
            node.world_pos = world;
            node.velocity = Vec2::ZERO;
            node.ownership = ownership;
        }
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        match selected {
            Some(id) => {
                debug!(%id, "node selected");
                self.selection = select_node(&id, &self.graph.links);
            }
            None => self.selection.clear(),
        }
    }

    pub(in crate::app) fn hover_cursor(&self, ui: &Ui) {
        if self.interaction.is_dragging() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grabbing);
        } else if self.interaction.hovered().is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }
    }
}
