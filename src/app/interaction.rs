//! Pointer gesture classification for the graph canvas.
//!
//! The canvas reports raw press/move/release events. Both taps of a double
//! click and the release that ends a drag arrive as ordinary releases, so
//! this machine keeps its own drag flag and double-click memory to recover
//! single-click, double-click, and drag semantics.

use eframe::egui::{Pos2, Vec2};
use tracing::debug;

/// Seconds within which a second tap on the same node counts as a double click.
pub const DOUBLE_CLICK_WINDOW: f64 = 0.3;
/// Seconds after a drag ends during which releases never count as clicks.
pub const CLICK_SUPPRESS_SETTLE: f64 = 0.15;
/// Screen-space distance a press must travel before it becomes a drag.
pub const DRAG_THRESHOLD: f32 = 4.0;

#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
    Press { node: Option<String>, pos: Pos2 },
    Move { pos: Pos2 },
    Release { node: Option<String>, pos: Pos2 },
    Hover { node: Option<String> },
    /// The button went up somewhere the canvas could not see, e.g. outside the window.
    Cancel,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
    BackgroundClick,
    SingleClick(String),
    DoubleClick(String),
    DragStart(String),
    DragMove { id: String, pos: Pos2 },
    DragEnd { id: String, pos: Pos2 },
    Pan(Vec2),
    Hover(Option<String>),
}

#[derive(Clone, Debug, PartialEq)]
enum PressState {
    Idle,
    Pressed {
        node: Option<String>,
        origin: Pos2,
        last: Pos2,
    },
    Dragging {
        id: String,
        last: Pos2,
    },
    Panning {
        last: Pos2,
    },
}

#[derive(Clone, Debug, PartialEq)]
struct PendingTap {
    id: String,
    at: f64,
}

#[derive(Clone, Debug)]
pub struct InteractionMachine {
    press: PressState,
    pending_tap: Option<PendingTap>,
    suppress_clicks_until: Option<f64>,
    hovered: Option<String>,
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self {
            press: PressState::Idle,
            pending_tap: None,
            suppress_clicks_until: None,
            hovered: None,
        }
    }
}

impl InteractionMachine {
    pub fn is_dragging(&self) -> bool {
        matches!(self.press, PressState::Dragging { .. })
    }

    /// True between a press on the canvas and its release.
    pub fn is_engaged(&self) -> bool {
        self.press != PressState::Idle
    }

    pub fn dragged_node(&self) -> Option<&str> {
        match &self.press {
            PressState::Dragging { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// True while a tap is waiting to be resolved into a single or double click.
    pub fn has_pending_tap(&self) -> bool {
        self.pending_tap.is_some()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Resolves a tap whose double-click window elapsed. Safe to call every frame.
    pub fn poll(&mut self, now: f64) -> Option<Gesture> {
        if self
            .suppress_clicks_until
            .is_some_and(|deadline| now >= deadline)
        {
            self.suppress_clicks_until = None;
        }

        let expired = self
            .pending_tap
            .as_ref()
            .is_some_and(|tap| now - tap.at >= DOUBLE_CLICK_WINDOW);
        if expired {
            return self
                .pending_tap
                .take()
                .map(|tap| Gesture::SingleClick(tap.id));
        }
        None
    }

    pub fn handle(&mut self, event: PointerEvent, now: f64) -> Vec<Gesture> {
        let mut gestures = Vec::new();
        if let Some(expired) = self.poll(now) {
            gestures.push(expired);
        }

        match event {
            PointerEvent::Hover { node } => {
                if self.hovered != node {
                    self.hovered = node.clone();
                    gestures.push(Gesture::Hover(node));
                }
            }
            PointerEvent::Press { node, pos } => {
                self.press = PressState::Pressed {
                    node,
                    origin: pos,
                    last: pos,
                };
            }
            PointerEvent::Move { pos } => self.handle_move(pos, &mut gestures),
            PointerEvent::Release { node, pos } => self.handle_release(node, pos, now, &mut gestures),
            PointerEvent::Cancel => self.handle_cancel(now, &mut gestures),
        }

        gestures
    }

    fn handle_move(&mut self, pos: Pos2, gestures: &mut Vec<Gesture>) {
        match &mut self.press {
            PressState::Idle => {}
            PressState::Pressed { node, origin, last } => {
                if origin.distance(pos) < DRAG_THRESHOLD {
                    return;
                }

                match node.take() {
                    Some(id) => {
                        debug!(%id, "drag started");
                        gestures.push(Gesture::DragStart(id.clone()));
                        gestures.push(Gesture::DragMove {
                            id: id.clone(),
                            pos,
                        });
                        self.press = PressState::Dragging { id, last: pos };
                    }
                    None => {
                        gestures.push(Gesture::Pan(pos - *last));
                        self.press = PressState::Panning { last: pos };
                    }
                }
            }
            PressState::Dragging { id, last } => {
                *last = pos;
                gestures.push(Gesture::DragMove {
                    id: id.clone(),
                    pos,
                });
            }
            PressState::Panning { last } => {
                gestures.push(Gesture::Pan(pos - *last));
                *last = pos;
            }
        }
    }

    fn handle_release(
        &mut self,
        node: Option<String>,
        pos: Pos2,
        now: f64,
        gestures: &mut Vec<Gesture>,
    ) {
        match std::mem::replace(&mut self.press, PressState::Idle) {
            PressState::Dragging { id, .. } => {
                debug!(%id, "drag ended");
                self.suppress_clicks_until = Some(now + CLICK_SUPPRESS_SETTLE);
                gestures.push(Gesture::DragEnd { id, pos });
            }
            PressState::Panning { .. } => {}
            PressState::Idle | PressState::Pressed { .. } => {
                if self.suppress_clicks_until.is_some() {
                    debug!("click suppressed after drag");
                    return;
                }
                self.classify_click(node, now, gestures);
            }
        }
    }

    /// Ends the current press without a click; a drag finishes where it was last seen.
    fn handle_cancel(&mut self, now: f64, gestures: &mut Vec<Gesture>) {
        let PressState::Dragging { id, last } = std::mem::replace(&mut self.press, PressState::Idle)
        else {
            return;
        };
        debug!(%id, "drag ended outside the canvas");
        self.suppress_clicks_until = Some(now + CLICK_SUPPRESS_SETTLE);
        gestures.push(Gesture::DragEnd { id, pos: last });
    }

    fn classify_click(&mut self, node: Option<String>, now: f64, gestures: &mut Vec<Gesture>) {
        let Some(id) = node else {
            if let Some(tap) = self.pending_tap.take() {
                gestures.push(Gesture::SingleClick(tap.id));
            }
            gestures.push(Gesture::BackgroundClick);
            return;
        };

        match self.pending_tap.take() {
            Some(tap) if tap.id == id && now - tap.at < DOUBLE_CLICK_WINDOW => {
                debug!(%id, "double click");
                gestures.push(Gesture::DoubleClick(id));
            }
            previous => {
                if let Some(tap) = previous {
                    gestures.push(Gesture::SingleClick(tap.id));
                }
                self.pending_tap = Some(PendingTap { id, at: now });
            }
        }
    }
}
