use eframe::egui::{Pos2, Rect, Vec2};

pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 6.0;
const ZOOM_STEP: f32 = 1.25;
const FIT_PADDING: f32 = 48.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct CameraTarget {
    pan: Vec2,
    zoom: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub pan: Vec2,
    pub zoom: f32,
    target: Option<CameraTarget>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            target: None,
        }
    }
}

impl Camera {
    pub fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.pan + world * self.zoom
    }

    pub fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.pan) / self.zoom
    }

    /// Screen position of the world origin.
    pub fn origin(&self, rect: Rect) -> Pos2 {
        rect.center() + self.pan
    }

    pub fn is_animating(&self) -> bool {
        self.target.is_some()
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / ZOOM_STEP);
    }

    fn zoom_by(&mut self, factor: f32) {
        self.target = None;
        let next = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan *= next / self.zoom;
        self.zoom = next;
    }

    /// Zooms while keeping the world point under `pointer` fixed on screen.
    pub fn zoom_around(&mut self, rect: Rect, pointer: Pos2, factor: f32) {
        self.target = None;
        let anchor = self.screen_to_world(rect, pointer);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - anchor * self.zoom;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.target = None;
        self.pan += delta;
    }

    /// Starts an animated fit of `world_bounds` into `viewport`, replacing any fit in flight.
    pub fn request_fit(&mut self, world_bounds: Rect, viewport: Rect) {
        if !world_bounds.is_finite() || viewport.width() <= 0.0 || viewport.height() <= 0.0 {
            return;
        }

        let bounds = world_bounds.expand(FIT_PADDING);
        let zoom = (viewport.width() / bounds.width())
            .min(viewport.height() / bounds.height())
            .clamp(MIN_ZOOM, MAX_ZOOM.min(2.0));
        self.target = Some(CameraTarget {
            pan: -bounds.center().to_vec2() * zoom,
            zoom,
        });
    }

    /// Moves toward the fit target; returns `true` while still animating.
    pub fn animate(&mut self, delta_seconds: f32) -> bool {
        let Some(target) = self.target else {
            return false;
        };

        let blend = 1.0 - (-delta_seconds.max(0.0) * 9.0).exp();
        self.pan += (target.pan - self.pan) * blend;
        self.zoom += (target.zoom - self.zoom) * blend;

        if (target.pan - self.pan).length() < 0.5 && (target.zoom - self.zoom).abs() < 0.001 {
            self.pan = target.pan;
            self.zoom = target.zoom;
            self.target = None;
        }
        self.target.is_some()
    }
}
