//! Paint contracts for nodes and links.
//!
//! Everything here is a pure function of the current view state so the same
//! inputs always produce the same picture, whether the frame was triggered by a
//! simulation tick or by a state change while frozen.

use eframe::egui::{
    Align2, Color32, CornerRadius, FontId, Painter, Pos2, Rect, Shape, Stroke, StrokeKind, vec2,
};

use super::highlight::SelectionState;
use super::render_utils::{blend_color, dim_color};
use crate::source::{LinkKind, NodeKind};

const ACCENT: Color32 = Color32::from_rgb(255, 211, 92);
const LINK_COLOR: Color32 = Color32::from_rgba_premultiplied(96, 104, 122, 170);
const LABEL_COLOR: Color32 = Color32::from_gray(232);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
    Circle,
    RoundedSquare,
    Diamond,
}

impl NodeShape {
    pub fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::EntityRecord => Self::RoundedSquare,
            NodeKind::Person | NodeKind::Label => Self::Circle,
            NodeKind::Collection => Self::Diamond,
        }
    }
}

pub struct PaintContext<'a> {
    pub selection: &'a SelectionState,
    pub hovered: Option<&'a str>,
    pub show_labels: bool,
    pub zoom: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodePaint {
    pub shape: NodeShape,
    pub radius: f32,
    pub fill: Color32,
    pub outline: Option<Stroke>,
    pub show_label: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkPaint {
    pub stroke: Stroke,
    pub dashed: bool,
}

/// On-screen radius of a node at the given zoom; also used for hit testing.
pub fn node_radius(kind: NodeKind, zoom: f32) -> f32 {
    (kind.base_radius() * zoom.powf(0.5)).clamp(2.5, 42.0)
}

pub fn node_paint(kind: NodeKind, id: &str, ctx: &PaintContext<'_>) -> NodePaint {
    let highlighted = ctx.selection.is_node_highlighted(id);
    let hovered = ctx.hovered == Some(id);

    let mut fill = kind.color();
    if hovered {
        fill = blend_color(fill, Color32::WHITE, 0.25);
    } else if ctx.selection.is_active() && !highlighted {
        fill = dim_color(fill, 0.4);
    }

    let outline = highlighted.then(|| {
        let width = if ctx.selection.is_selected(id) { 3.0 } else { 2.0 };
        Stroke::new(width, ACCENT)
    });

    NodePaint {
        shape: NodeShape::for_kind(kind),
        radius: node_radius(kind, ctx.zoom),
        fill,
        outline,
        show_label: ctx.show_labels || highlighted || hovered,
    }
}

pub fn link_paint(id: &str, kind: LinkKind, ctx: &PaintContext<'_>) -> LinkPaint {
    let zoom_scale = ctx.zoom.sqrt();
    let stroke = if ctx.selection.is_link_highlighted(id) {
        Stroke::new((2.4 * zoom_scale).clamp(1.4, 4.5), ACCENT)
    } else if ctx.selection.is_active() {
        Stroke::new((0.8 * zoom_scale).clamp(0.4, 2.0), dim_color(LINK_COLOR, 0.45))
    } else {
        Stroke::new((1.1 * zoom_scale).clamp(0.6, 3.0), LINK_COLOR)
    };

    LinkPaint {
        stroke,
        dashed: kind == LinkKind::Reference,
    }
}

pub fn draw_link(painter: &Painter, start: Pos2, end: Pos2, paint: LinkPaint) {
    if paint.dashed {
        let dash = (paint.stroke.width * 3.5).max(4.0);
        painter.extend(Shape::dashed_line(&[start, end], paint.stroke, dash, dash * 0.8));
    } else {
        painter.line_segment([start, end], paint.stroke);
    }
}

pub fn draw_node(painter: &Painter, center: Pos2, paint: &NodePaint, label: &str) {
    let outline = paint.outline.unwrap_or(Stroke::new(1.0, Color32::from_black_alpha(170)));
    let radius = paint.radius;

    match paint.shape {
        NodeShape::Circle => {
            painter.circle_filled(center, radius, paint.fill);
            painter.circle_stroke(center, radius, outline);
        }
        NodeShape::RoundedSquare => {
            let rect = Rect::from_center_size(center, vec2(radius, radius) * 1.8);
            let rounding = CornerRadius::same((radius * 0.35).clamp(1.0, 12.0) as u8);
            painter.rect_filled(rect, rounding, paint.fill);
            painter.rect_stroke(rect, rounding, outline, StrokeKind::Outside);
        }
        NodeShape::Diamond => {
            let reach = radius * 1.2;
            let points = vec![
                center + vec2(0.0, -reach),
                center + vec2(reach, 0.0),
                center + vec2(0.0, reach),
                center + vec2(-reach, 0.0),
            ];
            painter.add(Shape::convex_polygon(points, paint.fill, outline));
        }
    }

    if paint.show_label {
        painter.text(
            center + vec2(radius + 6.0, 0.0),
            Align2::LEFT_CENTER,
            label,
            FontId::proportional(12.0),
            LABEL_COLOR,
        );
    }
}
