use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{Align2, Color32, FontId, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::paint::{PaintContext, draw_link, draw_node, link_paint, node_paint, node_radius};
use super::super::physics::step_physics;
use super::super::render_utils::{circle_visible, draw_background, segment_visible};
use super::super::{SearchMatchCache, ViewModel};
use super::PointerSnapshot;

const SEARCH_HALO: Color32 = Color32::from_rgb(103, 196, 255);

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    pub(in crate::app) fn update_screen_space(&mut self, rect: Rect) {
        let camera = &self.camera;
        let render = &mut self.render;

        render.view_scratch.screen_positions.clear();
        render.view_scratch.screen_radii.clear();
        for node in &render.nodes {
            render
                .view_scratch
                .screen_positions
                .push(camera.world_to_screen(rect, node.world_pos));
            render
                .view_scratch
                .screen_radii
                .push(node_radius(node.kind, camera.zoom));
        }
    }

    /// Starts an animated zoom so every displayed node fits the canvas.
    pub(in crate::app) fn fit_to_view(&mut self) {
        if let Some(bounds) = self.render.world_bounds() {
            self.camera.request_fit(bounds, self.canvas_rect);
        }
    }

    /// Indices of displayed nodes whose label or id fuzzily matches the search box.
    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        if self.selection.is_active() {
            return None;
        }

        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.render_graph_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let graph = &self.graph;
        let matches = self
            .render
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let label = graph.label_of(&node.id);
                let hit = fuzzy_match_score(&matcher, label, query).is_some()
                    || fuzzy_match_score(&matcher, &node.id, query).is_some();
                hit.then_some(index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.render_graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    fn hover_text(&self, id: &str) -> Option<String> {
        let node = self.graph.node(id)?;
        Some(format!(
            "{}  |  {}  |  links {}",
            node.label,
            node.kind.display_name(),
            self.graph.degree(id)
        ))
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.canvas_rect = rect;
        let painter = ui.painter_at(rect);
        let now = ui.input(|input| input.time);
        let delta_seconds = ui
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);

        self.handle_wheel_zoom(ui, rect, &response);
        self.handle_secondary_pan(&response);
        self.update_screen_space(rect);
        self.feed_pointer(PointerSnapshot::capture(ui, &response), now);
        self.hover_cursor(ui);

        if self.simulation.tick(now) {
            let moving = step_physics(&mut self.render, self.physics, delta_seconds);
            if let Some(settled) = self.simulation.report_step(moving)
                && settled.fit_to_view
            {
                self.fit_to_view();
            }
        }
        self.camera.animate(delta_seconds);
        self.update_screen_space(rect);

        draw_background(&painter, rect, self.camera.origin(rect), self.camera.zoom);

        if self.simulation.is_running()
            || self.camera.is_animating()
            || self.interaction.is_engaged()
            || self.interaction.has_pending_tap()
        {
            ui.ctx().request_repaint();
        }

        if self.render.nodes.is_empty() {
            let message = if self.graph.nodes.is_empty() {
                "The payload contains no nodes."
            } else {
                "No nodes match the current filters."
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                message,
                FontId::proportional(15.0),
                Color32::from_gray(200),
            );
            return;
        }

        let search_matches = self.cached_search_matches();
        let ctx = PaintContext {
            selection: &self.selection,
            hovered: self.interaction.hovered(),
            show_labels: self.show_labels,
            zoom: self.camera.zoom,
        };
        let scratch = &self.render.view_scratch;

        for link in &self.render.links {
            let (Some(&start), Some(&end)) = (
                scratch.screen_positions.get(link.source),
                scratch.screen_positions.get(link.target),
            ) else {
                continue;
            };
            if !segment_visible(rect, start, end) {
                continue;
            }
            draw_link(&painter, start, end, link_paint(&link.id, link.kind, &ctx));
        }

        // Highlighted nodes are painted last so they sit above the dimmed rest.
        let (highlighted, regular): (Vec<usize>, Vec<usize>) = (0..self.render.nodes.len())
            .partition(|&index| {
                let id = self.render.nodes[index].id.as_str();
                self.selection.is_node_highlighted(id)
                    || ctx.hovered == Some(id)
                    || self.interaction.dragged_node() == Some(id)
            });

        for index in regular.into_iter().chain(highlighted) {
            let node = &self.render.nodes[index];
            let center = scratch.screen_positions[index];
            let paint = node_paint(node.kind, &node.id, &ctx);
            if !circle_visible(rect, center, paint.radius * 1.3) {
                continue;
            }

            if search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index))
            {
                painter.circle_stroke(center, paint.radius + 5.0, Stroke::new(2.0, SEARCH_HALO));
            }

            draw_node(&painter, center, &paint, self.graph.label_of(&node.id));
        }

        if let Some(text) = ctx.hovered.and_then(|id| self.hover_text(id)) {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use crate::app::tests::scenario_model;

    #[test]
    fn screen_space_tracks_every_displayed_node() {
        let mut model = scenario_model();
        model.render.node_mut("m1").unwrap().world_pos = vec2(10.0, -20.0);
        model.update_screen_space(model.canvas_rect);

        let scratch = &model.render.view_scratch;
        assert_eq!(scratch.screen_positions.len(), model.render.nodes.len());
        assert_eq!(scratch.screen_radii.len(), model.render.nodes.len());

        let index = model.render.index_by_id["m1"];
        let expected = model.canvas_rect.center() + vec2(10.0, -20.0);
        assert_eq!(scratch.screen_positions[index], expected);
    }

    #[test]
    fn search_matches_labels_and_is_cached_per_revision() {
        let mut model = scenario_model();
        model.search = "P1".to_owned();
        let matches = model.cached_search_matches().unwrap();
        let index = model.render.index_by_id["p1"];
        assert!(matches.contains(&index));

        let again = model.cached_search_matches().unwrap();
        assert!(std::sync::Arc::ptr_eq(&matches, &again));

        model.rebuild_render_graph();
        let rebuilt = model.cached_search_matches().unwrap();
        assert!(!std::sync::Arc::ptr_eq(&matches, &rebuilt));
    }

    #[test]
    fn search_is_suppressed_while_a_node_is_selected() {
        let mut model = scenario_model();
        model.search = "m1".to_owned();
        model.set_selected(Some("m1".to_owned()));
        assert!(model.cached_search_matches().is_none());

        model.search = "   ".to_owned();
        model.set_selected(None);
        assert!(model.cached_search_matches().is_none());
    }

    #[test]
    fn hover_text_names_kind_and_link_count() {
        let model = scenario_model();
        assert_eq!(
            model.hover_text("m1").as_deref(),
            Some("m1  |  Records  |  links 3")
        );
        assert_eq!(model.hover_text("t1").as_deref(), Some("t1  |  Labels  |  links 1"));
        assert_eq!(model.hover_text("ghost"), None);
    }

    #[test]
    fn fit_to_view_starts_camera_animation() {
        let mut model = scenario_model();
        assert!(!model.camera.is_animating());
        model.fit_to_view();
        assert!(model.camera.is_animating());
    }
}
