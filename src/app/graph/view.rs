use std::collections::BTreeMap;
use std::time::Instant;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2};
use log::debug;

use crate::engine::{SELECTED_BORDER_COLOR, SELECTED_BORDER_WIDTH};
use crate::layout::place_nodes;

use super::super::ViewModel;
use super::super::render_utils::{
    circle_visible, draw_background, fade_color, hex_color, node_radius, segment_visible,
    with_alpha, world_to_screen,
};
use super::interaction::ScreenNode;

const FADE: f32 = 0.78;
const EDGE_COLOR: Color32 = Color32::from_rgb(150, 156, 166);
const LABEL_COLOR: Color32 = Color32::from_gray(232);

impl ViewModel {
    /// Recomputes positions after an overlay change and reports the finished
    /// pass back to the engine.
    fn ensure_placement(&mut self, rect: Rect) {
        if self.layout_dirty {
            self.placement = place_nodes(self.engine.snapshot(), self.engine.overlay());
            self.layout_dirty = false;
            self.engine.layout_finished(Instant::now());
            debug!(
                "layout pass placed {} nodes in {} containers",
                self.placement.positions.len(),
                self.placement.containers.len()
            );
        }

        if self.fit_pending {
            self.fit_to_view(rect);
            self.fit_pending = false;
        }
    }

    fn draw_containers(&self, painter: &egui::Painter, rect: Rect) {
        for shape in &self.placement.containers {
            let center = world_to_screen(rect, self.pan, self.zoom, shape.center);
            let radius = shape.radius * self.zoom;
            if !circle_visible(rect, center, radius) {
                continue;
            }

            let color = hex_color(self.engine.cluster_color(shape.cluster_id));
            painter.circle_stroke(center, radius, Stroke::new(1.0, with_alpha(color, 90)));
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.ensure_placement(rect);
        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let (pan, zoom) = (self.pan, self.zoom);
        let radius_scale = zoom.sqrt();
        let display = self.engine.display();

        let mut screen: BTreeMap<String, (Pos2, f32)> = BTreeMap::new();
        for node in self.engine.snapshot().nodes() {
            if !self.engine.visibility().is_node_visible(&node.id) {
                continue;
            }
            let Some(world) = self.placement.position(&node.id) else {
                continue;
            };
            let position = world_to_screen(rect, pan, zoom, world);
            let radius = (node_radius(node.kind) * radius_scale).clamp(3.0, 48.0);
            screen.insert(node.id.clone(), (position, radius));
        }

        let on_screen = screen
            .iter()
            .filter(|(_, (position, radius))| circle_visible(rect, *position, *radius))
            .map(|(id, (position, radius))| ScreenNode {
                id: id.clone(),
                position: *position,
                radius: *radius,
            })
            .collect::<Vec<_>>();

        let hovered = if response.dragged() {
            None
        } else {
            self.hovered_node(ui, &on_screen).map(|node| node.id.clone())
        };
        let current = self.engine.hovered().map(|hover| hover.focus.clone());
        if hovered != current {
            self.engine.hover(hovered.as_deref());
        }
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        self.draw_containers(&painter, rect);

        let highlight = self.engine.hovered();
        let edge_width = (1.2 * radius_scale).clamp(0.6, 3.0);
        for edge in self.engine.snapshot().edges() {
            let key = edge.key();
            if !self.engine.visibility().is_edge_visible(&key) {
                continue;
            }
            let (Some((start, _)), Some((end, _))) = (
                screen.get(edge.source.as_str()),
                screen.get(edge.target.as_str()),
            ) else {
                continue;
            };
            if !segment_visible(rect, *start, *end, 2.0) {
                continue;
            }

            let (width, color) = match highlight {
                Some(state) if state.contains_edge(&key) => {
                    (edge_width * 1.8, Color32::from_gray(235))
                }
                Some(_) => (edge_width, fade_color(EDGE_COLOR, FADE)),
                None => (edge_width, with_alpha(EDGE_COLOR, 170)),
            };
            painter.line_segment([*start, *end], Stroke::new(width, color));

            if display.show_edge_labels && zoom > 0.8 {
                let text = edge
                    .label
                    .as_deref()
                    .unwrap_or_else(|| edge.relation.as_str());
                let middle = *start + (*end - *start) * 0.5;
                painter.text(
                    middle,
                    Align2::CENTER_CENTER,
                    text,
                    FontId::proportional(10.0),
                    with_alpha(color, 200),
                );
            }
        }

        let focused = self.engine.focused_id();
        for screen_node in &on_screen {
            let Some(node) = self.engine.snapshot().node(&screen_node.id) else {
                continue;
            };
            let Some(style) = self.engine.node_style(&node.id) else {
                continue;
            };
            let faded = highlight.is_some_and(|state| !state.contains_node(&node.id));
            let tone = |hex: &str| {
                let color = hex_color(hex);
                if faded { fade_color(color, FADE) } else { color }
            };

            let (position, radius) = (screen_node.position, screen_node.radius);
            painter.circle_filled(position, radius, tone(&style.gradient.dark));
            painter.circle_filled(position, radius * 0.86, tone(&style.gradient.base));
            painter.circle_filled(
                position - vec2(radius * 0.28, radius * 0.28),
                radius * 0.38,
                with_alpha(tone(&style.gradient.light), 170),
            );

            let border = if focused == Some(node.id.as_str()) {
                Some((SELECTED_BORDER_WIDTH, SELECTED_BORDER_COLOR))
            } else if style.border_width > 0.0 {
                Some((style.border_width, style.border_color.as_str()))
            } else {
                None
            };
            if let Some((width, color)) = border {
                painter.circle_stroke(position, radius, Stroke::new(width, tone(color)));
            }

            if display.show_node_labels {
                painter.text(
                    position + vec2(0.0, radius + 4.0),
                    Align2::CENTER_TOP,
                    node.display_label(),
                    FontId::proportional(12.0),
                    if faded { fade_color(LABEL_COLOR, FADE) } else { LABEL_COLOR },
                );
            }
        }

        if let Some(id) = &hovered
            && let Some(node) = self.engine.snapshot().node(id)
        {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}", node.display_label(), node.kind.as_str()),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            match hovered {
                Some(id) => {
                    self.engine.focus(&id);
                }
                None => self.engine.unfocus(),
            }
        }

        if response.dragged() {
            ui.ctx().request_repaint();
        }
    }
}
