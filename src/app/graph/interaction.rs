use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use crate::graph::NodeId;

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

/// One drawn node, in screen space.
pub(in crate::app) struct ScreenNode {
    pub(in crate::app) id: NodeId,
    pub(in crate::app) position: Pos2,
    pub(in crate::app) radius: f32,
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
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
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 5.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Centres the placement and zooms so its outermost node fits the canvas.
    pub(in crate::app) fn fit_to_view(&mut self, rect: Rect) {
        let extent = self.placement.extent().max(1.0);
        let half = rect.width().min(rect.height()) * 0.5 - 24.0;
        self.zoom = (half.max(60.0) / extent).clamp(0.1, 5.0);
        self.pan = Vec2::ZERO;
    }

    pub(in crate::app) fn hovered_node<'a>(
        &self,
        ui: &Ui,
        screen_nodes: &'a [ScreenNode],
    ) -> Option<&'a ScreenNode> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        screen_nodes
            .iter()
            .filter_map(|node| {
                let distance = node.position.distance(pointer);
                (distance <= node.radius + 2.0).then_some((node, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node)
    }
}
