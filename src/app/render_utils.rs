use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::engine::Rgb;
use crate::graph::NodeKind;

pub(super) fn hex_color(hex: &str) -> Color32 {
    let rgb = Rgb::parse(hex).unwrap_or_else(Rgb::neutral);
    Color32::from_rgb(rgb.r, rgb.g, rgb.b)
}

pub(super) fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Pushes a color towards the canvas background for faded elements.
pub(super) fn fade_color(color: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let background = Color32::from_rgb(19, 23, 29);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((color.r() as f32 * inverse) + (background.r() as f32 * amount)) as u8,
        ((color.g() as f32 * inverse) + (background.g() as f32 * amount)) as u8,
        ((color.b() as f32 * inverse) + (background.b() as f32 * amount)) as u8,
        ((color.a() as f32) * (1.0 - amount * 0.6)) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn segment_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let bounds = Rect::from_two_pos(start, end).expand(padding);
    rect.intersects(bounds)
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn node_radius(kind: NodeKind) -> f32 {
    match kind {
        NodeKind::Domain => 22.0,
        NodeKind::FeatureGroup => 18.0,
        NodeKind::Bot => 16.0,
        NodeKind::User => 12.0,
        NodeKind::Feature => 10.0,
        NodeKind::Unknown => 9.0,
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn hex_parsing_falls_back_to_gray() {
        assert_eq!(hex_color("#D55E00"), Color32::from_rgb(0xd5, 0x5e, 0x00));
        assert_eq!(hex_color("nope"), Color32::from_rgb(0x99, 0x99, 0x99));
    }

    #[test]
    fn screen_and_world_are_inverse() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let world = vec2(120.0, -45.0);
        let screen = world_to_screen(rect, vec2(30.0, 10.0), 1.5, world);
        let back = screen_to_world(rect, vec2(30.0, 10.0), 1.5, screen);

        assert!((back - world).length() < 1e-3);
    }
}
