use std::f32::consts::TAU;

use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use crate::engine::CameraTransform;
use crate::engine::math::Vec3;
use crate::graph::Rgb;
use crate::graph::model::{ArrowHead, LinePattern};

pub(super) const BACKGROUND: Color32 = Color32::from_rgb(244, 244, 240);

#[derive(Clone, Copy, Debug)]
pub(super) struct ScreenPoint {
    pub pos: Pos2,
    /// Pixels per world unit at this point.
    pub scale: f32,
    pub depth: f32,
}

pub(super) fn world_to_screen(rect: Rect, camera: &CameraTransform, world: Vec3) -> Option<ScreenPoint> {
    let projected = camera.project(world, rect.height())?;
    Some(ScreenPoint {
        pos: rect.center() + Vec2::new(projected.x, projected.y),
        scale: projected.scale,
        depth: projected.depth,
    })
}

/// Projected outline of a horizontal circle. Empty when any point is behind the camera.
pub(super) fn ring_points(
    rect: Rect,
    camera: &CameraTransform,
    center: Vec3,
    radius: f32,
    segments: usize,
) -> Vec<Pos2> {
    let mut points = Vec::with_capacity(segments);
    for step in 0..segments {
        let angle = step as f32 / segments as f32 * TAU;
        let world = center + Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin());
        match world_to_screen(rect, camera, world) {
            Some(point) => points.push(point.pos),
            None => return Vec::new(),
        }
    }
    points
}

pub(super) fn rgb_color(rgb: Rgb, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(rgb.r, rgb.g, rgb.b, alpha)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;
    let [br, bg, bb, ba] = base.to_srgba_unmultiplied();
    let [or, og, ob, oa] = overlay.to_srgba_unmultiplied();
    let mix = |b: u8, o: u8| ((b as f32 * inverse) + (o as f32 * amount)) as u8;

    Color32::from_rgba_unmultiplied(mix(br, or), mix(bg, og), mix(bb, ob), mix(ba, oa))
}

/// Fades toward the background rather than toward black.
pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    let a = color.a();
    let [r, g, b, _] = blend_color(color, BACKGROUND, 1.0 - factor).to_srgba_unmultiplied();
    Color32::from_rgba_unmultiplied(r, g, b, (a as f32 * (0.45 + factor * 0.55)) as u8)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, BACKGROUND);
}

/// Square grid on the horizontal plane at `y`.
pub(super) fn draw_ground_grid(
    painter: &Painter,
    rect: Rect,
    camera: &CameraTransform,
    y: f32,
    half_extent: f32,
    step: f32,
) {
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(120, 120, 120, 45));
    let lines = (half_extent * 2.0 / step).round() as i32;

    for index in 0..=lines {
        let offset = -half_extent + index as f32 * step;
        let along_x = (
            Vec3::new(-half_extent, y, offset),
            Vec3::new(half_extent, y, offset),
        );
        let along_z = (
            Vec3::new(offset, y, -half_extent),
            Vec3::new(offset, y, half_extent),
        );

        for (start, end) in [along_x, along_z] {
            if let (Some(start), Some(end)) = (
                world_to_screen(rect, camera, start),
                world_to_screen(rect, camera, end),
            ) {
                painter.line_segment([start.pos, end.pos], stroke);
            }
        }
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Even-odd ray casting.
pub(super) fn point_in_polygon(point: Pos2, polygon: &[Pos2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut previous = polygon[polygon.len() - 1];
    for &current in polygon {
        if (current.y > point.y) != (previous.y > point.y) {
            let cross_x =
                current.x + (point.y - current.y) * (previous.x - current.x) / (previous.y - current.y);
            if point.x < cross_x {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

pub(super) fn draw_edge_line(painter: &Painter, start: Pos2, end: Pos2, stroke: Stroke, pattern: LinePattern) {
    match pattern {
        LinePattern::Solid => {
            painter.line_segment([start, end], stroke);
        }
        LinePattern::Dashed => {
            painter.extend(Shape::dashed_line(&[start, end], stroke, 8.0, 5.0));
        }
        LinePattern::Dotted => {
            let radius = (stroke.width * 0.6).max(0.8);
            painter.extend(Shape::dotted_line(&[start, end], stroke.color, 5.0, radius));
        }
    }
}

/// Arrow head with its tip at `tip`, pointing along `direction`.
pub(super) fn draw_arrow_head(
    painter: &Painter,
    tip: Pos2,
    direction: Vec2,
    size: f32,
    stroke: Stroke,
    head: ArrowHead,
) {
    if head == ArrowHead::None || direction.length_sq() <= f32::EPSILON {
        return;
    }

    let direction = direction.normalized();
    let normal = direction.rot90();
    let base = tip - direction * size;
    let left = base + normal * (size * 0.5);
    let right = base - normal * (size * 0.5);

    match head {
        ArrowHead::Filled => {
            painter.add(Shape::convex_polygon(vec![tip, left, right], stroke.color, Stroke::NONE));
        }
        ArrowHead::Open => {
            painter.line_segment([left, tip], stroke);
            painter.line_segment([right, tip], stroke);
        }
        ArrowHead::None => {}
    }
}
