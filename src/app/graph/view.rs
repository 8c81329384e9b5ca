use std::collections::HashMap;

use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Shape, Stroke, Ui, vec2};

use crate::engine::RenderState;
use crate::engine::visibility::NodeEmphasis;
use crate::util::short_label;

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, circle_visible, dim_color, draw_arrow_head, draw_background, draw_edge_line,
    draw_ground_grid, rgb_color, ring_points, world_to_screen,
};
use super::interaction::{DrawnNode, DrawnPlate};

const RING_SEGMENTS: usize = 64;
const GRID_DROP: f32 = 60.0;
const GRID_HALF_EXTENT: f32 = 400.0;
const GRID_STEP: f32 = 50.0;
const LABEL_CHARS: usize = 28;

struct SceneGeometry {
    plates: Vec<DrawnPlate>,
    /// Far to near.
    nodes: Vec<DrawnNode>,
}

fn project_scene(rect: Rect, state: &RenderState) -> SceneGeometry {
    let camera = &state.camera;

    let mut plates = state
        .layers
        .iter()
        .enumerate()
        .filter_map(|(index, plate)| {
            let depth = world_to_screen(rect, camera, plate.center)?.depth;
            let outline = ring_points(rect, camera, plate.center, plate.plate_radius, RING_SEGMENTS);
            (!outline.is_empty()).then_some(DrawnPlate {
                plate: index,
                layer: plate.layer,
                outline,
                depth,
            })
        })
        .collect::<Vec<_>>();
    plates.sort_by(|a, b| b.depth.total_cmp(&a.depth));

    let mut nodes = state
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, sprite)| {
            let point = world_to_screen(rect, camera, sprite.position)?;
            Some(DrawnNode {
                sprite: index,
                entity: sprite.entity,
                pos: point.pos,
                radius: (sprite.size * 0.5 * point.scale).clamp(2.0, 60.0),
                depth: point.depth,
            })
        })
        .collect::<Vec<_>>();
    nodes.sort_by(|a, b| b.depth.total_cmp(&a.depth));

    SceneGeometry { plates, nodes }
}

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect);

        self.handle_graph_zoom(ui, &response);
        self.handle_graph_pan(rect, &response);

        // Hit-test against the current frame, then draw the state those events produce.
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pos| rect.contains(*pos));
        let before = project_scene(rect, &self.viewer.render_state());
        let press_origin = ui.input(|input| input.pointer.press_origin());
        self.handle_graph_rotation(&response, press_origin, &before.nodes);
        let hovered_entity = Self::hovered_node(pointer, &before.nodes);
        let hovered_layer = Self::hovered_plate(pointer, &before.plates);

        let hovered_id = hovered_entity
            .and_then(|entity| self.viewer.graph().entities.get(entity))
            .map(|entity| entity.id.clone());
        self.viewer.set_hovered(hovered_id.as_deref());
        self.update_plate_hover(hovered_layer);

        let focused = self.viewer.interaction().focused_layer;
        if hovered_entity.is_some() || (hovered_layer.is_some() && hovered_layer != focused) {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            if let Some(id) = hovered_id.as_deref() {
                self.viewer.click_node(id);
            } else if let Some(layer) = hovered_layer {
                self.viewer.click_layer(layer);
            } else {
                self.viewer.set_selected(None);
            }
        }

        if response.dragged() {
            ui.ctx().request_repaint();
        }

        let search_matches = self.cached_search_matches();
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());

        let state = self.viewer.render_state();
        let geometry = project_scene(rect, &state);
        let camera = state.camera;

        if self.show_grid && state.focused_layer.is_none() {
            let floor = self
                .viewer
                .layers()
                .iter()
                .map(|layer| layer.y)
                .fold(f32::INFINITY, f32::min);
            draw_ground_grid(
                &painter,
                rect,
                &camera,
                floor - GRID_DROP,
                GRID_HALF_EXTENT,
                GRID_STEP,
            );
        }

        for drawn in &geometry.plates {
            let plate = &state.layers[drawn.plate];
            painter.add(Shape::convex_polygon(
                drawn.outline.clone(),
                rgb_color(plate.color, plate.fill_opacity()),
                Stroke::NONE,
            ));
            painter.add(Shape::closed_line(
                drawn.outline.clone(),
                Stroke::new(1.5, rgb_color(plate.color, plate.outline_opacity())),
            ));

            if let Some(anchor) = drawn
                .outline
                .iter()
                .copied()
                .max_by(|a, b| a.x.total_cmp(&b.x))
            {
                painter.text(
                    anchor + vec2(8.0, 0.0),
                    Align2::LEFT_CENTER,
                    format!("{} ({})", plate.label, plate.node_count),
                    FontId::proportional(13.0),
                    Color32::from_gray(70),
                );
            }
        }

        let node_discs = geometry
            .nodes
            .iter()
            .map(|node| (node.entity, (node.pos, node.radius)))
            .collect::<HashMap<_, _>>();

        let mut visible_edge_count = 0usize;
        for segment in &state.edges {
            let (Some(&(start, start_radius)), Some(&(end, end_radius))) = (
                node_discs.get(&segment.start_entity),
                node_discs.get(&segment.end_entity),
            ) else {
                continue;
            };

            let direction = end - start;
            let length = direction.length();
            if length <= start_radius + end_radius {
                continue;
            }
            let unit = direction / length;
            let from = start + unit * start_radius;
            let to = end - unit * end_radius;

            let style = segment.style;
            let stroke = Stroke::new(style.weight, rgb_color(style.color, style.opacity));
            draw_edge_line(&painter, from, to, stroke, style.line);

            let arrow_size = 6.0 + style.weight * 2.0;
            draw_arrow_head(&painter, to, unit, arrow_size, stroke, style.arrow_end);
            draw_arrow_head(&painter, from, -unit, arrow_size, stroke, style.arrow_start);
            visible_edge_count += 1;
        }
        self.visible_edge_count = visible_edge_count;

        let match_tint = Color32::from_rgb(64, 140, 230);
        let mut visible_node_count = 0usize;
        for drawn in &geometry.nodes {
            let sprite = &state.nodes[drawn.sprite];
            let Some(entity) = self.viewer.graph().entities.get(sprite.entity) else {
                continue;
            };
            if circle_visible(rect, drawn.pos, drawn.radius) {
                visible_node_count += 1;
            }

            let base_color = rgb_color(sprite.color, sprite.opacity);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&sprite.entity));
            let color = if sprite.emphasis != NodeEmphasis::Normal {
                base_color
            } else if is_match {
                blend_color(base_color, match_tint, 0.6)
            } else if search_active {
                dim_color(base_color, 0.4)
            } else {
                base_color
            };

            painter.circle_filled(drawn.pos, drawn.radius, color);
            let outline_width = match sprite.emphasis {
                NodeEmphasis::Selected => 2.4,
                NodeEmphasis::Hovered => 1.8,
                NodeEmphasis::Normal if is_match => 1.6,
                NodeEmphasis::Normal => 1.0,
            };
            painter.circle_stroke(
                drawn.pos,
                drawn.radius,
                Stroke::new(outline_width, Color32::from_rgba_unmultiplied(40, 40, 40, 200)),
            );

            if sprite.show_label || self.show_labels || (is_match && search_active) {
                painter.text(
                    drawn.pos + vec2(drawn.radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    short_label(entity.display_title(), LABEL_CHARS),
                    FontId::proportional(12.0),
                    Color32::from_gray(35),
                );
            }
        }
        self.visible_node_count = visible_node_count;

        if let Some(entity) = hovered_entity.and_then(|index| self.viewer.graph().entities.get(index)) {
            let layer_label = self
                .viewer
                .layer_of(&entity.id)
                .and_then(|layer| self.viewer.layers().get(layer))
                .map(|layer| layer.label.as_str())
                .unwrap_or("-");
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!(
                    "{}  |  {}  |  {}",
                    short_label(entity.display_title(), 48),
                    entity.kind.label(),
                    layer_label
                ),
                FontId::proportional(13.0),
                Color32::from_gray(30),
            );
        }

        if state.focused_layer.is_some() {
            let back_rect = Rect::from_min_size(rect.left_top() + vec2(10.0, 34.0), vec2(72.0, 24.0));
            if ui.put(back_rect, egui::Button::new("Back")).clicked() {
                self.viewer.back();
            }
        }
    }
}
