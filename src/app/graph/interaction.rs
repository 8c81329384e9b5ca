use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::point_in_polygon;

/// A node as drawn this frame, for hit-testing.
pub(super) struct DrawnNode {
    pub sprite: usize,
    pub entity: usize,
    pub pos: Pos2,
    pub radius: f32,
    pub depth: f32,
}

/// A layer plate's projected outline.
pub(super) struct DrawnPlate {
    pub plate: usize,
    pub layer: usize,
    pub outline: Vec<Pos2>,
    pub depth: f32,
}

fn press_starts_rotation(press_origin: Option<Pos2>, nodes: &[DrawnNode]) -> bool {
    ViewModel::hovered_node(press_origin, nodes).is_none()
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(&mut self, ui: &Ui, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.viewer.zoom_by(zoom_factor);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, rect: Rect, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            self.viewer.pan_by_pixels(delta.x, delta.y, rect.height());
        }
    }

    /// Drag-to-rotate only starts from a press on the background, not on a node.
    pub(super) fn handle_graph_rotation(
        &mut self,
        response: &egui::Response,
        press_origin: Option<Pos2>,
        nodes: &[DrawnNode],
    ) {
        let pointer_x = response.interact_pointer_pos().map(|pos| pos.x);

        if response.drag_started_by(egui::PointerButton::Primary)
            && press_starts_rotation(press_origin, nodes)
            && let Some(x) = pointer_x
        {
            self.viewer.pointer_pressed(x);
        }

        if response.dragged_by(egui::PointerButton::Primary)
            && let Some(x) = pointer_x
        {
            self.viewer.pointer_moved(x);
        }

        if response.drag_stopped() {
            self.viewer.pointer_released();
        }
    }

    pub(super) fn hovered_node(pointer: Option<Pos2>, nodes: &[DrawnNode]) -> Option<usize> {
        pointer.and_then(|pointer| {
            nodes
                .iter()
                .filter_map(|node| {
                    let distance = node.pos.distance(pointer);
                    if distance <= node.radius {
                        Some((node.entity, distance))
                    } else {
                        None
                    }
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(entity, _)| entity)
        })
    }

    /// Front-most plate under the pointer.
    pub(super) fn hovered_plate(pointer: Option<Pos2>, plates: &[DrawnPlate]) -> Option<usize> {
        pointer.and_then(|pointer| {
            plates
                .iter()
                .filter(|plate| point_in_polygon(pointer, &plate.outline))
                .min_by(|a, b| a.depth.total_cmp(&b.depth))
                .map(|plate| plate.layer)
        })
    }

    /// Forwards plate enter/leave transitions to the viewer's debounced hover.
    pub(in crate::app) fn update_plate_hover(&mut self, plate: Option<usize>) {
        if self.hovered_plate == plate {
            return;
        }

        if self.hovered_plate.is_some() {
            self.viewer.layer_pointer_leave();
        }
        if let Some(layer) = plate {
            self.viewer.layer_pointer_enter(layer);
        }
        self.hovered_plate = plate;
    }
}
