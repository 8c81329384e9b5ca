use eframe::egui::{Align, Layout, RichText, Ui};

use crate::engine::CameraMode;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search (title or keyword)")
            .on_hover_text("Fuzzy-highlight matching nodes without changing the layout.");
        let search_response = ui.text_edit_singleline(&mut self.search);
        search_response.on_hover_text("Highlighting pauses while a node is selected.");

        ui.separator();
        self.draw_layer_list(ui);

        ui.separator();
        ui.horizontal_wrapped(|ui| {
            if ui
                .button("Reset rotation")
                .on_hover_text("Ease the scene back to its initial yaw.")
                .clicked()
            {
                self.viewer.reset_rotation();
            }
            if ui.button("Clear selection").clicked() {
                self.viewer.set_selected(None);
            }
        });

        ui.add_space(4.0);
        ui.checkbox(&mut self.show_labels, "Always show node labels");
        ui.checkbox(&mut self.show_grid, "Ground grid")
            .on_hover_text("Only drawn in overview.");
        ui.checkbox(&mut self.frame_stats.show, "FPS Display");

        ui.collapsing("FPS Display tuning", |ui| {
            ui.add_enabled_ui(self.frame_stats.show, |ui| {
                ui.checkbox(&mut self.frame_stats.show_average, "Show average FPS");
                ui.checkbox(&mut self.frame_stats.show_frame_time, "Show frame time");
            });
        });

        ui.separator();
        ui.label(RichText::new("Navigation").strong());
        ui.small("Drag: rotate (overview)");
        ui.small("Right/middle drag: pan (overview)");
        ui.small("Scroll: zoom");
        ui.small("Click a plate: focus layer, Esc: back");
    }

    fn draw_layer_list(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Layers").strong());

        let requested = self.viewer.camera().requested();
        let mut clicked_key = None;

        for (index, layer) in self.viewer.layers().iter().enumerate() {
            let count = self.viewer.node_count(index);
            let is_focused = requested == CameraMode::Focused(index);

            let kinds = layer
                .kinds
                .iter()
                .map(|kind| kind.label())
                .collect::<Vec<_>>()
                .join(", ");
            let label = format!("{}  ({kinds})", layer.label);

            ui.horizontal(|ui| {
                if ui
                    .selectable_label(is_focused, label)
                    .on_hover_text(format!("y = {}, radius = {}", layer.y, layer.radius))
                    .clicked()
                {
                    clicked_key = Some(layer.key.clone());
                }
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(count.to_string());
                });
            });
        }

        if let Some(key) = clicked_key {
            self.viewer.request_focus(Some(&key));
        }

        if requested != CameraMode::Overview && ui.button("Back to overview").clicked() {
            self.viewer.request_focus(None);
        }
    }
}
