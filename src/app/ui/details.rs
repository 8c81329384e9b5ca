use eframe::egui::{self, RichText, Ui};

use crate::util::short_label;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.viewer.interaction().selected().map(str::to_owned) else {
            ui.label("Click a node in the graph to inspect it.");
            return;
        };

        let Some(entity) = self.viewer.entity(&selected_id) else {
            ui.label("Selected node no longer exists in the graph data.");
            return;
        };

        let layer_label = self
            .viewer
            .layer_of(&entity.id)
            .and_then(|layer| self.viewer.layers().get(layer))
            .map(|layer| layer.label.clone())
            .unwrap_or_else(|| "-".to_owned());

        let mut next_selection = None;

        ui.label(RichText::new(entity.display_title()).strong());
        ui.small(entity.id.as_str());
        ui.add_space(6.0);

        ui.label(format!("Kind: {}", entity.kind.label()));
        ui.label(format!("Layer: {layer_label}"));

        if !entity.content.summary.is_empty() {
            ui.add_space(4.0);
            ui.label(entity.content.summary.as_str());
        }
        if !entity.content.quote.is_empty() {
            ui.add_space(4.0);
            ui.label(RichText::new(format!("\u{201c}{}\u{201d}", entity.content.quote)).italics());
        }
        if !entity.content.keywords.is_empty() {
            ui.label(format!("Keywords: {}", entity.content.keywords.join(", ")));
        }
        if !entity.content.cluster_topics.is_empty() {
            ui.label(format!("Topics: {}", entity.content.cluster_topics.join(", ")));
        }
        if let Some(location) = &entity.location {
            match location.page_number {
                Some(page) => ui.label(format!("Source: {} (page {page})", location.document_id)),
                None => ui.label(format!("Source: {}", location.document_id)),
            };
        }

        ui.separator();
        ui.label(RichText::new("Metrics").strong());
        let metrics = entity.metrics;
        ui.label(format!(
            "overall {:.2}  |  canvas {:.2}  |  chat {:.2}",
            metrics.overall, metrics.canvas, metrics.chat
        ));

        ui.separator();
        ui.label(RichText::new("Hierarchy").strong());
        match entity.parent_id.as_deref() {
            Some(parent_id) => match self.viewer.entity(parent_id) {
                Some(parent) => {
                    ui.horizontal(|ui| {
                        ui.label("Parent:");
                        if ui
                            .link(short_label(parent.display_title(), 36))
                            .on_hover_text(parent.id.as_str())
                            .clicked()
                        {
                            next_selection = Some(parent.id.clone());
                        }
                    });
                }
                None => {
                    ui.label(format!("Parent: {parent_id} (not loaded)"));
                }
            },
            None => {
                ui.label("Parent: none");
            }
        }
        ui.label(format!("Children: {}", self.viewer.children_of(&entity.id).count()));

        ui.separator();
        ui.label(RichText::new("Connected entities").strong());
        let connections = self.viewer.connections_of(&entity.id).collect::<Vec<_>>();
        if connections.is_empty() {
            ui.label("No edges touch this entity.");
        } else {
            egui::ScrollArea::vertical()
                .id_salt("connected_entities_scroll")
                .max_height(320.0)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (edge, other) in &connections {
                        let mut label = format!(
                            "{}  [{}]",
                            short_label(other.display_title(), 36),
                            other.kind.label()
                        );
                        if !edge.description.is_empty() {
                            label.push_str(&format!("  {}", edge.description));
                        }

                        if ui.link(label).on_hover_text(other.id.as_str()).clicked() {
                            next_selection = Some(other.id.clone());
                        }
                    }
                });
        }

        if let Some(id) = next_selection {
            self.viewer.set_selected(Some(&id));
        }
    }
}
