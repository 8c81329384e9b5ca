use eframe::egui::{self, Align, Context, Key, Layout};

use crate::engine::{CameraMode, ConfigError, EngineConfig, Viewer};
use crate::engine::config::Projection;
use crate::graph::{EntityKind, GraphData};

use super::super::ViewModel;
use super::FrameStats;

impl ViewModel {
    pub(in crate::app) fn new(
        config: EngineConfig,
        graph: GraphData,
        source_label: String,
    ) -> Result<Self, ConfigError> {
        let mut viewer = Viewer::new(config)?;
        viewer.set_entities(graph);

        Ok(Self {
            viewer,
            source_label,
            search: String::new(),
            graph_revision: 0,
            search_match_cache: None,
            hovered_plate: None,
            show_labels: false,
            show_grid: true,
            frame_stats: FrameStats::new(),
            visible_node_count: 0,
            visible_edge_count: 0,
        })
    }

    pub(in crate::app) fn replace_graph(&mut self, graph: GraphData) {
        self.viewer.set_entities(graph);
        self.graph_revision += 1;
        self.search_match_cache = None;
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_loading: bool) {
        let dt = ctx.input(|input| input.stable_dt).min(0.1);
        self.frame_stats.record(dt, !self.viewer.is_settled());
        self.viewer.on_frame(dt);

        if ctx.input(|input| input.key_pressed(Key::Escape)) {
            self.viewer.back();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("layer-graph");
                    ui.separator();
                    ui.label(format!("source: {}", self.source_label));
                    ui.label(self.entity_count_text());
                    ui.label(format!("edges: {}", self.viewer.graph().edges.len()));
                    ui.label(self.mode_text());
                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.visible_graph_text());
                        if let Some(fps_text) = self.frame_stats.text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));

        if !self.viewer.is_settled() {
            ctx.request_repaint();
        }
    }

    fn mode_text(&self) -> String {
        let camera = self.viewer.camera();
        let layer_label = |index: usize| {
            self.viewer
                .layers()
                .get(index)
                .map(|layer| layer.label.as_str())
                .unwrap_or("?")
        };

        let projection = match self.viewer.config().camera.projection {
            Projection::Orthographic => "ortho",
            Projection::Perspective => "perspective",
        };

        let mode = match camera.eased_progress() {
            None => match camera.mode() {
                CameraMode::Overview => "overview".to_owned(),
                CameraMode::Focused(index) => format!("focused: {}", layer_label(index)),
            },
            Some(progress) => {
                let percent = (progress * 100.0).round();
                match camera.requested() {
                    CameraMode::Overview => format!("returning to overview {percent:.0}%"),
                    CameraMode::Focused(index) => {
                        format!("focusing {} {percent:.0}%", layer_label(index))
                    }
                }
            }
        };

        format!("{mode} ({projection})")
    }

    fn entity_count_text(&self) -> String {
        let graph = self.viewer.graph();
        let counts = EntityKind::ALL
            .into_iter()
            .map(|kind| format!("{} {}", graph.count_of(kind), kind.label()))
            .collect::<Vec<_>>()
            .join(" / ");
        format!("entities: {counts}")
    }
}
