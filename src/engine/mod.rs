pub mod camera;
pub mod config;
mod interaction;
pub mod math;
mod scene;
pub mod visibility;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::graph::{Edge, Entity, GraphData};
use crate::layout::{Placement, layered_layout};

pub use camera::{CameraEvent, CameraMode, CameraOrchestrator, CameraTransform, FocusFrame};
pub use config::{ConfigError, EngineConfig, LayerSet};
pub use interaction::InteractionState;
pub use scene::RenderState;

/// One mounted viewer: layout, camera and interaction state for a graph.
pub struct Viewer {
    config: EngineConfig,
    layers: LayerSet,
    graph: GraphData,
    index: HashMap<String, usize>,
    placements: Vec<Option<Placement>>,
    camera: CameraOrchestrator,
    interaction: InteractionState,
}

impl Viewer {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let layers = LayerSet::new(config.layers.clone())?;
        let camera = CameraOrchestrator::new(config.camera.clone(), config.zoom_bands.clone());

        Ok(Self {
            config,
            layers,
            graph: GraphData::default(),
            index: HashMap::new(),
            placements: Vec::new(),
            camera,
            interaction: InteractionState::default(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn layers(&self) -> &LayerSet {
        &self.layers
    }

    pub fn graph(&self) -> &GraphData {
        &self.graph
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn camera(&self) -> &CameraOrchestrator {
        &self.camera
    }

    /// Replaces the working set and recomputes the layout.
    pub fn set_entities(&mut self, graph: GraphData) {
        self.index = graph.index_by_id();
        self.graph = graph;

        let dangling = self
            .graph
            .edges
            .iter()
            .filter(|edge| !self.index.contains_key(&edge.start) || !self.index.contains_key(&edge.end))
            .count();
        if dangling > 0 {
            warn!(dangling, "edges with missing endpoints will not render");
        }

        if self
            .interaction
            .selected
            .as_ref()
            .is_some_and(|id| !self.index.contains_key(id))
        {
            self.interaction.selected = None;
        }
        if self
            .interaction
            .hovered_node
            .as_ref()
            .is_some_and(|id| !self.index.contains_key(id))
        {
            self.interaction.hovered_node = None;
        }

        self.relayout();
        debug!(
            entities = self.graph.entities.len(),
            edges = self.graph.edges.len(),
            "viewer working set replaced"
        );
    }

    fn relayout(&mut self) {
        let mut placements = vec![None; self.graph.entities.len()];
        for placement in layered_layout(
            &self.graph.entities,
            &self.layers,
            self.interaction.focused_layer,
            self.config.nodes.focus_scale,
        ) {
            placements[placement.entity] = Some(placement);
        }
        self.placements = placements;
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.index.get(id).and_then(|&index| self.graph.entities.get(index))
    }

    pub fn placement_of(&self, id: &str) -> Option<Placement> {
        self.index
            .get(id)
            .and_then(|&index| self.placements.get(index).copied().flatten())
    }

    pub fn layer_of(&self, id: &str) -> Option<usize> {
        self.placement_of(id).map(|placement| placement.layer)
    }

    pub fn node_count(&self, layer: usize) -> usize {
        self.placements
            .iter()
            .flatten()
            .filter(|placement| placement.layer == layer)
            .count()
    }

    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.graph
            .entities
            .iter()
            .filter(move |entity| entity.parent_id.as_deref() == Some(id))
    }

    /// Edges touching `id` whose other end resolves, with that other entity.
    pub fn connections_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = (&'a Edge, &'a Entity)> + 'a {
        self.graph.edges.iter().filter_map(move |edge| {
            let other = if edge.start == id {
                &edge.end
            } else if edge.end == id {
                &edge.start
            } else {
                return None;
            };
            self.entity(other).map(|entity| (edge, entity))
        })
    }

    /// `None` returns to overview. Unknown keys are treated as `None`.
    pub fn request_focus(&mut self, key: Option<&str>) {
        let layer = match key {
            None => None,
            Some(key) => {
                let found = self.layers.index_of(key);
                if found.is_none() {
                    warn!(key, "unknown layer key, returning to overview");
                }
                found
            }
        };
        self.focus(layer);
    }

    fn focus(&mut self, layer: Option<usize>) {
        if self.interaction.focused_layer == layer {
            return;
        }

        self.interaction.focused_layer = layer;
        self.interaction.hovered_layer = None;
        self.interaction.hover_timer.cancel();
        self.interaction.rotation.release();
        self.relayout();

        match layer {
            Some(index) => {
                let Some(config) = self.layers.get(index) else {
                    return;
                };
                let frame = FocusFrame {
                    layer_y: config.y,
                    layer_radius: config.radius,
                    node_count: self.node_count(index),
                };
                if self.camera.focus_layer(index, frame) {
                    debug!(layer = %config.key, nodes = frame.node_count, "focusing layer");
                }
            }
            None => {
                if self.camera.return_to_overview() {
                    debug!("returning to overview");
                }
            }
        }
    }

    pub fn set_selected(&mut self, id: Option<&str>) {
        self.interaction.selected = id
            .filter(|id| self.index.contains_key(*id))
            .map(str::to_owned);
    }

    pub fn set_hovered(&mut self, id: Option<&str>) {
        self.interaction.hovered_node = id
            .filter(|id| self.index.contains_key(*id))
            .map(str::to_owned);
    }

    /// Advances the hover timer, the camera and the rotation easing by one frame.
    pub fn on_frame(&mut self, dt_secs: f32) {
        let dt_secs = dt_secs.max(0.0);
        let dt_ms = dt_secs * 1000.0;

        if let Some(layer) = self.interaction.hover_timer.tick(dt_ms) {
            self.interaction.hovered_layer = Some(layer);
        }

        if let Some(CameraEvent::Settled(mode)) = self.camera.advance(dt_ms) {
            debug!(?mode, "camera settled");
        }

        if self.interaction.focused_layer.is_none() {
            self.interaction.rotation.step(dt_secs, &self.config.rotation);
        }
    }

    /// Rotation easing is frozen in focus mode, so a leftover yaw target does not count.
    pub fn is_settled(&self) -> bool {
        let rotation = &self.interaction.rotation;
        let rotation_idle = self.interaction.focused_layer.is_some()
            || (!rotation.is_dragging() && rotation.angle == rotation.target);
        !self.camera.is_animating()
            && rotation_idle
            && self.interaction.hover_timer.pending_layer().is_none()
    }

    pub fn pointer_pressed(&mut self, x: f32) {
        if self.interaction.focused_layer.is_none() {
            self.interaction.rotation.press(x);
        }
    }

    pub fn pointer_moved(&mut self, x: f32) {
        self.interaction
            .rotation
            .drag_to(x, self.config.rotation.sensitivity);
    }

    pub fn pointer_released(&mut self) {
        self.interaction.rotation.release();
    }

    /// Selects the node; outside focus mode also turns it toward the camera.
    pub fn click_node(&mut self, id: &str) {
        let Some(placement) = self.placement_of(id) else {
            return;
        };

        if self.interaction.focused_layer.is_none() {
            let pose = self.camera.pose();
            self.interaction
                .rotation
                .face(placement.position, pose.position - pose.target);
        }
        self.interaction.selected = Some(id.to_owned());
    }

    pub fn layer_pointer_enter(&mut self, layer: usize) {
        if self.interaction.hovered_layer == Some(layer)
            || self.interaction.hover_timer.pending_layer() == Some(layer)
        {
            return;
        }
        self.interaction
            .hover_timer
            .schedule(layer, self.config.interaction.hover_delay_ms);
    }

    pub fn layer_pointer_leave(&mut self) {
        self.interaction.hover_timer.cancel();
        self.interaction.hovered_layer = None;
    }

    pub fn click_layer(&mut self, layer: usize) {
        if self.interaction.focused_layer == Some(layer) || self.layers.get(layer).is_none() {
            return;
        }
        self.focus(Some(layer));
    }

    pub fn back(&mut self) {
        self.focus(None);
    }

    pub fn zoom_by(&mut self, factor: f32) -> bool {
        self.camera.zoom_by(factor)
    }

    pub fn pan_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) -> bool {
        self.camera.pan_by_pixels(dx, dy, viewport_height)
    }

    pub fn reset_rotation(&mut self) {
        self.interaction.rotation.target = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::math::Vec3;
    use crate::graph::{EntityKind, demo_graph};
    use crate::util::wrap_angle;
    use pretty_assertions::assert_eq;

    const FRAME: f32 = 1.0 / 60.0;

    fn viewer() -> Viewer {
        let mut viewer = Viewer::new(EngineConfig::default()).expect("default config");
        viewer.set_entities(demo_graph());
        viewer
    }

    fn settle(viewer: &mut Viewer) {
        for _ in 0..600 {
            viewer.on_frame(FRAME);
        }
    }

    #[test]
    fn focus_round_trip_restores_the_camera() {
        let mut viewer = viewer();
        viewer.zoom_by(1.4);
        let before = viewer.camera().pose();

        viewer.request_focus(Some("chunks"));
        assert_eq!(viewer.interaction().focused_layer, Some(2));
        settle(&mut viewer);
        assert_eq!(viewer.camera().mode(), CameraMode::Focused(2));
        assert!((viewer.camera().pose().zoom - 0.5).abs() < 1e-6);

        viewer.request_focus(None);
        settle(&mut viewer);
        assert_eq!(viewer.camera().mode(), CameraMode::Overview);
        assert_eq!(viewer.camera().pose(), before);
        assert_eq!(viewer.camera().snapshot(), None);
    }

    #[test]
    fn clusters_focus_uses_base_zoom() {
        let mut viewer = viewer();
        viewer.request_focus(Some("clusters"));
        settle(&mut viewer);
        assert_eq!(viewer.camera().pose().zoom, 1.0);
    }

    #[test]
    fn unknown_focus_key_falls_back_to_overview() {
        let mut viewer = viewer();
        viewer.request_focus(Some("documents"));
        settle(&mut viewer);

        viewer.request_focus(Some("galaxies"));
        assert_eq!(viewer.interaction().focused_layer, None);
        settle(&mut viewer);
        assert_eq!(viewer.camera().mode(), CameraMode::Overview);
    }

    #[test]
    fn focus_spreads_only_the_focused_layer() {
        let mut viewer = viewer();
        viewer.request_focus(Some("clusters"));

        let cluster = viewer.placement_of("cluster-1").expect("placed");
        assert!((cluster.position.x - 250.0).abs() < 1e-3);
        let document = viewer.placement_of("doc-1").expect("placed");
        assert!((document.position.x - 70.0).abs() < 1e-3);
    }

    #[test]
    fn render_state_shows_only_the_focused_layer() {
        let mut viewer = viewer();
        viewer.set_hovered(Some("chunk-1"));

        let overview = viewer.render_state();
        assert_eq!(overview.layers.len(), 3);
        assert_eq!(overview.nodes.len(), 33);
        assert!(overview.edges.iter().any(|segment| {
            let edge = &viewer.graph().edges[segment.edge];
            edge.end == "cluster-1"
        }));

        viewer.request_focus(Some("chunks"));
        let focused = viewer.render_state();
        assert_eq!(focused.layers.len(), 1);
        assert_eq!(focused.layers[0].plate_radius, 450.0);
        assert_eq!(focused.nodes.len(), 20);
        assert!(focused.nodes.iter().all(|node| node.layer == 2 && node.show_label));
        for segment in &focused.edges {
            let edge = &viewer.graph().edges[segment.edge];
            assert_eq!(viewer.layer_of(&edge.start), Some(2));
            assert_eq!(viewer.layer_of(&edge.end), Some(2));
        }
    }

    #[test]
    fn no_edges_render_without_hover() {
        let mut viewer = viewer();
        viewer.set_selected(Some("chunk-1"));
        assert!(viewer.render_state().edges.is_empty());
    }

    #[test]
    fn selected_edges_are_highlighted() {
        let mut viewer = viewer();
        viewer.set_hovered(Some("cluster-1"));
        viewer.set_selected(Some("chunk-1"));

        let state = viewer.render_state();
        assert!(!state.edges.is_empty());
        assert!(state.edges.iter().all(|segment| segment.highlighted));

        let chunk = state
            .nodes
            .iter()
            .find(|node| viewer.graph().entities[node.entity].id == "chunk-1")
            .expect("chunk drawn");
        assert_eq!(chunk.color, viewer.config().nodes.selected_color);
    }

    #[test]
    fn dangling_edges_are_dropped() {
        let mut viewer = viewer();
        let mut graph = demo_graph();
        graph
            .edges
            .push(Edge::new("ghost", "chunk-1", "does-not-exist"));
        viewer.set_entities(graph);
        viewer.set_hovered(Some("chunk-1"));

        let state = viewer.render_state();
        assert!(state
            .edges
            .iter()
            .all(|segment| viewer.graph().edges[segment.edge].id != "ghost"));
    }

    #[test]
    fn clicking_the_focused_layer_is_a_no_op() {
        let mut viewer = viewer();
        viewer.click_layer(1);
        viewer.on_frame(0.5);
        let progress = viewer.camera().eased_progress();

        viewer.click_layer(1);
        assert_eq!(viewer.camera().eased_progress(), progress);

        viewer.click_layer(2);
        assert_eq!(viewer.camera().requested(), CameraMode::Focused(2));
        viewer.back();
        assert_eq!(viewer.camera().requested(), CameraMode::Overview);
    }

    #[test]
    fn layer_hover_is_debounced_and_clears_immediately() {
        let mut viewer = viewer();
        viewer.layer_pointer_enter(0);
        viewer.on_frame(0.25);
        assert_eq!(viewer.interaction().hovered_layer, None);
        viewer.layer_pointer_enter(0);
        viewer.on_frame(0.25);
        assert_eq!(viewer.interaction().hovered_layer, Some(0));
        assert!(viewer.render_state().layers[0].hovered);

        viewer.layer_pointer_leave();
        assert_eq!(viewer.interaction().hovered_layer, None);

        viewer.layer_pointer_enter(1);
        viewer.on_frame(0.1);
        viewer.layer_pointer_leave();
        viewer.on_frame(1.0);
        assert_eq!(viewer.interaction().hovered_layer, None);
    }

    #[test]
    fn drag_rotates_only_in_overview() {
        let mut viewer = viewer();
        viewer.pointer_pressed(0.0);
        viewer.pointer_moved(100.0);
        assert!((viewer.interaction().rotation.angle - 0.5).abs() < 1e-6);
        viewer.pointer_released();

        viewer.request_focus(Some("documents"));
        let angle = viewer.interaction().rotation.angle;
        viewer.pointer_pressed(0.0);
        viewer.pointer_moved(300.0);
        settle(&mut viewer);
        assert_eq!(viewer.interaction().rotation.angle, angle);
    }

    #[test]
    fn clicking_a_node_turns_it_to_the_camera() {
        let mut viewer = viewer();
        viewer.click_node("doc-1");
        assert_eq!(viewer.interaction().selected(), Some("doc-1"));
        settle(&mut viewer);

        let pose = viewer.camera().pose();
        let node = viewer
            .render_state()
            .nodes
            .into_iter()
            .find(|node| viewer.graph().entities[node.entity].id == "doc-1")
            .expect("drawn");
        let facing = wrap_angle(node.position.azimuth() - (pose.position - pose.target).azimuth());
        assert!(facing.abs() < 1e-2);
    }

    #[test]
    fn clicking_in_focus_mode_selects_without_rotating() {
        let mut viewer = viewer();
        viewer.request_focus(Some("chunks"));
        viewer.click_node("chunk-3");
        assert_eq!(viewer.interaction().selected(), Some("chunk-3"));
        assert_eq!(viewer.interaction().rotation.target, 0.0);
    }

    #[test]
    fn replacing_entities_clears_stale_selection() {
        let mut viewer = viewer();
        viewer.set_selected(Some("chunk-7"));
        viewer.set_hovered(Some("doc-2"));

        let mut graph = GraphData::default();
        graph.entities.push(Entity::new("doc-2", EntityKind::Document));
        viewer.set_entities(graph);

        assert_eq!(viewer.interaction().selected(), None);
        assert_eq!(viewer.interaction().hovered_node(), Some("doc-2"));
        assert_eq!(viewer.node_count(0), 1);
        assert_eq!(viewer.placement_of("doc-2").map(|p| p.position), Some(Vec3::new(70.0, 120.0, 0.0)));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut viewer = viewer();
        viewer.set_selected(Some("nope"));
        viewer.click_node("nope");
        assert_eq!(viewer.interaction().selected(), None);
        assert_eq!(viewer.interaction().rotation.target, 0.0);
    }

    #[test]
    fn details_helpers_follow_parents_and_edges() {
        let viewer = viewer();
        let children = viewer.children_of("cluster-1").map(|entity| entity.id.as_str()).collect::<Vec<_>>();
        assert_eq!(children, vec!["chunk-1", "chunk-9", "chunk-17"]);

        let connected = viewer
            .connections_of("chunk-1")
            .map(|(_, entity)| entity.id.as_str())
            .collect::<Vec<_>>();
        assert!(connected.contains(&"cluster-1"));
        assert!(connected.contains(&"chunk-5"));
    }

    #[test]
    fn settles_after_rotation_and_camera_finish() {
        let mut viewer = viewer();
        assert!(viewer.is_settled());
        viewer.click_node("chunk-6");
        assert!(!viewer.is_settled());
        settle(&mut viewer);
        assert!(viewer.is_settled());
    }

    #[test]
    fn focus_during_rotation_easing_still_settles() {
        let mut viewer = viewer();
        viewer.click_node("chunk-11");
        viewer.on_frame(FRAME);
        let rotation = &viewer.interaction().rotation;
        assert!(rotation.angle != rotation.target);

        viewer.request_focus(Some("documents"));
        settle(&mut viewer);
        assert!(!viewer.camera().is_animating());
        assert!(viewer.is_settled());

        viewer.back();
        settle(&mut viewer);
        let rotation = &viewer.interaction().rotation;
        assert!((rotation.angle - rotation.target).abs() < 1e-6);
        assert!(viewer.is_settled());
    }
}
