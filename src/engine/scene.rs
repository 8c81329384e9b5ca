use crate::graph::Rgb;
use crate::layout::layer_radius;

use super::Viewer;
use super::camera::CameraTransform;
use super::math::Vec3;
use super::visibility::{
    NodeEmphasis, ResolvedEdgeStyle, edge_style, is_edge_highlighted, is_edge_visible, node_color,
    node_opacity, node_scale,
};

const PLATE_FACTOR: f32 = 1.5;

#[derive(Clone, Debug, PartialEq)]
pub struct LayerPlate {
    pub layer: usize,
    pub label: String,
    pub center: Vec3,
    /// Ring radius the nodes sit on.
    pub ring_radius: f32,
    pub plate_radius: f32,
    pub color: Rgb,
    pub hovered: bool,
    pub node_count: usize,
}

impl LayerPlate {
    pub fn fill_opacity(&self) -> f32 {
        if self.hovered { 0.4 } else { 0.2 }
    }

    pub fn outline_opacity(&self) -> f32 {
        if self.hovered { 0.9 } else { 0.6 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeSprite {
    pub entity: usize,
    pub layer: usize,
    /// World position with the scene yaw applied.
    pub position: Vec3,
    pub size: f32,
    pub color: Rgb,
    pub opacity: f32,
    pub emphasis: NodeEmphasis,
    pub show_label: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeSegment {
    pub edge: usize,
    pub start_entity: usize,
    pub end_entity: usize,
    pub start: Vec3,
    pub end: Vec3,
    pub highlighted: bool,
    pub style: ResolvedEdgeStyle,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderState {
    pub camera: CameraTransform,
    pub rotation: f32,
    pub focused_layer: Option<usize>,
    pub animating: bool,
    pub layers: Vec<LayerPlate>,
    pub nodes: Vec<NodeSprite>,
    pub edges: Vec<EdgeSegment>,
}

impl Viewer {
    pub fn render_state(&self) -> RenderState {
        let interaction = &self.interaction;
        let focused = interaction.focused_layer;
        let rotation = interaction.rotation.angle;
        let hovered = interaction.hovered_node();
        let selected = interaction.selected();
        let layer_shown = |layer: usize| focused.is_none_or(|focus| focus == layer);

        let layers = self
            .layers
            .iter()
            .enumerate()
            .filter(|(index, _)| layer_shown(*index))
            .map(|(index, config)| {
                let ring_radius = layer_radius(
                    &self.layers,
                    index,
                    focused,
                    self.config.nodes.focus_scale,
                );
                LayerPlate {
                    layer: index,
                    label: config.label.clone(),
                    center: Vec3::new(0.0, config.y, 0.0),
                    ring_radius,
                    plate_radius: ring_radius * PLATE_FACTOR,
                    color: config.color,
                    hovered: interaction.hovered_layer == Some(index),
                    node_count: self.node_count(index),
                }
            })
            .collect();

        let nodes_config = &self.config.nodes;
        let nodes = self
            .placements
            .iter()
            .flatten()
            .filter(|placement| layer_shown(placement.layer))
            .filter_map(|placement| {
                let entity = self.graph.entities.get(placement.entity)?;
                let style = nodes_config.kind_style(entity.kind);
                let emphasis = NodeEmphasis::of(&entity.id, hovered, selected);
                Some(NodeSprite {
                    entity: placement.entity,
                    layer: placement.layer,
                    position: placement.position.rotate_y(rotation),
                    size: node_scale(style, emphasis, focused.is_some(), nodes_config),
                    color: node_color(style, emphasis, nodes_config),
                    opacity: node_opacity(entity.metrics.overall),
                    emphasis,
                    show_label: emphasis != NodeEmphasis::Normal || focused.is_some(),
                })
            })
            .collect();

        let edges = self
            .graph
            .edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| is_edge_visible(edge, hovered, focused, |id| self.layer_of(id)))
            .filter_map(|(index, edge)| {
                let start = self.placement_of(&edge.start)?;
                let end = self.placement_of(&edge.end)?;
                let highlighted = is_edge_highlighted(edge, hovered, selected);
                Some(EdgeSegment {
                    edge: index,
                    start_entity: start.entity,
                    end_entity: end.entity,
                    start: start.position.rotate_y(rotation),
                    end: end.position.rotate_y(rotation),
                    highlighted,
                    style: edge_style(edge, highlighted, &self.config.edges),
                })
            })
            .collect();

        RenderState {
            camera: self.camera.transform(),
            rotation,
            focused_layer: focused,
            animating: self.camera.is_animating(),
            layers,
            nodes,
            edges,
        }
    }
}
