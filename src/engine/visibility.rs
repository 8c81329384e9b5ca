use crate::graph::model::{ArrowHead, LinePattern};
use crate::graph::{Edge, Rgb};

use super::config::{EdgeConfig, KindStyle, NodeConfig};

/// Edges only render next to the hovered node. In focus mode both ends must
/// also live on the focused layer.
pub fn is_edge_visible<F>(
    edge: &Edge,
    hovered: Option<&str>,
    focused: Option<usize>,
    layer_of: F,
) -> bool
where
    F: Fn(&str) -> Option<usize>,
{
    let Some(hovered) = hovered else {
        return false;
    };
    if !edge.touches(hovered) {
        return false;
    }

    match focused {
        None => true,
        Some(layer) => layer_of(&edge.start) == Some(layer) && layer_of(&edge.end) == Some(layer),
    }
}

pub fn is_edge_highlighted(edge: &Edge, hovered: Option<&str>, selected: Option<&str>) -> bool {
    hovered.is_some_and(|id| edge.touches(id)) || selected.is_some_and(|id| edge.touches(id))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedEdgeStyle {
    pub color: Rgb,
    pub weight: f32,
    pub opacity: f32,
    pub line: LinePattern,
    pub arrow_start: ArrowHead,
    pub arrow_end: ArrowHead,
}

pub fn edge_style(edge: &Edge, highlighted: bool, config: &EdgeConfig) -> ResolvedEdgeStyle {
    let look = if highlighted {
        &config.highlight
    } else {
        &config.default
    };
    // A per-edge colour only tints the dim style; highlights always use the contrast colour.
    let color = if highlighted {
        look.color
    } else {
        edge.style.color.unwrap_or(look.color)
    };

    ResolvedEdgeStyle {
        color,
        weight: edge.style.weight.max(0.1) * look.weight_factor,
        opacity: look.opacity.clamp(0.0, 1.0),
        line: edge.style.line,
        arrow_start: edge.style.arrow_start,
        arrow_end: edge.style.arrow_end,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeEmphasis {
    Normal,
    Hovered,
    Selected,
}

impl NodeEmphasis {
    pub fn of(id: &str, hovered: Option<&str>, selected: Option<&str>) -> Self {
        if selected == Some(id) {
            Self::Selected
        } else if hovered == Some(id) {
            Self::Hovered
        } else {
            Self::Normal
        }
    }
}

pub fn node_scale(style: &KindStyle, emphasis: NodeEmphasis, any_focus: bool, config: &NodeConfig) -> f32 {
    let focus = if any_focus { config.focus_scale } else { 1.0 };
    let emphasis = match emphasis {
        NodeEmphasis::Selected => config.selected_scale,
        NodeEmphasis::Hovered => config.hover_scale,
        NodeEmphasis::Normal => 1.0,
    };
    config.base_size * style.size * focus * emphasis
}

pub fn node_color(style: &KindStyle, emphasis: NodeEmphasis, config: &NodeConfig) -> Rgb {
    match emphasis {
        NodeEmphasis::Selected => config.selected_color,
        NodeEmphasis::Hovered => config.hovered_color,
        NodeEmphasis::Normal => style.color,
    }
}

/// Emphasis from the overall metric, between 0.55 and 1.
pub fn node_opacity(overall: f32) -> f32 {
    0.55 + 0.45 * overall.clamp(0.0, 1.0)
}
