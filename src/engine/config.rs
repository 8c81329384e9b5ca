use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::graph::{EntityKind, Rgb};

use super::math::{Easing, Vec3};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one layer must be configured")]
    NoLayers,
    #[error("layer key `{0}` is used more than once")]
    DuplicateLayer(String),
    #[error("layer `{0}` must have a positive radius")]
    NonPositiveRadius(String),
    #[error("entity kind `{kind}` is assigned to both `{first}` and `{second}`")]
    KindInSeveralLayers {
        kind: &'static str,
        first: String,
        second: String,
    },
    #[error("entity kind `{0}` is not assigned to any layer")]
    UnassignedKind(&'static str),
    #[error("camera transition duration must be positive")]
    NonPositiveDuration,
    #[error("zoom bands need 0 < few_max <= medium_max and a floor in (0, 1]")]
    InvalidZoomBands,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LayerConfig {
    pub key: String,
    pub label: String,
    pub y: f32,
    pub radius: f32,
    pub color: Rgb,
    pub kinds: Vec<EntityKind>,
}

fn default_layers() -> Vec<LayerConfig> {
    vec![
        LayerConfig {
            key: "documents".to_owned(),
            label: "Documents".to_owned(),
            y: 120.0,
            radius: 70.0,
            color: Rgb::new(0x90, 0xee, 0x90),
            kinds: vec![EntityKind::Document],
        },
        LayerConfig {
            key: "clusters".to_owned(),
            label: "Sections".to_owned(),
            y: 0.0,
            radius: 100.0,
            color: Rgb::new(0xdd, 0xa0, 0xdd),
            kinds: vec![EntityKind::Cluster],
        },
        LayerConfig {
            key: "chunks".to_owned(),
            label: "Chunks".to_owned(),
            y: -150.0,
            radius: 120.0,
            color: Rgb::new(0x87, 0xce, 0xeb),
            kinds: vec![EntityKind::Chunk],
        },
    ]
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    #[default]
    Orthographic,
    Perspective,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathShape {
    #[default]
    Arched,
    Straight,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub projection: Projection,
    pub position: Vec3,
    pub target: Vec3,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Height above the focused layer's plane for the focus pose.
    pub focus_height: f32,
    pub perspective_focus_height: f32,
    pub base_focus_zoom: f32,
    pub fov_degrees: f32,
    pub transition_ms: f32,
    pub arch_lift: f32,
    pub path: PathShape,
    pub easing: Easing,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            projection: Projection::Orthographic,
            position: Vec3::new(400.0, 250.0, 400.0),
            target: Vec3::new(0.0, -40.0, 0.0),
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
            focus_height: 200.0,
            perspective_focus_height: 650.0,
            base_focus_zoom: 1.0,
            fov_degrees: 50.0,
            transition_ms: 1500.0,
            arch_lift: 100.0,
            path: PathShape::Arched,
            easing: Easing::CubicInOut,
        }
    }
}

impl CameraConfig {
    pub fn effective_focus_height(&self) -> f32 {
        match self.projection {
            Projection::Orthographic => self.focus_height,
            Projection::Perspective => self.perspective_focus_height,
        }
    }
}

/// Hand-tuned focus zoom banding by node count.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomBands {
    pub few_max: usize,
    pub medium_max: usize,
    pub few_multiplier: f32,
    pub step: f32,
    pub floor: f32,
}

impl Default for ZoomBands {
    fn default() -> Self {
        Self {
            few_max: 5,
            medium_max: 10,
            few_multiplier: 1.5,
            step: 0.05,
            floor: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Radians of yaw per horizontal pixel of drag.
    pub sensitivity: f32,
    /// Fraction of the remaining distance covered per 60 Hz frame.
    pub inertia_rate: f32,
    pub settle_epsilon: f32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.005,
            inertia_rate: 0.1,
            settle_epsilon: 0.001,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct KindStyle {
    pub size: f32,
    pub color: Rgb,
}

impl Default for KindStyle {
    fn default() -> Self {
        Self {
            size: 1.0,
            color: Rgb::new(0xff, 0xff, 0xff),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub base_size: f32,
    pub hover_scale: f32,
    pub selected_scale: f32,
    /// Applied both to the focused layer's radius and to node size in focus mode.
    pub focus_scale: f32,
    pub selected_color: Rgb,
    pub hovered_color: Rgb,
    pub document: KindStyle,
    pub cluster: KindStyle,
    pub chunk: KindStyle,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            base_size: 15.0,
            hover_scale: 1.1,
            selected_scale: 1.3,
            focus_scale: 2.5,
            selected_color: Rgb::new(0xff, 0x44, 0x44),
            hovered_color: Rgb::new(0x44, 0xff, 0x44),
            document: KindStyle {
                size: 1.2,
                color: Rgb::new(0xf5, 0xf5, 0xf0),
            },
            cluster: KindStyle {
                size: 1.0,
                color: Rgb::new(0xf3, 0xe6, 0xf3),
            },
            chunk: KindStyle {
                size: 0.8,
                color: Rgb::new(0xe8, 0xf4, 0xfa),
            },
        }
    }
}

impl NodeConfig {
    pub fn kind_style(&self, kind: EntityKind) -> &KindStyle {
        match kind {
            EntityKind::Document => &self.document,
            EntityKind::Cluster => &self.cluster,
            EntityKind::Chunk => &self.chunk,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EdgeLook {
    pub color: Rgb,
    pub weight_factor: f32,
    pub opacity: f32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub default: EdgeLook,
    pub highlight: EdgeLook,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            default: EdgeLook {
                color: Rgb::new(0x66, 0x66, 0x66),
                weight_factor: 1.0,
                opacity: 0.4,
            },
            highlight: EdgeLook {
                color: Rgb::new(0x00, 0x00, 0x00),
                weight_factor: 2.0,
                opacity: 1.0,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub hover_delay_ms: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hover_delay_ms: 500.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layers: Vec<LayerConfig>,
    pub camera: CameraConfig,
    pub zoom_bands: ZoomBands,
    pub rotation: RotationConfig,
    pub nodes: NodeConfig,
    pub edges: EdgeConfig,
    pub interaction: InteractionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layers: default_layers(),
            camera: CameraConfig::default(),
            zoom_bands: ZoomBands::default(),
            rotation: RotationConfig::default(),
            nodes: NodeConfig::default(),
            edges: EdgeConfig::default(),
            interaction: InteractionConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("invalid engine config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("rejected engine config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        LayerSet::new(self.layers.clone())?;

        if self.camera.transition_ms <= 0.0 {
            return Err(ConfigError::NonPositiveDuration);
        }

        let bands = &self.zoom_bands;
        if bands.few_max == 0
            || bands.few_max > bands.medium_max
            || bands.floor <= 0.0
            || bands.floor > 1.0
        {
            return Err(ConfigError::InvalidZoomBands);
        }

        Ok(())
    }
}

/// Ordered layers plus the kind-to-layer table. Every kind maps to exactly one layer.
#[derive(Clone, Debug)]
pub struct LayerSet {
    layers: Vec<LayerConfig>,
    by_kind: HashMap<EntityKind, usize>,
}

impl LayerSet {
    pub fn new(layers: Vec<LayerConfig>) -> Result<Self, ConfigError> {
        if layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }

        let mut keys = HashSet::with_capacity(layers.len());
        let mut by_kind = HashMap::new();
        for (index, layer) in layers.iter().enumerate() {
            if !keys.insert(layer.key.clone()) {
                return Err(ConfigError::DuplicateLayer(layer.key.clone()));
            }
            if layer.radius <= 0.0 {
                return Err(ConfigError::NonPositiveRadius(layer.key.clone()));
            }

            for &kind in &layer.kinds {
                if let Some(&previous) = by_kind.get(&kind) {
                    let first: &LayerConfig = &layers[previous];
                    return Err(ConfigError::KindInSeveralLayers {
                        kind: kind.label(),
                        first: first.key.clone(),
                        second: layer.key.clone(),
                    });
                }
                by_kind.insert(kind, index);
            }
        }

        if let Some(kind) = EntityKind::ALL
            .iter()
            .find(|kind| !by_kind.contains_key(*kind))
        {
            return Err(ConfigError::UnassignedKind(kind.label()));
        }

        Ok(Self { layers, by_kind })
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn get(&self, index: usize) -> Option<&LayerConfig> {
        self.layers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerConfig> {
        self.layers.iter()
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.layers.iter().position(|layer| layer.key == key)
    }

    pub fn layer_for(&self, kind: EntityKind) -> Option<usize> {
        self.by_kind.get(&kind).copied()
    }
}
