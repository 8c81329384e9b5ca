use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[serde(alias = "content_source")]
    Document,
    #[serde(alias = "chunk_cluster")]
    Cluster,
    #[serde(alias = "content_chunk")]
    Chunk,
}

impl EntityKind {
    pub const ALL: [Self; 3] = [Self::Document, Self::Cluster, Self::Chunk];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "document" | "content_source" => Some(Self::Document),
            "cluster" | "chunk_cluster" => Some(Self::Cluster),
            "chunk" | "content_chunk" => Some(Self::Chunk),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Cluster => "cluster",
            Self::Chunk => "chunk",
        }
    }
}

/// An sRGB colour parsed from `#rrggbb` or `#rgb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse_hex(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#').unwrap_or(value.trim());
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();

        match hex.len() {
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            3 => {
                let short = |index: usize| channel(index..index + 1).map(|value| value * 17);
                Some(Self::new(short(0)?, short(1)?, short(2)?))
            }
            _ => None,
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value).ok_or_else(|| format!("invalid colour `{value}`"))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EntityContent {
    pub title: String,
    pub summary: String,
    pub quote: String,
    pub keywords: Vec<String>,
    pub cluster_topics: Vec<String>,
}

/// Normalised emphasis scores; never used for layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EntityMetrics {
    pub canvas: f32,
    pub chat: f32,
    pub overall: f32,
}

impl EntityMetrics {
    pub fn clamped(self) -> Self {
        Self {
            canvas: self.canvas.clamp(0.0, 1.0),
            chat: self.chat.clamp(0.0, 1.0),
            overall: self.overall.clamp(0.0, 1.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SourceLocation {
    pub document_id: String,
    #[serde(default)]
    pub page_number: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: String,
    pub kind: EntityKind,
    pub parent_id: Option<String>,
    pub content: EntityContent,
    pub metrics: EntityMetrics,
    pub location: Option<SourceLocation>,
}

impl Entity {
    pub fn new(id: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            kind,
            parent_id: None,
            content: EntityContent::default(),
            metrics: EntityMetrics::default(),
            location: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.content.title = title.into();
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn display_title(&self) -> &str {
        if self.content.title.is_empty() {
            &self.id
        } else {
            &self.content.title
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinePattern {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowHead {
    #[default]
    None,
    #[serde(alias = "filled_arrow")]
    Filled,
    #[serde(alias = "open_arrow")]
    Open,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EdgeStyle {
    #[serde(alias = "line_type")]
    pub line: LinePattern,
    #[serde(alias = "line_weight")]
    pub weight: f32,
    pub color: Option<Rgb>,
    #[serde(alias = "arrow_head_start")]
    pub arrow_start: ArrowHead,
    #[serde(alias = "arrow_head_end")]
    pub arrow_end: ArrowHead,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            line: LinePattern::Solid,
            weight: 1.0,
            color: None,
            arrow_start: ArrowHead::None,
            arrow_end: ArrowHead::Filled,
        }
    }
}

/// Undirected for layout purposes; `start`/`end` only matter for arrow styling.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id: String,
    pub start: String,
    pub end: String,
    pub description: String,
    pub style: EdgeStyle,
}

impl Edge {
    pub fn new(id: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start: start.into(),
            end: end.into(),
            description: String::new(),
            style: EdgeStyle::default(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.start == node_id || self.end == node_id
    }
}

#[derive(Clone, Debug, Default)]
pub struct GraphData {
    pub entities: Vec<Entity>,
    pub edges: Vec<Edge>,
}

impl GraphData {
    pub fn index_by_id(&self) -> HashMap<String, usize> {
        self.entities
            .iter()
            .enumerate()
            .map(|(index, entity)| (entity.id.clone(), index))
            .collect()
    }

    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.entities
            .iter()
            .filter(|entity| entity.kind == kind)
            .count()
    }
}
