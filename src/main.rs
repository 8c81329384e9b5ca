mod app;
mod engine;
mod graph;
mod layout;
mod util;

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::engine::EngineConfig;
use crate::engine::config::{PathShape, Projection};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProjectionArg {
    Orthographic,
    Perspective,
}

impl From<ProjectionArg> for Projection {
    fn from(value: ProjectionArg) -> Self {
        match value {
            ProjectionArg::Orthographic => Projection::Orthographic,
            ProjectionArg::Perspective => Projection::Perspective,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph JSON with `entities` and `edges`; the built-in demo graph is used when omitted.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Engine config JSON; missing fields fall back to defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    projection: Option<ProjectionArg>,

    /// Move the camera in a straight line instead of an arc.
    #[arg(long)]
    straight_path: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("layer_graph=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::read(path)?,
        None => EngineConfig::default(),
    };
    if let Some(projection) = args.projection {
        config.camera.projection = projection.into();
    }
    if args.straight_path {
        config.camera.path = PathShape::Straight;
    }
    config.validate().context("invalid engine configuration")?;

    tracing::info!(
        data = ?args.data,
        projection = ?config.camera.projection,
        layers = config.layers.len(),
        "starting viewer"
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let data = args.data;
    eframe::run_native(
        "layer-graph",
        options,
        Box::new(move |cc| Ok(Box::new(app::LayerGraphApp::new(cc, data, config)))),
    )
    .map_err(|error| anyhow!("{error}"))
}
