use std::f32::consts::TAU;

use crate::engine::config::LayerSet;
use crate::engine::math::Vec3;
use crate::graph::Entity;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub entity: usize,
    pub layer: usize,
    /// Unrotated scene position; scene yaw is applied at composition time.
    pub position: Vec3,
}

pub fn layer_radius(layers: &LayerSet, layer: usize, focused: Option<usize>, focus_scale: f32) -> f32 {
    let base = layers.get(layer).map(|config| config.radius).unwrap_or(0.0);
    if focused == Some(layer) {
        base * focus_scale
    } else {
        base
    }
}

/// Places every entity on its layer's ring at `θ = i / n · 2π`, in input order.
///
/// Pure: the same entities, layers and focus always give the same placements.
pub fn layered_layout(
    entities: &[Entity],
    layers: &LayerSet,
    focused: Option<usize>,
    focus_scale: f32,
) -> Vec<Placement> {
    let layer_of = entities
        .iter()
        .map(|entity| layers.layer_for(entity.kind))
        .collect::<Vec<_>>();

    let mut counts = vec![0usize; layers.len()];
    for layer in layer_of.iter().flatten() {
        counts[*layer] += 1;
    }

    let mut next_slot = vec![0usize; layers.len()];
    let mut placements = Vec::with_capacity(entities.len());
    for (entity, layer) in layer_of.into_iter().enumerate() {
        let Some(layer) = layer else {
            continue;
        };
        let Some(config) = layers.get(layer) else {
            continue;
        };

        let n = counts[layer];
        let slot = next_slot[layer];
        next_slot[layer] += 1;

        let angle = (slot as f32 / n as f32) * TAU;
        let radius = layer_radius(layers, layer, focused, focus_scale);
        placements.push(Placement {
            entity,
            layer,
            position: Vec3::new(radius * angle.cos(), config.y, radius * angle.sin()),
        });
    }

    placements
}
