use crate::util::wrap_angle;

use super::config::RotationConfig;
use super::math::Vec3;

/// Whole-scene yaw: set directly while dragging, eased toward `target` otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationState {
    pub angle: f32,
    pub target: f32,
    dragging: bool,
    last_x: f32,
}

impl RotationState {
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn press(&mut self, x: f32) {
        self.dragging = true;
        self.last_x = x;
    }

    pub fn drag_to(&mut self, x: f32, sensitivity: f32) {
        if !self.dragging {
            return;
        }
        self.angle += (x - self.last_x) * sensitivity;
        self.target = self.angle;
        self.last_x = x;
    }

    pub fn release(&mut self) {
        self.dragging = false;
    }

    /// One easing tick. `inertia_rate` is per 60 Hz frame, rescaled by `dt`.
    pub fn step(&mut self, dt_secs: f32, config: &RotationConfig) {
        if self.dragging {
            return;
        }

        let diff = self.target - self.angle;
        if diff.abs() <= config.settle_epsilon {
            self.angle = self.target;
            return;
        }

        let frames = (dt_secs * 60.0).max(0.0);
        let factor = 1.0 - (1.0 - config.inertia_rate.clamp(0.0, 1.0)).powf(frames);
        self.angle += diff * factor;
    }

    /// Aims the shortest yaw that turns the node at unrotated `local` toward
    /// the camera, seen along `toward_camera` (camera position minus look-at).
    pub fn face(&mut self, local: Vec3, toward_camera: Vec3) {
        let front = toward_camera.azimuth();
        let node = local.azimuth();
        let diff = wrap_angle(front - node - self.angle);
        self.target = self.angle + diff;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingHover {
    layer: usize,
    remaining_ms: f32,
}

/// Delayed layer-hover. Scheduling replaces any pending hover; cancelling drops it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HoverDebounce {
    pending: Option<PendingHover>,
}

impl HoverDebounce {
    pub fn schedule(&mut self, layer: usize, delay_ms: f32) {
        self.pending = Some(PendingHover {
            layer,
            remaining_ms: delay_ms.max(0.0),
        });
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending_layer(&self) -> Option<usize> {
        self.pending.map(|pending| pending.layer)
    }

    /// Returns the layer once its delay has run out.
    pub fn tick(&mut self, dt_ms: f32) -> Option<usize> {
        let pending = self.pending.as_mut()?;
        pending.remaining_ms -= dt_ms.max(0.0);
        if pending.remaining_ms > 0.0 {
            return None;
        }

        let layer = pending.layer;
        self.pending = None;
        Some(layer)
    }
}

#[derive(Clone, Debug, Default)]
pub struct InteractionState {
    pub selected: Option<String>,
    pub hovered_node: Option<String>,
    pub hovered_layer: Option<usize>,
    pub focused_layer: Option<usize>,
    pub rotation: RotationState,
    pub(super) hover_timer: HoverDebounce,
}

impl InteractionState {
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn hovered_node(&self) -> Option<&str> {
        self.hovered_node.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    use super::*;
    use proptest::prelude::*;

    #[test]
    fn dragging_sets_angle_directly() {
        let config = RotationConfig::default();
        let mut rotation = RotationState::default();

        rotation.drag_to(100.0, config.sensitivity);
        assert_eq!(rotation.angle, 0.0);

        rotation.press(10.0);
        rotation.drag_to(110.0, config.sensitivity);
        assert!((rotation.angle - 0.5).abs() < 1e-6);
        assert_eq!(rotation.target, rotation.angle);

        rotation.step(1.0, &config);
        assert!((rotation.angle - 0.5).abs() < 1e-6);
    }

    #[test]
    fn inertia_eases_toward_target_after_release() {
        let config = RotationConfig::default();
        let mut rotation = RotationState {
            target: 1.0,
            ..RotationState::default()
        };

        rotation.step(1.0 / 60.0, &config);
        assert!((rotation.angle - 0.1).abs() < 1e-4);

        for _ in 0..600 {
            rotation.step(1.0 / 60.0, &config);
        }
        assert_eq!(rotation.angle, 1.0);
    }

    #[test]
    fn facing_takes_the_short_way_round() {
        let mut rotation = RotationState::default();
        let camera = Vec3::new(400.0, 290.0, 400.0);

        rotation.face(Vec3::new(70.0, 120.0, 0.0), camera);
        assert!((rotation.target + FRAC_PI_4).abs() < 1e-5);

        // Directly behind: |diff| never exceeds half a turn.
        rotation.angle = 0.0;
        rotation.face(Vec3::new(-10.0, 0.0, -10.0), camera);
        assert!(rotation.target.abs() <= PI + 1e-5);
    }

    #[test]
    fn facing_accounts_for_current_rotation() {
        let mut rotation = RotationState {
            angle: 10.0 * PI + FRAC_PI_2,
            target: 10.0 * PI + FRAC_PI_2,
            ..RotationState::default()
        };
        let local = Vec3::new(0.0, 0.0, 50.0);
        let camera = Vec3::new(0.0, 100.0, 300.0);

        rotation.face(local, camera);
        let turned = local.rotate_y(rotation.target);
        assert!(wrap_angle(turned.azimuth() - camera.azimuth()).abs() < 1e-4);
        assert!((rotation.target - rotation.angle).abs() <= PI + 1e-4);
    }

    #[test]
    fn hover_fires_after_delay_and_cancels_cleanly() {
        let mut debounce = HoverDebounce::default();
        debounce.schedule(2, 500.0);
        assert_eq!(debounce.tick(499.0), None);
        assert_eq!(debounce.pending_layer(), Some(2));
        assert_eq!(debounce.tick(1.0), Some(2));
        assert_eq!(debounce.tick(1000.0), None);

        debounce.schedule(1, 500.0);
        debounce.cancel();
        assert_eq!(debounce.tick(1000.0), None);

        debounce.schedule(0, 500.0);
        debounce.tick(400.0);
        debounce.schedule(1, 500.0);
        assert_eq!(debounce.tick(400.0), None);
        assert_eq!(debounce.tick(100.0), Some(1));
    }

    proptest! {
        #[test]
        fn face_target_lands_on_camera_azimuth(
            angle in -20.0f32..20.0,
            x in -200.0f32..200.0,
            z in -200.0f32..200.0,
        ) {
            prop_assume!(x.hypot(z) > 1.0);
            let camera = Vec3::new(400.0, 290.0, 400.0);
            let local = Vec3::new(x, 0.0, z);
            let mut rotation = RotationState { angle, target: angle, ..RotationState::default() };

            rotation.face(local, camera);
            prop_assert!((rotation.target - angle).abs() <= PI + 1e-3);
            let facing = local.rotate_y(rotation.target).azimuth();
            prop_assert!(wrap_angle(facing - camera.azimuth()).abs() < 1e-2);
        }
    }
}
