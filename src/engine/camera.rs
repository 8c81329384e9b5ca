use crate::util::lerp;

use super::config::{CameraConfig, PathShape, Projection, ZoomBands};
use super::math::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    /// Orthographic zoom factor; in perspective it divides the field of view.
    pub zoom: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMode {
    Overview,
    Focused(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraEvent {
    /// The running transition reached its target and the camera snapped onto it.
    Settled(CameraMode),
}

/// What the orchestrator needs to know about a layer to frame it.
#[derive(Clone, Copy, Debug)]
pub struct FocusFrame {
    pub layer_y: f32,
    pub layer_radius: f32,
    pub node_count: usize,
}

/// Focus zoom for a layer holding `node_count` nodes.
///
/// The layer radius is accepted for parity with callers that know it, but the
/// banding only looks at the count.
pub fn dynamic_zoom(node_count: usize, _layer_radius: f32, base: f32, bands: &ZoomBands) -> f32 {
    if node_count <= bands.few_max {
        base * bands.few_multiplier
    } else if node_count <= bands.medium_max {
        base
    } else {
        let excess = (node_count - bands.medium_max) as f32;
        base * (1.0 - excess * bands.step).max(bands.floor)
    }
}

#[derive(Clone, Copy, Debug)]
struct Transition {
    from: CameraPose,
    to: CameraPose,
    to_mode: CameraMode,
    elapsed_ms: f32,
}

#[derive(Clone, Copy, Debug)]
enum Phase {
    Steady,
    Animating(Transition),
}

#[derive(Clone, Debug)]
pub struct CameraOrchestrator {
    config: CameraConfig,
    bands: ZoomBands,
    pose: CameraPose,
    settled: CameraMode,
    requested: CameraMode,
    phase: Phase,
    snapshot: Option<CameraPose>,
}

impl CameraOrchestrator {
    pub fn new(config: CameraConfig, bands: ZoomBands) -> Self {
        let pose = default_pose(&config);
        Self {
            config,
            bands,
            pose,
            settled: CameraMode::Overview,
            requested: CameraMode::Overview,
            phase: Phase::Steady,
            snapshot: None,
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Last steady state reached. While animating this is the state being left.
    pub fn mode(&self) -> CameraMode {
        self.settled
    }

    /// Destination of the running animation, or the steady state.
    pub fn requested(&self) -> CameraMode {
        self.requested
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Option<CameraPose> {
        self.snapshot
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Animating(_))
    }

    pub fn eased_progress(&self) -> Option<f32> {
        match self.phase {
            Phase::Steady => None,
            Phase::Animating(transition) => Some(self.config.easing.apply(self.progress(&transition))),
        }
    }

    pub fn transform(&self) -> CameraTransform {
        CameraTransform {
            pose: self.pose,
            projection: self.config.projection,
            fov_degrees: self.config.fov_degrees,
        }
    }

    /// Starts a transition onto `layer`. Returns `false` when that layer is
    /// already the requested destination.
    pub fn focus_layer(&mut self, layer: usize, frame: FocusFrame) -> bool {
        let mode = CameraMode::Focused(layer);
        if self.requested == mode {
            return false;
        }

        if self.requested == CameraMode::Overview && self.snapshot.is_none() {
            self.snapshot = Some(self.pose);
        }

        let center = Vec3::new(0.0, frame.layer_y, 0.0);
        let to = CameraPose {
            position: center + Vec3::new(0.0, self.config.effective_focus_height(), 0.0),
            target: center,
            zoom: dynamic_zoom(
                frame.node_count,
                frame.layer_radius,
                self.config.base_focus_zoom,
                &self.bands,
            ),
        };
        self.start(to, mode);
        true
    }

    /// Starts a transition back to the pre-focus pose, or the default pose
    /// when no snapshot was taken.
    pub fn return_to_overview(&mut self) -> bool {
        if self.requested == CameraMode::Overview {
            return false;
        }

        let to = self.snapshot.unwrap_or_else(|| default_pose(&self.config));
        self.start(to, CameraMode::Overview);
        true
    }

    fn start(&mut self, to: CameraPose, to_mode: CameraMode) {
        self.requested = to_mode;
        self.phase = Phase::Animating(Transition {
            from: self.pose,
            to,
            to_mode,
            elapsed_ms: 0.0,
        });
    }

    fn progress(&self, transition: &Transition) -> f32 {
        (transition.elapsed_ms / self.config.transition_ms).clamp(0.0, 1.0)
    }

    pub fn advance(&mut self, dt_ms: f32) -> Option<CameraEvent> {
        let Phase::Animating(mut transition) = self.phase else {
            return None;
        };

        transition.elapsed_ms += dt_ms.max(0.0);
        let progress = self.progress(&transition);

        if progress >= 1.0 {
            self.pose = transition.to;
            self.settled = transition.to_mode;
            self.phase = Phase::Steady;
            if self.settled == CameraMode::Overview {
                self.snapshot = None;
            }
            return Some(CameraEvent::Settled(self.settled));
        }

        let eased = self.config.easing.apply(progress);
        self.pose = CameraPose {
            position: self.path_position(transition.from.position, transition.to.position, eased),
            target: transition.from.target.lerp(transition.to.target, eased),
            zoom: lerp(transition.from.zoom, transition.to.zoom, eased),
        };
        self.phase = Phase::Animating(transition);
        None
    }

    fn path_position(&self, from: Vec3, to: Vec3, eased: f32) -> Vec3 {
        match self.config.path {
            PathShape::Straight => from.lerp(to, eased),
            PathShape::Arched => {
                let peak = from.lerp(to, 0.5) + Vec3::new(0.0, self.config.arch_lift, 0.0);
                if eased < 0.5 {
                    from.lerp(peak, eased * 2.0)
                } else {
                    peak.lerp(to, (eased - 0.5) * 2.0)
                }
            }
        }
    }

    /// Scroll zoom. Ignored mid-transition.
    pub fn zoom_by(&mut self, factor: f32) -> bool {
        if self.is_animating() || !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        self.pose.zoom = (self.pose.zoom * factor).clamp(self.config.min_zoom, self.config.max_zoom);
        true
    }

    /// Screen-space pan, only in a steady overview.
    pub fn pan_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) -> bool {
        if self.is_animating() || self.settled != CameraMode::Overview {
            return false;
        }

        let transform = self.transform();
        let basis = transform.basis();
        let units = transform.units_per_pixel(viewport_height);
        let shift = basis.right * (-dx * units) + basis.up * (dy * units);
        self.pose.position += shift;
        self.pose.target += shift;
        true
    }
}

fn default_pose(config: &CameraConfig) -> CameraPose {
    CameraPose {
        position: config.position,
        target: config.target,
        zoom: config.zoom,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CameraBasis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

/// A point in screen space relative to the viewport centre, y pointing down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
    /// Pixels per world unit at this depth.
    pub scale: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTransform {
    pub pose: CameraPose,
    pub projection: Projection,
    pub fov_degrees: f32,
}

impl CameraTransform {
    pub fn basis(&self) -> CameraBasis {
        let mut forward = (self.pose.target - self.pose.position).normalized();
        if forward == Vec3::ZERO {
            forward = Vec3::new(0.0, 0.0, -1.0);
        }

        // Looking straight down leaves world up parallel to the view axis.
        let hint = if forward.cross(Vec3::UP).length() < 1e-4 {
            Vec3::new(0.0, 0.0, -1.0)
        } else {
            Vec3::UP
        };

        let right = forward.cross(hint).normalized();
        let up = right.cross(forward);
        CameraBasis { right, up, forward }
    }

    pub fn effective_fov(&self) -> f32 {
        (self.fov_degrees / self.pose.zoom.max(f32::EPSILON)).clamp(10.0, 120.0)
    }

    fn focal_length(&self, viewport_height: f32) -> f32 {
        (viewport_height * 0.5) / (self.effective_fov().to_radians() * 0.5).tan()
    }

    pub fn units_per_pixel(&self, viewport_height: f32) -> f32 {
        match self.projection {
            Projection::Orthographic => 1.0 / self.pose.zoom.max(f32::EPSILON),
            Projection::Perspective => {
                let distance = self.pose.position.distance(self.pose.target).max(1.0);
                distance / self.focal_length(viewport_height).max(f32::EPSILON)
            }
        }
    }

    /// `None` for points behind a perspective camera's near plane.
    pub fn project(&self, world: Vec3, viewport_height: f32) -> Option<Projected> {
        let basis = self.basis();
        let relative = world - self.pose.position;
        let x = relative.dot(basis.right);
        let y = relative.dot(basis.up);
        let depth = relative.dot(basis.forward);

        let scale = match self.projection {
            Projection::Orthographic => self.pose.zoom,
            Projection::Perspective => {
                if depth <= 1.0 {
                    return None;
                }
                self.focal_length(viewport_height) / depth
            }
        };

        Some(Projected {
            x: x * scale,
            y: -y * scale,
            depth,
            scale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const FRAME_MS: f32 = 1000.0 / 60.0;

    fn orchestrator() -> CameraOrchestrator {
        CameraOrchestrator::new(CameraConfig::default(), ZoomBands::default())
    }

    fn clusters() -> FocusFrame {
        FocusFrame {
            layer_y: 0.0,
            layer_radius: 100.0,
            node_count: 8,
        }
    }

    fn chunks() -> FocusFrame {
        FocusFrame {
            layer_y: -150.0,
            layer_radius: 120.0,
            node_count: 20,
        }
    }

    fn run_to_end(camera: &mut CameraOrchestrator) -> Option<CameraEvent> {
        for _ in 0..1000 {
            if let Some(event) = camera.advance(FRAME_MS) {
                return Some(event);
            }
        }
        None
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn zoom_bands_pin_their_boundaries() {
        let bands = ZoomBands::default();
        assert_eq!(dynamic_zoom(0, 70.0, 1.0, &bands), 1.5);
        assert_eq!(dynamic_zoom(5, 70.0, 1.0, &bands), 1.5);
        assert_eq!(dynamic_zoom(6, 70.0, 1.0, &bands), 1.0);
        assert_eq!(dynamic_zoom(8, 100.0, 1.0, &bands), 1.0);
        assert_eq!(dynamic_zoom(10, 100.0, 1.0, &bands), 1.0);
        assert!((dynamic_zoom(20, 120.0, 1.0, &bands) - 0.5).abs() < 1e-6);
        assert!((dynamic_zoom(20, 120.0, 2.0, &bands) - 1.0).abs() < 1e-6);
        assert_eq!(dynamic_zoom(1000, 120.0, 1.0, &bands), 0.3);
    }

    #[test]
    fn focus_then_back_restores_snapshot() {
        let mut camera = orchestrator();
        assert!(camera.zoom_by(1.25));
        let before = camera.pose();

        assert!(camera.focus_layer(1, clusters()));
        assert_eq!(camera.snapshot(), Some(before));
        assert_eq!(
            run_to_end(&mut camera),
            Some(CameraEvent::Settled(CameraMode::Focused(1)))
        );

        let focused = camera.pose();
        assert_eq!(focused.position, Vec3::new(0.0, 200.0, 0.0));
        assert_eq!(focused.target, Vec3::ZERO);
        assert_eq!(focused.zoom, 1.0);

        assert!(camera.return_to_overview());
        assert_eq!(
            run_to_end(&mut camera),
            Some(CameraEvent::Settled(CameraMode::Overview))
        );
        assert_eq!(camera.pose(), before);
        assert_eq!(camera.snapshot(), None);
    }

    #[test]
    fn repeated_focus_requests_do_not_restart() {
        let mut camera = orchestrator();
        assert!(camera.focus_layer(2, chunks()));
        camera.advance(300.0);
        let progress = camera.eased_progress().expect("animating");

        assert!(!camera.focus_layer(2, chunks()));
        assert_eq!(camera.eased_progress(), Some(progress));
    }

    #[test]
    fn switching_layers_keeps_the_first_snapshot() {
        let mut camera = orchestrator();
        let before = camera.pose();
        camera.focus_layer(1, clusters());
        run_to_end(&mut camera);

        assert!(camera.focus_layer(2, chunks()));
        assert_eq!(camera.snapshot(), Some(before));
        assert_eq!(
            run_to_end(&mut camera),
            Some(CameraEvent::Settled(CameraMode::Focused(2)))
        );
        assert!((camera.pose().zoom - 0.5).abs() < 1e-6);
        assert_eq!(camera.pose().target, Vec3::new(0.0, -150.0, 0.0));
    }

    #[test]
    fn refocusing_mid_return_keeps_the_original_snapshot() {
        let mut camera = orchestrator();
        let before = camera.pose();
        camera.focus_layer(1, clusters());
        run_to_end(&mut camera);

        camera.return_to_overview();
        camera.advance(500.0);
        assert!(camera.focus_layer(0, clusters()));
        assert_eq!(camera.snapshot(), Some(before));
    }

    #[test]
    fn return_without_snapshot_uses_default_pose() {
        let mut camera = orchestrator();
        assert!(!camera.return_to_overview());
        assert_eq!(camera.advance(FRAME_MS), None);

        camera.focus_layer(1, clusters());
        run_to_end(&mut camera);
        camera.snapshot = None;
        camera.return_to_overview();
        run_to_end(&mut camera);

        let config = CameraConfig::default();
        assert_eq!(camera.pose().position, config.position);
        assert_eq!(camera.pose().target, config.target);
    }

    #[test]
    fn arched_path_peaks_above_the_midpoint() {
        let mut camera = orchestrator();
        let start = camera.pose().position;
        camera.focus_layer(1, clusters());
        camera.advance(750.0);

        let end = Vec3::new(0.0, 200.0, 0.0);
        let peak = start.lerp(end, 0.5) + Vec3::new(0.0, 100.0, 0.0);
        assert!(close(camera.pose().position, peak));
    }

    #[test]
    fn straight_path_passes_through_the_midpoint() {
        let config = CameraConfig {
            path: PathShape::Straight,
            ..CameraConfig::default()
        };
        let mut camera = CameraOrchestrator::new(config, ZoomBands::default());
        let start = camera.pose().position;
        camera.focus_layer(1, clusters());
        camera.advance(750.0);

        assert!(close(
            camera.pose().position,
            start.lerp(Vec3::new(0.0, 200.0, 0.0), 0.5)
        ));
    }

    #[test]
    fn progress_is_monotonic_and_settles_exactly() {
        let mut camera = orchestrator();
        camera.focus_layer(2, chunks());

        let mut last = 0.0;
        let mut elapsed = 0.0;
        loop {
            let event = camera.advance(FRAME_MS);
            elapsed += FRAME_MS;
            match camera.eased_progress() {
                Some(progress) => {
                    assert!(progress >= last);
                    last = progress;
                }
                None => {
                    assert_eq!(event, Some(CameraEvent::Settled(CameraMode::Focused(2))));
                    break;
                }
            }
        }

        assert!(elapsed >= 1500.0);
        assert_eq!(camera.pose().position, Vec3::new(0.0, 50.0, 0.0));
        assert_eq!(camera.mode(), CameraMode::Focused(2));
    }

    #[test]
    fn zoom_is_ignored_while_animating_and_clamped() {
        let mut camera = orchestrator();
        assert!(camera.zoom_by(100.0));
        assert_eq!(camera.pose().zoom, 10.0);
        assert!(camera.zoom_by(0.0001));
        assert_eq!(camera.pose().zoom, 0.1);

        camera.focus_layer(0, clusters());
        assert!(!camera.zoom_by(2.0));
    }

    #[test]
    fn pan_only_moves_a_steady_overview() {
        let mut camera = orchestrator();
        let before = camera.pose();
        assert!(camera.pan_by_pixels(10.0, 0.0, 800.0));
        let after = camera.pose();
        assert!((after.position.distance(before.position) - 10.0).abs() < 1e-3);
        assert!(close(after.target - after.position, before.target - before.position));

        camera.focus_layer(1, clusters());
        assert!(!camera.pan_by_pixels(10.0, 0.0, 800.0));
        run_to_end(&mut camera);
        assert!(!camera.pan_by_pixels(10.0, 0.0, 800.0));
    }

    #[test]
    fn orthographic_projection_centres_the_target() {
        let camera = orchestrator();
        let transform = camera.transform();
        let projected = transform
            .project(CameraConfig::default().target, 600.0)
            .expect("orthographic always projects");
        assert!(projected.x.abs() < 1e-3);
        assert!(projected.y.abs() < 1e-3);

        let above = transform
            .project(CameraConfig::default().target + Vec3::UP * 10.0, 600.0)
            .expect("projects");
        assert!(above.y < 0.0);
    }

    #[test]
    fn top_down_view_has_a_stable_basis() {
        let transform = CameraTransform {
            pose: CameraPose {
                position: Vec3::new(0.0, 200.0, 0.0),
                target: Vec3::ZERO,
                zoom: 1.0,
            },
            projection: Projection::Orthographic,
            fov_degrees: 50.0,
        };
        let basis = transform.basis();
        assert!(close(basis.right, Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(basis.up, Vec3::new(0.0, 0.0, -1.0)));

        let projected = transform.project(Vec3::new(70.0, 0.0, 0.0), 600.0).expect("projects");
        assert!((projected.x - 70.0).abs() < 1e-3);
    }

    #[test]
    fn perspective_drops_points_behind_the_camera() {
        let transform = CameraTransform {
            pose: CameraPose {
                position: Vec3::new(0.0, 0.0, 100.0),
                target: Vec3::ZERO,
                zoom: 1.0,
            },
            projection: Projection::Perspective,
            fov_degrees: 50.0,
        };
        assert!(transform.project(Vec3::new(0.0, 0.0, 200.0), 600.0).is_none());

        let near = transform.project(Vec3::new(10.0, 0.0, 50.0), 600.0).expect("in front");
        let far = transform.project(Vec3::new(10.0, 0.0, -50.0), 600.0).expect("in front");
        assert!(near.scale > far.scale);
        assert!(near.x > far.x);
    }

    proptest! {
        #[test]
        fn zoom_never_drops_below_the_floor(count in 0usize..10_000, base in 0.1f32..5.0) {
            let bands = ZoomBands::default();
            prop_assert!(dynamic_zoom(count, 100.0, base, &bands) >= base * bands.floor - 1e-6);
        }

        #[test]
        fn round_trip_restores_any_manual_zoom(zoom in 0.1f32..10.0, layer in 0usize..3) {
            let mut camera = orchestrator();
            camera.zoom_by(zoom);
            let before = camera.pose();

            camera.focus_layer(layer, clusters());
            run_to_end(&mut camera);
            camera.return_to_overview();
            run_to_end(&mut camera);
            prop_assert_eq!(camera.pose(), before);
        }
    }
}
