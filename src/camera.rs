//! Camera: world offset applied to every draw call
//!
//! Two ways to move it:
//! - direct: `direct_set` pins the offset immediately (what `camera(x, y)`
//!   does, and how cartridges lock UI overlays to the screen)
//! - follow: `set_target` once per frame, then `update` glides the offset
//!   toward it through look-ahead, dead zone, lerp and map clamping
//!
//! Offsets and targets are both in top-left offset space: drawing at world
//! position p lands on screen at p - offset.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CameraConfigError;

/// Movement below this many pixels per frame counts as stationary
const STATIONARY_EPSILON: f32 = 0.001;

/// Follow configuration (`SetCameraOptions`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOptions {
    /// Fraction of the remaining distance covered per frame, in (0, 1]
    pub lerp: f32,
    /// Horizontal distance the target may drift before the camera moves
    pub dead_zone_w: f32,
    /// Vertical distance the target may drift before the camera moves
    pub dead_zone_h: f32,
    /// Bias applied in the direction of horizontal target movement
    pub look_ahead_x: f32,
    /// Bias applied in the direction of vertical target movement
    pub look_ahead_y: f32,
    /// Never follow vertically
    pub horizontal_only: bool,
    pub clamp_to_map: bool,
    /// World width in pixels
    pub map_width: f32,
    /// World height in pixels
    pub map_height: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            lerp: 1.0,
            dead_zone_w: 0.0,
            dead_zone_h: 0.0,
            look_ahead_x: 0.0,
            look_ahead_y: 0.0,
            horizontal_only: false,
            clamp_to_map: false,
            // Full PICO-8 map: 128x64 cells of 8px
            map_width: 1024.0,
            map_height: 512.0,
        }
    }
}

impl CameraOptions {
    /// Errors that reject the options outright. Lerp is checked separately
    /// because it has a fallback.
    pub fn check_structure(&self) -> Result<(), CameraConfigError> {
        // NaN fails the >= comparison
        if !(self.dead_zone_w >= 0.0 && self.dead_zone_h >= 0.0) {
            return Err(CameraConfigError::NegativeDeadZone {
                w: self.dead_zone_w,
                h: self.dead_zone_h,
            });
        }
        if self.clamp_to_map && !(self.map_width > 0.0 && self.map_height > 0.0) {
            return Err(CameraConfigError::InvalidMapSize {
                width: self.map_width,
                height: self.map_height,
            });
        }
        Ok(())
    }

    pub fn lerp_in_range(&self) -> bool {
        self.lerp > 0.0 && self.lerp <= 1.0
    }
}

/// Where the camera is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Uninitialized,
    /// Options set or offset pinned; not following anything
    Configured,
    /// Gliding toward a target every frame
    Following,
}

/// Saved follow position, see `Camera::follow_state`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowState {
    current: (f32, f32),
    target: (f32, f32),
    last_target: Option<(f32, f32)>,
}

#[derive(Debug, Clone)]
pub struct Camera {
    current: (f32, f32),
    target: (f32, f32),
    last_target: Option<(f32, f32)>,
    has_target: bool,
    options: CameraOptions,
    mode: CameraMode,
    screen_w: f32,
    screen_h: f32,
}

impl Camera {
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            current: (0.0, 0.0),
            target: (0.0, 0.0),
            last_target: None,
            has_target: false,
            options: CameraOptions::default(),
            mode: CameraMode::Uninitialized,
            screen_w: screen_width as f32,
            screen_h: screen_height as f32,
        }
    }

    /// Apply new follow options.
    ///
    /// Structural errors keep the previous options. An out-of-range lerp is
    /// replaced by 1.0 and the rest of the options still apply. Either way
    /// the error is logged and returned; the camera keeps working.
    pub fn set_options(&mut self, options: CameraOptions) -> Result<(), CameraConfigError> {
        if let Err(err) = options.check_structure() {
            warn!(%err, "camera options rejected");
            return Err(err);
        }

        let mut options = options;
        let mut result = Ok(());
        if !options.lerp_in_range() {
            let err = CameraConfigError::InvalidLerp(options.lerp);
            warn!(%err, "camera lerp corrected");
            options.lerp = 1.0;
            result = Err(err);
        }

        self.options = options;
        if self.mode == CameraMode::Uninitialized {
            self.mode = CameraMode::Configured;
        }
        self.current = self.clamped(self.current);
        result
    }

    pub fn options(&self) -> &CameraOptions {
        &self.options
    }

    /// Record this frame's follow target. Does not move the camera.
    pub fn set_target(&mut self, x: f32, y: f32) {
        self.target = (x, y);
        self.has_target = true;
    }

    /// Target a world point so it sits at the centre of the screen
    pub fn center_on(&mut self, x: f32, y: f32) {
        self.set_target(x - self.screen_w / 2.0, y - self.screen_h / 2.0);
    }

    pub fn target(&self) -> (f32, f32) {
        self.target
    }

    /// Advance the follow algorithm by one frame. An unconfigured camera
    /// never follows; `set_options` or `direct_set` configures it.
    pub fn update(&mut self) {
        if !self.has_target || self.mode == CameraMode::Uninitialized {
            return;
        }
        let opts = self.options;
        let (tx, ty) = self.target;

        let (bias_x, bias_y) = match self.last_target {
            Some((lx, ly)) => (
                look_ahead(tx - lx, opts.look_ahead_x),
                look_ahead(ty - ly, opts.look_ahead_y),
            ),
            None => (0.0, 0.0),
        };
        self.last_target = Some(self.target);

        let (cx, cy) = self.current;
        let desired_x = dead_zone(cx, tx + bias_x, opts.dead_zone_w);
        let mut next = (cx + (desired_x - cx) * opts.lerp, cy);
        if !opts.horizontal_only {
            let desired_y = dead_zone(cy, ty + bias_y, opts.dead_zone_h);
            next.1 = cy + (desired_y - cy) * opts.lerp;
        }

        self.current = self.clamped(next);
        self.mode = CameraMode::Following;
    }

    /// Pin the offset immediately, no smoothing. Clamping still applies.
    pub fn direct_set(&mut self, x: f32, y: f32) {
        self.current = self.clamped((x, y));
        self.target = self.current;
        self.last_target = None;
        self.has_target = false;
        self.mode = CameraMode::Configured;
    }

    /// `camera()` with no arguments
    pub fn reset(&mut self) {
        self.direct_set(0.0, 0.0);
    }

    pub fn offset(&self) -> (f32, f32) {
        self.current
    }

    /// Offset as whole pixels (floored)
    pub fn pixel_offset(&self) -> (i32, i32) {
        (self.current.0.floor() as i32, self.current.1.floor() as i32)
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn is_following(&self) -> bool {
        self.has_target
    }

    /// Follow position and history, or None when not following
    pub fn follow_state(&self) -> Option<FollowState> {
        self.has_target.then_some(FollowState {
            current: self.current,
            target: self.target,
            last_target: self.last_target,
        })
    }

    /// Go back to following from a saved state. Options are left alone and
    /// a target set since the save is kept.
    pub fn resume_follow(&mut self, state: FollowState) {
        self.current = self.clamped(state.current);
        if !self.has_target {
            self.target = state.target;
        }
        self.last_target = state.last_target;
        self.has_target = true;
        self.mode = CameraMode::Following;
    }

    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.screen_w = width as f32;
        self.screen_h = height as f32;
        self.current = self.clamped(self.current);
    }

    fn clamped(&self, (x, y): (f32, f32)) -> (f32, f32) {
        if !self.options.clamp_to_map {
            return (x, y);
        }
        let max_x = (self.options.map_width - self.screen_w).max(0.0);
        let max_y = (self.options.map_height - self.screen_h).max(0.0);
        (x.clamp(0.0, max_x), y.clamp(0.0, max_y))
    }
}

/// Desired offset on one axis: hold still while the goal is inside the
/// zone, otherwise pull the goal back to the zone edge.
fn dead_zone(current: f32, goal: f32, zone: f32) -> f32 {
    let diff = goal - current;
    if diff.abs() <= zone {
        current
    } else {
        goal - zone.copysign(diff)
    }
}

fn look_ahead(movement: f32, amount: f32) -> f32 {
    if movement.abs() < STATIONARY_EPSILON {
        0.0
    } else {
        amount.copysign(movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn follow(options: CameraOptions) -> Camera {
        let mut camera = Camera::new(256, 128);
        camera.set_options(options).unwrap();
        camera
    }

    #[test]
    fn test_starts_uninitialized_at_origin() {
        let camera = Camera::new(128, 128);
        assert_eq!(camera.mode(), CameraMode::Uninitialized);
        assert_eq!(camera.offset(), (0.0, 0.0));
    }

    #[test]
    fn test_state_transitions() {
        let mut camera = Camera::new(128, 128);
        camera.set_options(CameraOptions::default()).unwrap();
        assert_eq!(camera.mode(), CameraMode::Configured);
        camera.set_target(10.0, 0.0);
        assert_eq!(camera.mode(), CameraMode::Configured);
        camera.update();
        assert_eq!(camera.mode(), CameraMode::Following);
        camera.direct_set(3.0, 4.0);
        assert_eq!(camera.mode(), CameraMode::Configured);
    }

    #[test]
    fn test_set_target_does_not_move() {
        let mut camera = follow(CameraOptions::default());
        camera.set_target(50.0, 50.0);
        assert_eq!(camera.offset(), (0.0, 0.0));
        assert_eq!(camera.target(), (50.0, 50.0));
    }

    #[test]
    fn test_dead_zone_holds_then_moves() {
        let mut camera = follow(CameraOptions {
            dead_zone_w: 32.0,
            ..CameraOptions::default()
        });
        camera.set_target(20.0, 0.0);
        camera.update();
        assert_eq!(camera.offset().0, 0.0);

        camera.set_target(40.0, 0.0);
        camera.update();
        assert!(camera.offset().0 > 0.0);
        // Pulled to the edge of the zone
        assert_eq!(camera.offset().0, 8.0);
    }

    #[test]
    fn test_lerp_smooths_exponentially() {
        let mut camera = follow(CameraOptions {
            lerp: 0.5,
            ..CameraOptions::default()
        });
        camera.set_target(100.0, 0.0);
        camera.update();
        assert_eq!(camera.offset().0, 50.0);
        camera.update();
        assert_eq!(camera.offset().0, 75.0);
    }

    #[test]
    fn test_clamp_to_map() {
        let mut camera = Camera::new(256, 128);
        camera
            .set_options(CameraOptions {
                clamp_to_map: true,
                map_width: 512.0,
                map_height: 512.0,
                ..CameraOptions::default()
            })
            .unwrap();
        camera.set_target(1000.0, -50.0);
        for _ in 0..3 {
            camera.update();
            assert!(camera.offset().0 <= 256.0);
        }
        assert_eq!(camera.offset(), (256.0, 0.0));
    }

    #[test]
    fn test_clamp_collapses_when_map_smaller_than_screen() {
        let mut camera = Camera::new(256, 128);
        camera
            .set_options(CameraOptions {
                clamp_to_map: true,
                map_width: 100.0,
                map_height: 100.0,
                ..CameraOptions::default()
            })
            .unwrap();
        camera.set_target(40.0, 40.0);
        camera.update();
        assert_eq!(camera.offset(), (0.0, 0.0));
        camera.direct_set(-5.0, 70.0);
        assert_eq!(camera.offset(), (0.0, 0.0));
    }

    #[test]
    fn test_look_ahead_follows_movement_and_drops_when_stationary() {
        let mut camera = follow(CameraOptions {
            look_ahead_x: 16.0,
            ..CameraOptions::default()
        });
        camera.set_target(0.0, 0.0);
        camera.update();
        assert_eq!(camera.offset().0, 0.0);

        camera.set_target(10.0, 0.0);
        camera.update();
        assert_eq!(camera.offset().0, 26.0);

        // Same target again: stationary, no bias
        camera.update();
        assert_eq!(camera.offset().0, 10.0);

        camera.set_target(5.0, 0.0);
        camera.update();
        assert_eq!(camera.offset().0, -11.0);
    }

    #[test]
    fn test_horizontal_only_ignores_y() {
        let mut camera = follow(CameraOptions {
            horizontal_only: true,
            ..CameraOptions::default()
        });
        camera.set_target(30.0, 90.0);
        camera.update();
        assert_eq!(camera.offset(), (30.0, 0.0));
    }

    #[test]
    fn test_invalid_lerp_falls_back_but_applies_rest() {
        let mut camera = Camera::new(128, 128);
        let err = camera
            .set_options(CameraOptions {
                lerp: 1.5,
                dead_zone_w: 4.0,
                ..CameraOptions::default()
            })
            .unwrap_err();
        assert_eq!(err, CameraConfigError::InvalidLerp(1.5));
        assert_eq!(camera.options().lerp, 1.0);
        assert_eq!(camera.options().dead_zone_w, 4.0);

        assert!(camera
            .set_options(CameraOptions {
                lerp: 0.0,
                ..CameraOptions::default()
            })
            .is_err());
        assert_eq!(camera.options().lerp, 1.0);
    }

    #[test]
    fn test_malformed_options_keep_last_known_good() {
        let mut camera = follow(CameraOptions {
            lerp: 0.25,
            ..CameraOptions::default()
        });
        let err = camera
            .set_options(CameraOptions {
                dead_zone_h: -1.0,
                ..CameraOptions::default()
            })
            .unwrap_err();
        assert!(matches!(err, CameraConfigError::NegativeDeadZone { .. }));
        assert_eq!(camera.options().lerp, 0.25);

        let err = camera
            .set_options(CameraOptions {
                clamp_to_map: true,
                map_width: 0.0,
                ..CameraOptions::default()
            })
            .unwrap_err();
        assert!(matches!(err, CameraConfigError::InvalidMapSize { .. }));
        assert!(!camera.options().clamp_to_map);
    }

    #[test]
    fn test_direct_set_bypasses_smoothing() {
        let mut camera = follow(CameraOptions {
            lerp: 0.1,
            ..CameraOptions::default()
        });
        camera.set_target(200.0, 200.0);
        for _ in 0..5 {
            camera.update();
        }
        camera.reset();
        assert_eq!(camera.offset(), (0.0, 0.0));
        assert_eq!(camera.target(), (0.0, 0.0));
        // No pending target: the next update keeps the pin
        camera.update();
        assert_eq!(camera.offset(), (0.0, 0.0));
    }

    #[test]
    fn test_center_on_and_pixel_offset() {
        let mut camera = follow(CameraOptions::default());
        camera.set_screen_size(128, 128);
        camera.center_on(100.5, 64.0);
        camera.update();
        assert_eq!(camera.offset(), (36.5, 0.0));
        assert_eq!(camera.pixel_offset(), (36, 0));
    }

    #[test]
    fn test_unconfigured_camera_does_not_follow() {
        let mut camera = Camera::new(128, 128);
        camera.set_target(40.0, 0.0);
        camera.update();
        assert_eq!(camera.mode(), CameraMode::Uninitialized);
        assert_eq!(camera.offset(), (0.0, 0.0));

        camera.set_options(CameraOptions::default()).unwrap();
        camera.update();
        assert_eq!(camera.mode(), CameraMode::Following);
        assert_eq!(camera.offset(), (40.0, 0.0));
    }

    #[test]
    fn test_resume_follow_keeps_new_options_and_target() {
        let mut camera = follow(CameraOptions {
            lerp: 0.5,
            ..CameraOptions::default()
        });
        camera.set_target(100.0, 0.0);
        camera.update();
        let saved = camera.follow_state().unwrap();

        camera.reset();
        assert_eq!(camera.follow_state(), None);
        camera
            .set_options(CameraOptions {
                lerp: 0.25,
                ..CameraOptions::default()
            })
            .unwrap();
        camera.resume_follow(saved);
        assert_eq!(camera.offset(), (50.0, 0.0));
        assert_eq!(camera.options().lerp, 0.25);
        assert_eq!(camera.target(), (100.0, 0.0));

        // A target set after the save wins over the saved one
        camera.reset();
        camera.set_target(10.0, 0.0);
        camera.resume_follow(saved);
        assert_eq!(camera.target(), (10.0, 0.0));
        assert_eq!(camera.mode(), CameraMode::Following);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let opts: CameraOptions =
            serde_json::from_str(r#"{"lerp": 0.2, "clamp_to_map": true}"#).unwrap();
        assert_eq!(opts.lerp, 0.2);
        assert!(opts.clamp_to_map);
        assert_eq!(opts.map_width, 1024.0);
        assert_eq!(opts.dead_zone_w, 0.0);
    }
}
