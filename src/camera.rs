use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{EulerRot, Quat, Vec3};

/// Pointer-lock glitches show up as single enormous deltas; anything above
/// this magnitude is dropped wholesale.
const MOTION_OUTLIER_THRESHOLD: f32 = 100.0;
const MAX_PITCH: f32 = FRAC_PI_2 - 0.05;
const DELTA_SCALE: f32 = 0.002;

/// First-person camera. Yaw is kept wrapped in (-pi, pi] so orientation
/// never accumulates drift over a long session; pitch is clamped short of
/// straight up/down.
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub sensitivity: f32,
}

impl Camera {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            sensitivity,
        }
    }

    /// Apply one frame of pointer motion.
    pub fn look(&mut self, mouse_dx: f32, mouse_dy: f32) {
        if mouse_dx.abs() > MOTION_OUTLIER_THRESHOLD || mouse_dy.abs() > MOTION_OUTLIER_THRESHOLD {
            return;
        }

        let scale = self.sensitivity * DELTA_SCALE;
        self.yaw -= mouse_dx * scale;
        while self.yaw > PI {
            self.yaw -= TAU;
        }
        while self.yaw < -PI {
            self.yaw += TAU;
        }

        self.pitch = (self.pitch - mouse_dy * scale).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Horizontal walk direction for the current yaw.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Full look orientation (yaw then pitch, no roll).
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Full look direction including pitch.
    pub fn front(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    /// Used on room switches and teleports.
    pub fn reset_orientation(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaw_wraps_into_half_open_range() {
        let mut camera = Camera::new(0.5);
        for _ in 0..10_000 {
            camera.look(17.0, 0.0);
        }
        assert!(camera.yaw > -PI && camera.yaw <= PI, "yaw {}", camera.yaw);
    }

    #[test]
    fn pitch_clamps_short_of_vertical() {
        let mut camera = Camera::new(0.5);
        for _ in 0..5_000 {
            camera.look(0.0, -90.0);
        }
        assert!((camera.pitch - MAX_PITCH).abs() < 1e-6);
        for _ in 0..10_000 {
            camera.look(0.0, 90.0);
        }
        assert!((camera.pitch + MAX_PITCH).abs() < 1e-6);
    }

    #[test]
    fn outlier_deltas_are_dropped() {
        let mut camera = Camera::new(0.5);
        camera.look(500.0, -300.0);
        assert_eq!(camera.yaw, 0.0);
        assert_eq!(camera.pitch, 0.0);
    }

    #[test]
    fn zero_yaw_faces_negative_z() {
        let camera = Camera::new(0.5);
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(camera.front().abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }
}
