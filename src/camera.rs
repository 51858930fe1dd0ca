//! Camera orientation helpers.
//!
//! When the remote behavior is reconfigured for mouse steering it resets its
//! own pitch/yaw unless they are pushed along with the new sensitivity. The
//! host supplies the current camera orientation through
//! [`CameraOrientation`] and [`recover_pitch_yaw`] turns it into the angles
//! the behavior expects.

use serde::{Deserialize, Serialize};

/// Unit quaternion, `[x, y, z, w]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `degrees` around a unit `axis`.
    pub fn from_axis_angle(axis: [f32; 3], degrees: f32) -> Self {
        let half = degrees.to_radians() * 0.5;
        let s = half.sin();
        Self::new(axis[0] * s, axis[1] * s, axis[2] * s, half.cos())
    }

    /// Euler angles in degrees, `[x, y, z]` (XYZ Tait-Bryan).
    pub fn to_euler_degrees(&self) -> [f32; 3] {
        let Quat { x, y, z, w } = *self;

        let sinr_cosp = 2.0 * (w * x + y * z);
        let cosr_cosp = 1.0 - 2.0 * (x * x + y * y);
        let ex = sinr_cosp.atan2(cosr_cosp);

        let sinp = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0);
        let ey = sinp.asin();

        let siny_cosp = 2.0 * (w * z + x * y);
        let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
        let ez = siny_cosp.atan2(cosy_cosp);

        [ex.to_degrees(), ey.to_degrees(), ez.to_degrees()]
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Pitch and yaw in degrees, as the remote character controller expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchYaw {
    pub pitch: f32,
    pub yaw: f32,
}

/// Converts a camera orientation into controller pitch/yaw.
///
/// When the roll component is outside `(-90, 90)` the Euler decomposition has
/// flipped, so pitch is folded back by 180 degrees and yaw is mirrored.
pub fn recover_pitch_yaw(q: Quat) -> PitchYaw {
    let [ex, ey, ez] = q.to_euler_degrees();

    if ez > -90.0 && ez < 90.0 {
        PitchYaw {
            pitch: ex,
            yaw: 180.0 + ey,
        }
    } else {
        let pitch = if ex > 0.0 { ex - 180.0 } else { ex + 180.0 };
        PitchYaw { pitch, yaw: -ey }
    }
}

/// Read access to the active camera's world orientation.
pub trait CameraOrientation {
    /// `None` when no camera is attached yet.
    fn orientation(&self) -> Option<Quat>;
}

/// A camera that never moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedCamera(pub Quat);

impl CameraOrientation for FixedCamera {
    fn orientation(&self) -> Option<Quat> {
        Some(self.0)
    }
}
