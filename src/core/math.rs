// Math utilities and helper functions

use glam::{Quat, Vec3};

/// Direction a character faces when its rotation is identity
pub const FORWARD: Vec3 = Vec3::NEG_Z;

/// Clamp a value between min and max
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Rotation about the world up axis
pub fn yaw_rotation(yaw: f32) -> Quat {
    Quat::from_rotation_y(yaw)
}

/// Extract the yaw (rotation about Y) from a rotation
pub fn yaw_of(rotation: Quat) -> f32 {
    let facing = rotation * FORWARD;
    // FORWARD is -Z, so yaw 0 points down -Z and positive yaw turns toward -X
    (-facing.x).atan2(-facing.z)
}
