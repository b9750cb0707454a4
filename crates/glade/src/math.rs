//! Math helpers and glam re-exports.
//!
//! Node transforms are authored as position / Euler-degree rotation / scale
//! triples and composed into matrices here. Re-exporting [glam](https://docs.rs/glam)
//! keeps callers off a direct dependency.

pub use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};

/// Compose a local transform from authored TRS fields.
///
/// Order is **translate × rotate × scale** (what
/// [`Mat4::from_scale_rotation_translation`] produces). Rotation is Euler
/// degrees converted to a quaternion with `YXZ` order (yaw, pitch, roll)
/// before composing, so the stored fields stay human-editable in degrees
/// without gimbal ambiguity in the composition itself.
pub fn compose_trs(position: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Mat4 {
    let rotation = Quat::from_euler(
        EulerRot::YXZ,
        rotation_degrees.y.to_radians(),
        rotation_degrees.x.to_radians(),
        rotation_degrees.z.to_radians(),
    );
    Mat4::from_scale_rotation_translation(scale, rotation, position)
}
