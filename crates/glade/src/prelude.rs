//! Convenience re-exports — `use glade::prelude::*` for the common items.

pub use crate::asset::{
    Asset, AssetKind, MaterialAsset, MeshAsset, SceneAsset, TextureAsset, Vertex,
};
pub use crate::ids::{Uuid, new_uuid};
pub use crate::math::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4, compose_trs};
pub use crate::node::{
    CameraMode, CameraNode, LightNode, LightType, MeshNode, Node, NodeKind, Projection,
    VolumetricType,
};
pub use crate::object::{ObjectError, ObjectType};
pub use crate::project::{ProjectError, apply_load_request, load_project, save_project};
pub use crate::registry::Registry;
pub use crate::serializer::{Dir, Serializer};
