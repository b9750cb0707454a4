//! # Object Taxonomy — Type Tags
//!
//! Every entity in the graph carries an [`ObjectType`] tag. The tag is a
//! closed enumeration doing two jobs: runtime capability dispatch (there is
//! no reflection — construction and cloning are `match`es over this enum) and
//! re-materializing the correct concrete variant when a record is loaded.
//!
//! Tags are persisted as their `u32` ordinal, so the discriminant values are
//! part of the project file format and must not be reordered.

use thiserror::Error;

/// The closed set of object variants.
///
/// `Texture` through `Scene` are assets (owned by the
/// [`Registry`](crate::registry::Registry)); `Node` through `CameraNode` are
/// scene-graph nodes (owned by exactly one parent node or scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ObjectType {
    Invalid = 0,
    Texture = 1,
    Mesh = 2,
    Material = 3,
    Scene = 4,
    Node = 5,
    MeshNode = 6,
    LightNode = 7,
    CameraNode = 8,
}

impl ObjectType {
    /// Recover a tag from its persisted ordinal. `None` for out-of-range values.
    pub fn from_u32(value: u32) -> Option<ObjectType> {
        Some(match value {
            0 => ObjectType::Invalid,
            1 => ObjectType::Texture,
            2 => ObjectType::Mesh,
            3 => ObjectType::Material,
            4 => ObjectType::Scene,
            5 => ObjectType::Node,
            6 => ObjectType::MeshNode,
            7 => ObjectType::LightNode,
            8 => ObjectType::CameraNode,
            _ => return None,
        })
    }

    /// Display name used in logs and editors.
    pub fn name(self) -> &'static str {
        match self {
            ObjectType::Invalid => "Invalid",
            ObjectType::Texture => "Texture",
            ObjectType::Mesh => "Mesh",
            ObjectType::Material => "Material",
            ObjectType::Scene => "Scene",
            ObjectType::Node => "Node",
            ObjectType::MeshNode => "MeshNode",
            ObjectType::LightNode => "LightNode",
            ObjectType::CameraNode => "CameraNode",
        }
    }

    /// True for registry-owned variants.
    pub fn is_asset(self) -> bool {
        matches!(
            self,
            ObjectType::Texture | ObjectType::Mesh | ObjectType::Material | ObjectType::Scene
        )
    }

    /// True for scene-graph node variants.
    pub fn is_node(self) -> bool {
        matches!(
            self,
            ObjectType::Node | ObjectType::MeshNode | ObjectType::LightNode | ObjectType::CameraNode
        )
    }
}

/// Contract violations in object records and dispatch tables.
///
/// Records written by this crate's own serializer always carry a valid tag,
/// so hitting `InvalidType` on load means a corrupt or foreign file — it is
/// reported as a typed error, never an assertion and never a silent null.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// Carries the raw persisted value, `u64` so an out-of-range 64-bit
    /// tag is reported as written rather than truncated.
    #[error("invalid object type tag {0}")]
    InvalidType(u64),
    #[error("record is missing required header field '{0}'")]
    MissingHeader(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_round_trip() {
        for raw in 0..=8u32 {
            let ty = ObjectType::from_u32(raw).unwrap();
            assert_eq!(ty as u32, raw);
        }
        assert!(ObjectType::from_u32(9).is_none());
        assert!(ObjectType::from_u32(u32::MAX).is_none());
    }

    #[test]
    fn asset_and_node_partition() {
        let assets = [
            ObjectType::Texture,
            ObjectType::Mesh,
            ObjectType::Material,
            ObjectType::Scene,
        ];
        let nodes = [
            ObjectType::Node,
            ObjectType::MeshNode,
            ObjectType::LightNode,
            ObjectType::CameraNode,
        ];
        for ty in assets {
            assert!(ty.is_asset() && !ty.is_node());
        }
        for ty in nodes {
            assert!(ty.is_node() && !ty.is_asset());
        }
        assert!(!ObjectType::Invalid.is_asset());
        assert!(!ObjectType::Invalid.is_node());
    }
}
