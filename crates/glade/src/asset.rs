//! # Assets — Registry-Owned Entities
//!
//! An [`Asset`] is a top-level persisted entity: texture, mesh, material, or
//! scene. Assets live in the [`Registry`](crate::registry::Registry) behind
//! stable identifiers and are linked to from everywhere else by [`Uuid`]
//! value, never by ownership — a material holds texture *ids*, a mesh node
//! holds mesh and material *ids*. Dangling ids simply fail to resolve.
//!
//! Scenes are the one asset variant that owns structure: a forest of
//! [`Node`]s, held by value.

use bytemuck::{Pod, Zeroable};

use crate::ids::{Uuid, new_uuid};
use crate::math::{Mat4, Vec3, Vec4};
use crate::node::{Node, NodeKind};
use crate::object::{ObjectError, ObjectType};
use crate::serializer::Serializer;

// ── Variant payloads ─────────────────────────────────────────────────────

/// Raw RGBA8 pixels. Importers normalize every source image to four
/// channels, so `data.len() == width * height * 4` for imported textures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureAsset {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub channels: u32,
}

/// Interleaved mesh vertex. Plain arrays keep the layout `#[repr(C)]` and
/// padding-free (48 bytes) so vertex buffers can be persisted as raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub uv: [f32; 2],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshAsset {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// PBR material: scalar factors plus up to five optional texture
/// references, `Uuid::NONE` meaning "unset".
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialAsset {
    pub color: Vec4,
    pub emission: Vec3,
    pub metallic: f32,
    pub roughness: f32,
    pub color_map: Uuid,
    pub ao_map: Uuid,
    pub normal_map: Uuid,
    pub emission_map: Uuid,
    pub metallic_roughness_map: Uuid,
}

impl Default for MaterialAsset {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            emission: Vec3::ZERO,
            metallic: 0.0,
            roughness: 0.5,
            color_map: Uuid::NONE,
            ao_map: Uuid::NONE,
            normal_map: Uuid::NONE,
            emission_map: Uuid::NONE,
            metallic_roughness_map: Uuid::NONE,
        }
    }
}

/// A scene: an owned forest of root nodes plus lighting/tonemap settings
/// and a main-camera reference.
#[derive(Debug, Clone)]
pub struct SceneAsset {
    pub nodes: Vec<Node>,
    /// Id of the main [`CameraNode`](crate::node::CameraNode) inside
    /// `nodes`. Lazily created by [`ensure_main_camera`](SceneAsset::ensure_main_camera).
    pub main_camera: Uuid,
    pub ambient_color: Vec3,
    pub ambient_light: f32,
    pub exposure: f32,
}

impl Default for SceneAsset {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            main_camera: Uuid::NONE,
            ambient_color: Vec3::ONE,
            ambient_light: 0.01,
            exposure: 2.0,
        }
    }
}

impl SceneAsset {
    /// Attach a root node, making this scene its unique owner.
    pub fn add(&mut self, node: Node) -> Uuid {
        let id = node.uuid;
        self.nodes.push(node);
        id
    }

    /// Depth-first search of the whole forest.
    pub fn find(&self, uuid: Uuid) -> Option<&Node> {
        self.nodes.iter().find_map(|node| node.find(uuid))
    }

    pub fn find_mut(&mut self, uuid: Uuid) -> Option<&mut Node> {
        self.nodes.iter_mut().find_map(|node| node.find_mut(uuid))
    }

    /// Collect every node in the forest matching a tag.
    pub fn get_all(&self, ty: ObjectType) -> Vec<&Node> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.collect(ty, &mut out);
        }
        out
    }

    /// Detach a node (anywhere in the forest) from its unique owner and
    /// return it. The subtree below it goes with it.
    pub fn remove_node(&mut self, uuid: Uuid) -> Option<Node> {
        remove_from(&mut self.nodes, uuid)
    }

    /// Total node count across the forest.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(Node::subtree_len).sum()
    }

    /// Recompute cached world transforms for the whole forest. Roots get an
    /// identity parent transform.
    pub fn update_transforms(&mut self) {
        for node in &mut self.nodes {
            node.parent_transform = Mat4::IDENTITY;
            node.update_transforms();
        }
    }

    /// The main camera's id, creating a `CameraNode` on first access.
    ///
    /// This is a first-access side effect, not a pure query: when no live
    /// camera is referenced, a fresh one named "Main Camera" is appended to
    /// the scene's node list and becomes the main camera.
    pub fn ensure_main_camera(&mut self) -> Uuid {
        let live = self.main_camera.is_some()
            && self
                .find(self.main_camera)
                .is_some_and(|node| matches!(node.kind, NodeKind::Camera(_)));
        if !live {
            let camera = Node::with_kind(
                "Main Camera",
                Uuid::NONE,
                NodeKind::Camera(crate::node::CameraNode::default()),
            );
            self.main_camera = self.add(camera);
        }
        self.main_camera
    }
}

fn remove_from(nodes: &mut Vec<Node>, uuid: Uuid) -> Option<Node> {
    if let Some(index) = nodes.iter().position(|node| node.uuid == uuid) {
        return Some(nodes.remove(index));
    }
    nodes
        .iter_mut()
        .find_map(|node| remove_from(&mut node.children, uuid))
}

// ── Asset ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum AssetKind {
    Texture(TextureAsset),
    Mesh(MeshAsset),
    Material(MaterialAsset),
    Scene(SceneAsset),
}

/// A registry-owned entity: common identity record plus variant payload.
#[derive(Debug, Clone)]
pub struct Asset {
    pub uuid: Uuid,
    pub name: String,
    /// Set on creation and cloning; consumers clear it after re-uploading.
    pub dirty: bool,
    pub kind: AssetKind,
}

impl Asset {
    /// Dispatch-construct an asset variant from its type tag.
    ///
    /// A `Uuid::NONE` identifier allocates a fresh one. Node tags (and
    /// `Invalid`) are rejected with a typed error.
    pub fn create(ty: ObjectType, name: &str, uuid: Uuid) -> Result<Asset, ObjectError> {
        let kind = match ty {
            ObjectType::Texture => AssetKind::Texture(TextureAsset::default()),
            ObjectType::Mesh => AssetKind::Mesh(MeshAsset::default()),
            ObjectType::Material => AssetKind::Material(MaterialAsset::default()),
            ObjectType::Scene => AssetKind::Scene(SceneAsset::default()),
            other => return Err(ObjectError::InvalidType(other as u64)),
        };
        Ok(Asset {
            uuid: if uuid.is_none() { new_uuid() } else { uuid },
            name: name.to_string(),
            dirty: true,
            kind,
        })
    }

    /// The tag matching this asset's variant.
    pub fn object_type(&self) -> ObjectType {
        match self.kind {
            AssetKind::Texture(_) => ObjectType::Texture,
            AssetKind::Mesh(_) => ObjectType::Mesh,
            AssetKind::Material(_) => ObjectType::Material,
            AssetKind::Scene(_) => ObjectType::Scene,
        }
    }

    /// Walk this asset's fields through the bidirectional serializer (the
    /// record header is the caller's concern).
    pub fn serialize(&mut self, s: &mut Serializer<'_>) -> Result<(), ObjectError> {
        match &mut self.kind {
            AssetKind::Texture(texture) => {
                s.bulk("data", &mut texture.data);
                s.field("width", &mut texture.width);
                s.field("height", &mut texture.height);
                s.field("channels", &mut texture.channels);
            }
            AssetKind::Mesh(mesh) => {
                s.bulk("vertices", &mut mesh.vertices);
                s.bulk("indices", &mut mesh.indices);
            }
            AssetKind::Material(material) => {
                s.field("color", &mut material.color);
                s.field("emission", &mut material.emission);
                s.field("metallic", &mut material.metallic);
                s.field("roughness", &mut material.roughness);
                s.asset_ref("colorMap", &mut material.color_map);
                s.asset_ref("aoMap", &mut material.ao_map);
                s.asset_ref("normalMap", &mut material.normal_map);
                s.asset_ref("emissionMap", &mut material.emission_map);
                s.asset_ref("metallicRoughnessMap", &mut material.metallic_roughness_map);
            }
            AssetKind::Scene(scene) => {
                s.node_seq("nodes", &mut scene.nodes)?;
                s.asset_ref("mainCamera", &mut scene.main_camera);
                s.field("ambientLightColor", &mut scene.ambient_color);
                s.field("ambientLight", &mut scene.ambient_light);
                s.field("exposure", &mut scene.exposure);
            }
        }
        Ok(())
    }
}
