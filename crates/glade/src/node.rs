//! # Scene Nodes — Hierarchy, Transforms, and Cloning
//!
//! A [`Node`] is a spatial element owned by exactly one parent node or one
//! scene asset — children are held by value, so the ownership forest is
//! acyclic by construction and a node can never appear as its own
//! descendant.
//!
//! Each node authors a local position / Euler-degree rotation / scale and
//! caches two derived matrices: the transform supplied by its parent and its
//! own world transform. [`Node::update_transforms`] recomputes the cache
//! top-down; scenes seed their roots with identity. The cache is never
//! authoritative — re-run the pass before reading world transforms.
//!
//! [`Node::clone_subtree`] is the clone engine: a structural deep copy with
//! entirely fresh identifiers throughout, scalar fields copied verbatim, and
//! asset references (mesh, material) shared by id rather than duplicated.

use serde::{Deserialize, Serialize};

use crate::ids::{Uuid, new_uuid};
use crate::math::{Mat4, Vec3, compose_trs};
use crate::object::{ObjectError, ObjectType};
use crate::serializer::Serializer;

// ── Variant payloads ─────────────────────────────────────────────────────

/// Mesh + material references. Both are shared assets, never owned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshNode {
    pub mesh: Uuid,
    pub material: Uuid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightType {
    #[default]
    Point,
    Spot,
    Directional,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumetricType {
    Disabled,
    #[default]
    ScreenSpace,
    ShadowMap,
}

/// Light parameters, including shadow-map reach and the screen-space
/// volumetric settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LightNode {
    pub light_type: LightType,
    pub color: Vec3,
    pub intensity: f32,
    pub radius: f32,
    pub inner_angle: f32,
    pub outer_angle: f32,
    pub shadow_map_range: f32,
    pub shadow_map_far: f32,
    pub volumetric_type: VolumetricType,
    pub volumetric_absorption: f32,
    pub volumetric_samples: u32,
}

impl Default for LightNode {
    fn default() -> Self {
        Self {
            light_type: LightType::Point,
            color: Vec3::ONE,
            intensity: 10.0,
            radius: 2.0,
            inner_angle: 60.0,
            outer_angle: 50.0,
            shadow_map_range: 3.0,
            shadow_map_far: 2000.0,
            volumetric_type: VolumetricType::ScreenSpace,
            volumetric_absorption: 0.5,
            volumetric_samples: 128,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    #[default]
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    #[default]
    Orbit,
    Fly,
}

/// Camera parameters. `jitter_index` is runtime TAA phase and is not
/// persisted; only the `use_jitter` switch survives a save.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraNode {
    pub projection: Projection,
    pub mode: CameraMode,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub ortho_near: f32,
    pub ortho_far: f32,
    pub zoom: f32,
    pub use_jitter: bool,
    pub jitter_index: u32,
}

impl Default for CameraNode {
    fn default() -> Self {
        Self {
            projection: Projection::Perspective,
            mode: CameraMode::Orbit,
            fov: 60.0,
            near: 0.01,
            far: 1000.0,
            ortho_near: -100.0,
            ortho_far: 10.0,
            zoom: 10.0,
            use_jitter: true,
            jitter_index: 0,
        }
    }
}

/// Node variant payload. `Plain` nodes are pure grouping transforms.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Plain,
    Mesh(MeshNode),
    Light(LightNode),
    Camera(CameraNode),
}

// ── Node ─────────────────────────────────────────────────────────────────

/// A scene-graph element with identity, a local TRS, cached derived
/// transforms, and owned children.
#[derive(Debug, Clone)]
pub struct Node {
    pub uuid: Uuid,
    pub name: String,
    /// Set when the node is created or cloned; consumers clear it after
    /// re-uploading whatever they derive from this node.
    pub dirty: bool,

    pub position: Vec3,
    /// Euler angles in degrees, human-editable.
    pub rotation: Vec3,
    pub scale: Vec3,

    /// Cached world transform of the parent, identity for scene roots.
    pub parent_transform: Mat4,
    /// Cached `parent_transform * local`, valid after [`update_transforms`](Node::update_transforms).
    pub world_transform: Mat4,

    pub children: Vec<Node>,
    pub kind: NodeKind,
}

impl Node {
    /// Construct a plain grouping node with a fresh identifier.
    pub fn new(name: &str) -> Node {
        Node::with_kind(name, Uuid::NONE, NodeKind::Plain)
    }

    /// Dispatch-construct a node variant from its type tag.
    ///
    /// A `Uuid::NONE` identifier allocates a fresh one. Asset tags (and
    /// `Invalid`) are rejected with a typed error — this is the single
    /// construction point the loader goes through, so a corrupt tag can
    /// never silently materialize the wrong variant.
    pub fn create(ty: ObjectType, name: &str, uuid: Uuid) -> Result<Node, ObjectError> {
        let kind = match ty {
            ObjectType::Node => NodeKind::Plain,
            ObjectType::MeshNode => NodeKind::Mesh(MeshNode::default()),
            ObjectType::LightNode => NodeKind::Light(LightNode::default()),
            ObjectType::CameraNode => NodeKind::Camera(CameraNode::default()),
            other => return Err(ObjectError::InvalidType(other as u64)),
        };
        Ok(Node::with_kind(name, uuid, kind))
    }

    pub(crate) fn with_kind(name: &str, uuid: Uuid, kind: NodeKind) -> Node {
        Node {
            uuid: if uuid.is_none() { new_uuid() } else { uuid },
            name: name.to_string(),
            dirty: true,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            parent_transform: Mat4::IDENTITY,
            world_transform: Mat4::IDENTITY,
            children: Vec::new(),
            kind,
        }
    }

    /// The tag matching this node's variant.
    pub fn object_type(&self) -> ObjectType {
        match self.kind {
            NodeKind::Plain => ObjectType::Node,
            NodeKind::Mesh(_) => ObjectType::MeshNode,
            NodeKind::Light(_) => ObjectType::LightNode,
            NodeKind::Camera(_) => ObjectType::CameraNode,
        }
    }

    /// Attach a child, making this node its unique owner. Returns the
    /// child's id for convenience.
    pub fn add_child(&mut self, child: Node) -> Uuid {
        let id = child.uuid;
        self.children.push(child);
        id
    }

    /// Local TRS composition (translate × rotate × scale, degrees).
    pub fn local_transform(&self) -> Mat4 {
        compose_trs(self.position, self.rotation, self.scale)
    }

    /// Recompute cached world transforms for this subtree, top-down.
    ///
    /// The caller (normally the owning scene) is responsible for seeding
    /// `parent_transform` first. Leaves terminate the recursion; the
    /// by-value ownership of `children` rules out cycles.
    pub fn update_transforms(&mut self) {
        self.world_transform = self.parent_transform * self.local_transform();
        for child in &mut self.children {
            child.parent_transform = self.world_transform;
            child.update_transforms();
        }
    }

    /// World-space position of the node's origin, from the cached parent
    /// transform.
    pub fn world_position(&self) -> Vec3 {
        self.parent_transform.transform_point3(self.position)
    }

    /// Depth-first search for a node by id, this node included.
    pub fn find(&self, uuid: Uuid) -> Option<&Node> {
        if self.uuid == uuid {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(uuid))
    }

    pub fn find_mut(&mut self, uuid: Uuid) -> Option<&mut Node> {
        if self.uuid == uuid {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(uuid))
    }

    /// Collect descendants matching a tag (this node included).
    pub fn collect<'a>(&'a self, ty: ObjectType, out: &mut Vec<&'a Node>) {
        if self.object_type() == ty {
            out.push(self);
        }
        for child in &self.children {
            child.collect(ty, out);
        }
    }

    /// Number of nodes in this subtree, self included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }

    // ── Clone engine ─────────────────────────────────────────────────

    /// Structural deep copy with fresh identities.
    ///
    /// Scalar fields are copied verbatim, asset references stay shared by
    /// id, and every node in the result carries a new identifier. The
    /// children list is rebuilt by recursive cloning, never aliased, so the
    /// result is an isomorphic subtree wholly owned by the caller.
    pub fn clone_subtree(&self) -> Node {
        let mut clone = Node {
            uuid: new_uuid(),
            name: self.name.clone(),
            dirty: true,
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
            parent_transform: self.parent_transform,
            world_transform: self.world_transform,
            children: Vec::with_capacity(self.children.len()),
            kind: self.kind.clone(),
        };
        for child in &self.children {
            clone.children.push(child.clone_subtree());
        }
        clone
    }

    // ── Serialization ────────────────────────────────────────────────

    /// Walk this node's fields through the bidirectional serializer. The
    /// `{type, name, uuid}` header is the caller's concern (see
    /// [`Serializer::node_seq`]); this handles everything below it.
    pub fn serialize(&mut self, s: &mut Serializer<'_>) -> Result<(), ObjectError> {
        s.node_seq("children", &mut self.children)?;
        s.field("position", &mut self.position);
        s.field("rotation", &mut self.rotation);
        s.field("scale", &mut self.scale);
        match &mut self.kind {
            NodeKind::Plain => {}
            NodeKind::Mesh(mesh) => {
                s.asset_ref("mesh", &mut mesh.mesh);
                s.asset_ref("material", &mut mesh.material);
            }
            NodeKind::Light(light) => {
                s.field("color", &mut light.color);
                s.field("intensity", &mut light.intensity);
                s.field("lightType", &mut light.light_type);
                s.field("radius", &mut light.radius);
                s.field("innerAngle", &mut light.inner_angle);
                s.field("outerAngle", &mut light.outer_angle);
                s.field("shadowMapRange", &mut light.shadow_map_range);
                s.field("shadowMapFar", &mut light.shadow_map_far);
                s.field("volumetricType", &mut light.volumetric_type);
                s.field("volumetricAbsorption", &mut light.volumetric_absorption);
                s.field("volumetricSamples", &mut light.volumetric_samples);
            }
            NodeKind::Camera(camera) => {
                s.field("projection", &mut camera.projection);
                s.field("mode", &mut camera.mode);
                s.field("fov", &mut camera.fov);
                s.field("near", &mut camera.near);
                s.field("far", &mut camera.far);
                s.field("orthoNear", &mut camera.ortho_near);
                s.field("orthoFar", &mut camera.ortho_far);
                s.field("zoom", &mut camera.zoom);
                s.field("useJitter", &mut camera.use_jitter);
            }
        }
        Ok(())
    }
}
