//! # Registry — Authoritative Asset Ownership
//!
//! The [`Registry`] is the one component that owns assets: a map from
//! identifier to [`Asset`], plus the "initial scene" pointer and the
//! deferred project-load request. It is an explicit context object — there
//! is no process-wide singleton — constructed once at startup and threaded
//! through every call that needs it.
//!
//! Lookups never panic and never throw: `get` and the typed accessors
//! return `None` on absence *or* tag mismatch, exactly like a failed
//! downcast. Creation and cloning go through tag-dispatch tables; an
//! unknown tag is a typed error.
//!
//! The registry is single-threaded by contract: it is mutated only by its
//! owning thread, and no internal locking exists. Hosts that want to load
//! or save off the main thread must treat the whole call as one opaque
//! blocking unit.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::PathBuf;

use crate::asset::{Asset, AssetKind, MaterialAsset, MeshAsset, SceneAsset, TextureAsset};
use crate::ids::{Uuid, new_uuid};
use crate::node::Node;
use crate::object::{ObjectError, ObjectType};
use crate::project::SaveCache;

/// Owns every asset and issues their identities.
#[derive(Default)]
pub struct Registry {
    assets: HashMap<Uuid, Asset>,
    initial_scene: Uuid,
    pub(crate) save_cache: Option<SaveCache>,
    load_request: Option<PathBuf>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    // ── Creation ─────────────────────────────────────────────────────

    /// Construct and register an asset variant by tag, allocating a fresh
    /// identifier. The first scene ever created becomes the initial scene.
    pub fn create_asset(&mut self, ty: ObjectType, name: &str) -> Result<Uuid, ObjectError> {
        self.create_asset_with_id(ty, name, Uuid::NONE)
    }

    /// As [`create_asset`](Registry::create_asset), but with a
    /// caller-supplied identifier (used by the loader; `Uuid::NONE`
    /// allocates).
    pub fn create_asset_with_id(
        &mut self,
        ty: ObjectType,
        name: &str,
        uuid: Uuid,
    ) -> Result<Uuid, ObjectError> {
        let asset = Asset::create(ty, name, uuid)?;
        Ok(self.insert(asset))
    }

    /// Register a fully-constructed asset. Replacing an existing id is
    /// logged — it normally means an id collision or a double import.
    pub fn insert(&mut self, asset: Asset) -> Uuid {
        let uuid = asset.uuid;
        if asset.object_type() == ObjectType::Scene && self.initial_scene.is_none() {
            self.initial_scene = uuid;
        }
        if let Some(old) = self.assets.insert(uuid, asset) {
            log::warn!("replacing asset {uuid} ('{}')", old.name);
        }
        uuid
    }

    // ── Lookup ───────────────────────────────────────────────────────

    /// Untyped lookup. `None` if absent — callers must check before use.
    pub fn get(&self, uuid: Uuid) -> Option<&Asset> {
        self.assets.get(&uuid)
    }

    pub fn get_mut(&mut self, uuid: Uuid) -> Option<&mut Asset> {
        self.assets.get_mut(&uuid)
    }

    /// Typed lookup: `None` on absence *or* variant mismatch.
    pub fn texture(&self, uuid: Uuid) -> Option<&TextureAsset> {
        match &self.assets.get(&uuid)?.kind {
            AssetKind::Texture(texture) => Some(texture),
            _ => None,
        }
    }

    pub fn mesh(&self, uuid: Uuid) -> Option<&MeshAsset> {
        match &self.assets.get(&uuid)?.kind {
            AssetKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn material(&self, uuid: Uuid) -> Option<&MaterialAsset> {
        match &self.assets.get(&uuid)?.kind {
            AssetKind::Material(material) => Some(material),
            _ => None,
        }
    }

    pub fn scene(&self, uuid: Uuid) -> Option<&SceneAsset> {
        match &self.assets.get(&uuid)?.kind {
            AssetKind::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    pub fn texture_mut(&mut self, uuid: Uuid) -> Option<&mut TextureAsset> {
        match &mut self.assets.get_mut(&uuid)?.kind {
            AssetKind::Texture(texture) => Some(texture),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self, uuid: Uuid) -> Option<&mut MeshAsset> {
        match &mut self.assets.get_mut(&uuid)?.kind {
            AssetKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn material_mut(&mut self, uuid: Uuid) -> Option<&mut MaterialAsset> {
        match &mut self.assets.get_mut(&uuid)?.kind {
            AssetKind::Material(material) => Some(material),
            _ => None,
        }
    }

    pub fn scene_mut(&mut self, uuid: Uuid) -> Option<&mut SceneAsset> {
        match &mut self.assets.get_mut(&uuid)?.kind {
            AssetKind::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    /// Iterate all registered assets in map order (not stable across runs).
    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    /// Number of registered assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Every id whose object matches the tag. Asset tags scan the map;
    /// node tags instead scan recursively inside every scene's forest.
    /// Order follows map order and is not stable across runs.
    ///
    /// Node ids are not registry keys — `get` will not resolve them.
    /// Dereference them through the owning scene's
    /// [`find`](crate::asset::SceneAsset::find), walking `all_of(Scene)`
    /// when the owner is unknown.
    pub fn all_of(&self, ty: ObjectType) -> Vec<Uuid> {
        if ty.is_node() {
            let mut out = Vec::new();
            for asset in self.assets.values() {
                if let AssetKind::Scene(scene) = &asset.kind {
                    out.extend(scene.get_all(ty).iter().map(|node| node.uuid));
                }
            }
            out
        } else {
            self.assets
                .values()
                .filter(|asset| asset.object_type() == ty)
                .map(|asset| asset.uuid)
                .collect()
        }
    }

    // ── Initial scene / main camera ──────────────────────────────────

    /// The initial scene's id, creating a default-named scene as a side
    /// effect when none exists (or the pointer dangles). Not a pure query.
    pub fn initial_scene(&mut self) -> Uuid {
        if self.initial_scene.is_none() || !self.assets.contains_key(&self.initial_scene) {
            self.initial_scene = Uuid::NONE;
            let scene = Asset {
                uuid: new_uuid(),
                name: "DefaultScene".to_string(),
                dirty: true,
                kind: AssetKind::Scene(SceneAsset::default()),
            };
            self.insert(scene);
        }
        self.initial_scene
    }

    /// Raw initial-scene pointer, `Uuid::NONE` when unset. Pure query.
    pub fn initial_scene_id(&self) -> Uuid {
        self.initial_scene
    }

    pub(crate) fn set_initial_scene(&mut self, uuid: Uuid) {
        self.initial_scene = uuid;
    }

    /// A scene's main camera id, lazily creating the camera node on first
    /// access. `None` when the id is not a scene.
    pub fn main_camera(&mut self, scene: Uuid) -> Option<Uuid> {
        Some(self.scene_mut(scene)?.ensure_main_camera())
    }

    // ── Cloning / merging ────────────────────────────────────────────

    /// Deep-copy an asset under a fresh identity and register it.
    ///
    /// Scenes re-clone their node forest through the clone engine so every
    /// node also gets a new id (the main-camera pointer is reset — it
    /// referred to a node of the source forest). Other variants copy their
    /// fields; referenced assets stay shared. `None` when the source is
    /// absent.
    pub fn clone_asset(&mut self, source: Uuid) -> Option<Uuid> {
        let original = self.assets.get(&source)?;
        let name = original.name.clone();
        let mut kind = original.kind.clone();
        if let AssetKind::Scene(scene) = &mut kind {
            scene.nodes = scene.nodes.iter().map(Node::clone_subtree).collect();
            scene.main_camera = Uuid::NONE;
        }
        let clone = Asset {
            uuid: new_uuid(),
            name,
            dirty: true,
            kind,
        };
        Some(self.insert(clone))
    }

    /// Clone every root node of `source` into `destination`, returning the
    /// new roots' ids. Used when an imported scene is dropped into the one
    /// being edited.
    pub fn merge_scene(&mut self, destination: Uuid, source: Uuid) -> Vec<Uuid> {
        let Some(source_scene) = self.scene(source) else {
            log::warn!("merge_scene: source {source} is not a scene");
            return Vec::new();
        };
        let clones: Vec<Node> = source_scene.nodes.iter().map(Node::clone_subtree).collect();

        let Some(destination_scene) = self.scene_mut(destination) else {
            log::warn!("merge_scene: destination {destination} is not a scene");
            return Vec::new();
        };
        clones
            .into_iter()
            .map(|node| destination_scene.add(node))
            .collect()
    }

    // ── Save bookkeeping ─────────────────────────────────────────────

    /// Combined hash over all registered asset identifiers, used by the
    /// incremental save path. Identifier-only on purpose: content edits
    /// that keep the id set intact do not invalidate the asset cache —
    /// call [`mark_assets_dirty`](Registry::mark_assets_dirty) for those.
    pub fn asset_hash(&self) -> u64 {
        let mut ids: Vec<u64> = self.assets.keys().map(|uuid| uuid.0).collect();
        ids.sort_unstable();
        let mut hasher = DefaultHasher::new();
        ids.hash(&mut hasher);
        hasher.finish()
    }

    /// Drop the cached asset records so the next save re-encodes them.
    pub fn mark_assets_dirty(&mut self) {
        self.save_cache = None;
    }

    // ── Deferred project load ────────────────────────────────────────

    /// Record a project to load later. The swap is applied only when the
    /// host calls [`take_load_request`](Registry::take_load_request) at a
    /// checkpoint of its choosing — never mid-frame under a consumer.
    pub fn request_load(&mut self, path: impl Into<PathBuf>) {
        self.load_request = Some(path.into());
    }

    pub fn has_load_request(&self) -> bool {
        self.load_request.is_some()
    }

    /// Consume the pending request, if any.
    pub fn take_load_request(&mut self) -> Option<PathBuf> {
        self.load_request.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use std::collections::HashSet;

    #[test]
    fn created_identifiers_are_pairwise_distinct() {
        let mut registry = Registry::new();
        let mut seen = HashSet::new();
        for i in 0..200 {
            let ty = match i % 4 {
                0 => ObjectType::Texture,
                1 => ObjectType::Mesh,
                2 => ObjectType::Material,
                _ => ObjectType::Scene,
            };
            let id = registry.create_asset(ty, "asset").unwrap();
            assert!(seen.insert(id));
        }
        assert_eq!(registry.len(), 200);
    }

    #[test]
    fn typed_lookup_checks_the_variant() {
        let mut registry = Registry::new();
        let mesh = registry.create_asset(ObjectType::Mesh, "quad").unwrap();

        assert!(registry.mesh(mesh).is_some());
        assert!(registry.texture(mesh).is_none());
        assert!(registry.mesh(Uuid(1234)).is_none());
        assert!(registry.get(mesh).is_some());
        assert!(registry.get(Uuid(1234)).is_none());
    }

    #[test]
    fn create_rejects_node_and_invalid_tags() {
        let mut registry = Registry::new();
        assert!(registry.create_asset(ObjectType::MeshNode, "n").is_err());
        assert!(registry.create_asset(ObjectType::Invalid, "x").is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn first_scene_becomes_initial() {
        let mut registry = Registry::new();
        registry.create_asset(ObjectType::Texture, "t").unwrap();
        assert!(registry.initial_scene_id().is_none());

        let first = registry.create_asset(ObjectType::Scene, "a").unwrap();
        let _second = registry.create_asset(ObjectType::Scene, "b").unwrap();
        assert_eq!(registry.initial_scene_id(), first);
    }

    #[test]
    fn initial_scene_is_lazily_created() {
        let mut registry = Registry::new();
        let id = registry.initial_scene();
        assert!(id.is_some());
        let scene = registry.get(id).unwrap();
        assert_eq!(scene.name, "DefaultScene");
        assert_eq!(scene.object_type(), ObjectType::Scene);

        // Subsequent calls return the same scene.
        assert_eq!(registry.initial_scene(), id);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn all_of_scans_scene_forests_for_node_tags() {
        let mut registry = Registry::new();
        let scene_id = registry.create_asset(ObjectType::Scene, "level").unwrap();
        registry.create_asset(ObjectType::Texture, "t0").unwrap();
        registry.create_asset(ObjectType::Texture, "t1").unwrap();

        let scene = registry.scene_mut(scene_id).unwrap();
        let mut root = Node::new("root");
        root.add_child(Node::create(ObjectType::MeshNode, "m0", Uuid::NONE).unwrap());
        root.add_child(Node::create(ObjectType::MeshNode, "m1", Uuid::NONE).unwrap());
        scene.add(root);

        assert_eq!(registry.all_of(ObjectType::Texture).len(), 2);
        assert_eq!(registry.all_of(ObjectType::Scene).len(), 1);
        assert_eq!(registry.all_of(ObjectType::MeshNode).len(), 2);
        assert_eq!(registry.all_of(ObjectType::Node).len(), 1);
        assert_eq!(registry.all_of(ObjectType::LightNode).len(), 0);
    }

    #[test]
    fn all_of_node_ids_resolve_through_their_scene() {
        let mut registry = Registry::new();
        let scene_id = registry.create_asset(ObjectType::Scene, "level").unwrap();
        let scene = registry.scene_mut(scene_id).unwrap();
        let mut root = Node::new("root");
        root.add_child(Node::create(ObjectType::LightNode, "lamp", Uuid::NONE).unwrap());
        scene.add(root);

        for id in registry.all_of(ObjectType::LightNode) {
            // Not a registry key, but reachable through a scene's find.
            assert!(registry.get(id).is_none());
            let found = registry
                .all_of(ObjectType::Scene)
                .into_iter()
                .find_map(|sid| registry.scene(sid)?.find(id));
            assert_eq!(found.unwrap().name, "lamp");
        }
    }

    #[test]
    fn main_camera_side_effect_through_registry() {
        let mut registry = Registry::new();
        let scene_id = registry.create_asset(ObjectType::Scene, "level").unwrap();

        let camera = registry.main_camera(scene_id).unwrap();
        let scene = registry.scene(scene_id).unwrap();
        assert!(matches!(
            scene.find(camera).unwrap().kind,
            NodeKind::Camera(_)
        ));

        assert_eq!(registry.main_camera(scene_id), Some(camera));
        assert!(registry.main_camera(Uuid(9)).is_none());
    }

    #[test]
    fn clone_scene_re_identifies_its_forest() {
        let mut registry = Registry::new();
        let scene_id = registry.create_asset(ObjectType::Scene, "level").unwrap();
        let scene = registry.scene_mut(scene_id).unwrap();
        let mut root = Node::new("root");
        root.add_child(Node::new("child"));
        scene.add(root);

        let clone_id = registry.clone_asset(scene_id).unwrap();
        assert_ne!(clone_id, scene_id);

        let original: HashSet<Uuid> = registry
            .scene(scene_id)
            .unwrap()
            .get_all(ObjectType::Node)
            .iter()
            .map(|node| node.uuid)
            .collect();
        let cloned: HashSet<Uuid> = registry
            .scene(clone_id)
            .unwrap()
            .get_all(ObjectType::Node)
            .iter()
            .map(|node| node.uuid)
            .collect();
        assert_eq!(original.len(), 2);
        assert_eq!(cloned.len(), 2);
        assert!(original.is_disjoint(&cloned));
    }

    #[test]
    fn clone_material_shares_texture_references() {
        let mut registry = Registry::new();
        let texture = registry.create_asset(ObjectType::Texture, "wood").unwrap();
        let material_id = registry.create_asset(ObjectType::Material, "table").unwrap();
        registry.material_mut(material_id).unwrap().color_map = texture;

        let clone_id = registry.clone_asset(material_id).unwrap();
        assert_eq!(registry.material(clone_id).unwrap().color_map, texture);
    }

    #[test]
    fn merge_scene_clones_roots_into_destination() {
        let mut registry = Registry::new();
        let source = registry.create_asset(ObjectType::Scene, "import").unwrap();
        let destination = registry.create_asset(ObjectType::Scene, "level").unwrap();

        let scene = registry.scene_mut(source).unwrap();
        let mut root = Node::new("prop");
        root.add_child(Node::new("detail"));
        let source_root = scene.add(root);

        let new_roots = registry.merge_scene(destination, source);
        assert_eq!(new_roots.len(), 1);
        assert_ne!(new_roots[0], source_root);

        let destination_scene = registry.scene(destination).unwrap();
        assert_eq!(destination_scene.node_count(), 2);
        // Source keeps its own nodes.
        assert_eq!(registry.scene(source).unwrap().node_count(), 2);
    }

    #[test]
    fn asset_hash_tracks_the_id_set() {
        let mut registry = Registry::new();
        let empty = registry.asset_hash();
        let id = registry.create_asset(ObjectType::Texture, "t").unwrap();
        let one = registry.asset_hash();
        assert_ne!(empty, one);

        // Content edits leave the identifier-only hash unchanged.
        registry.texture_mut(id).unwrap().data = vec![1, 2, 3];
        assert_eq!(registry.asset_hash(), one);
    }

    #[test]
    fn load_request_is_deferred_until_taken() {
        let mut registry = Registry::new();
        assert!(!registry.has_load_request());

        registry.request_load("/projects/city.json");
        assert!(registry.has_load_request());

        let path = registry.take_load_request().unwrap();
        assert_eq!(path, PathBuf::from("/projects/city.json"));
        assert!(!registry.has_load_request());
        assert!(registry.take_load_request().is_none());
    }
}
