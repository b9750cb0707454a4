//! # Project Persistence
//!
//! A project is one JSON document:
//!
//! ```text
//! {
//!   "assets": [ record, ... ],          // textures, meshes, materials
//!   "scenes": { "uuid": record, ... },  // scene records, keyed by id
//!   "initialScene": id
//! }
//! ```
//!
//! Each record is `{"type": ordinal, "name": string, "uuid": id, ...}` with
//! bulk arrays embedded as base64 (see [`Serializer`]). Loading is
//! all-or-nothing: records are staged into a fresh [`Registry`] and the
//! caller's registry is swapped only on success, so a missing file, a parse
//! failure, or a corrupt record leaves existing state exactly as it was.
//!
//! Saving is incremental: the registry's identifier hash decides whether
//! the flat asset records (and their base64 re-encoding — the expensive
//! part, pixel and vertex payloads dominate) can be reused from the last
//! save. Scene records are small and always volatile, so they are re-emitted
//! every time.

use std::path::Path;

use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::asset::Asset;
use crate::ids::Uuid;
use crate::object::{ObjectError, ObjectType};
use crate::registry::Registry;
use crate::serializer::{Dir, Serializer, read_header, write_header};

/// Failures crossing the project-persistence boundary.
///
/// Everything here aborts the whole load/save; tolerable damage (missing
/// optional fields, undecodable bulk blobs) is degraded to defaults inside
/// the serializer instead and never surfaces as an error.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("project document is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Object(#[from] ObjectError),
}

/// Asset records from the previous save, reusable while the registry's
/// identifier hash is unchanged.
#[derive(Clone)]
pub(crate) struct SaveCache {
    pub hash: u64,
    pub assets: Vec<Value>,
}

// ── Save ─────────────────────────────────────────────────────────────────

/// Serialize the whole registry to `path`.
///
/// When the identifier hash matches the previous save, the flat asset
/// records are reused verbatim from cache and only scenes are re-encoded.
/// Output is deterministic: assets ordered by (type, id), scenes and object
/// keys sorted, so an unchanged registry produces byte-identical files.
pub fn save_project(registry: &mut Registry, path: &Path) -> Result<(), ProjectError> {
    let hash = registry.asset_hash();
    let reuse = registry
        .save_cache
        .as_ref()
        .is_some_and(|cache| cache.hash == hash);

    let asset_records = if reuse {
        log::debug!("asset set unchanged (hash {hash:016x}), reusing cached records");
        match &registry.save_cache {
            Some(cache) => cache.assets.clone(),
            None => Vec::new(),
        }
    } else {
        let mut ids: Vec<(u32, Uuid)> = registry
            .assets()
            .filter(|asset| asset.object_type() != ObjectType::Scene)
            .map(|asset| (asset.object_type() as u32, asset.uuid))
            .collect();
        ids.sort_unstable();

        let mut records = Vec::with_capacity(ids.len());
        for (_, uuid) in ids {
            let Some(asset) = registry.get_mut(uuid) else {
                continue;
            };
            records.push(save_record(asset)?);
        }
        registry.save_cache = Some(SaveCache {
            hash,
            assets: records.clone(),
        });
        records
    };

    let mut scene_ids = registry.all_of(ObjectType::Scene);
    scene_ids.sort_unstable();
    let mut scenes = Map::new();
    for uuid in scene_ids {
        let Some(asset) = registry.get_mut(uuid) else {
            continue;
        };
        scenes.insert(uuid.to_string(), save_record(asset)?);
    }

    let document = json!({
        "assets": asset_records,
        "scenes": Value::Object(scenes),
        "initialScene": registry.initial_scene_id().0,
    });
    crate::io::write_text(path, &serde_json::to_string_pretty(&document)?)?;
    log::info!(
        "saved project '{}': {} asset records, {} scenes",
        path.display(),
        asset_records_len(&document),
        document["scenes"].as_object().map_or(0, Map::len),
    );
    Ok(())
}

fn asset_records_len(document: &Value) -> usize {
    document["assets"].as_array().map_or(0, Vec::len)
}

fn save_record(asset: &mut Asset) -> Result<Value, ProjectError> {
    let mut record = Value::Object(Map::new());
    write_header(&mut record, asset.object_type(), &asset.name, asset.uuid);
    let mut s = Serializer::new(&mut record, Dir::Save);
    asset.serialize(&mut s)?;
    Ok(record)
}

// ── Load ─────────────────────────────────────────────────────────────────

/// Replace the registry's contents with the project at `path`.
///
/// The flat asset list loads before the scenes. References are stored as
/// ids and resolved by registry lookup at access time, so even a document
/// whose sections arrive in an adversarial order resolves correctly once
/// the load completes. On any error the registry is left untouched.
pub fn load_project(registry: &mut Registry, path: &Path) -> Result<(), ProjectError> {
    let text = crate::io::read_text(path)?;
    let document: Value = serde_json::from_str(&text)?;

    let mut staged = Registry::new();
    if let Some(records) = document.get("assets").and_then(Value::as_array) {
        for record in records {
            load_record(&mut staged, record)?;
        }
    }
    if let Some(records) = document.get("scenes").and_then(Value::as_object) {
        for record in records.values() {
            load_record(&mut staged, record)?;
        }
    }

    let initial = document
        .get("initialScene")
        .and_then(Value::as_u64)
        .map(Uuid)
        .unwrap_or(Uuid::NONE);
    if initial.is_some() {
        staged.set_initial_scene(initial);
    }

    // Derived transform caches are not persisted; rebuild them.
    for uuid in staged.all_of(ObjectType::Scene) {
        if let Some(scene) = staged.scene_mut(uuid) {
            scene.update_transforms();
        }
    }

    log::info!(
        "loaded project '{}': {} assets",
        path.display(),
        staged.len()
    );
    *registry = staged;
    Ok(())
}

fn load_record(registry: &mut Registry, record: &Value) -> Result<Uuid, ProjectError> {
    let (ty, name, uuid) = read_header(record)?;
    let mut asset = Asset::create(ty, &name, uuid)?;
    let mut owned = record.clone();
    let mut s = Serializer::new(&mut owned, Dir::Load);
    asset.serialize(&mut s)?;
    Ok(registry.insert(asset))
}

/// Apply a pending deferred load request, if one was recorded.
///
/// Hosts call this at a checkpoint where no consumer is mid-traversal;
/// [`Registry::request_load`] only records the path.
pub fn apply_load_request(registry: &mut Registry) -> Option<Result<(), ProjectError>> {
    let path = registry.take_load_request()?;
    Some(load_project(registry, &path))
}
