//! # Serializer — One Visitor, Both Directions
//!
//! Load and save walk the *same* field list: each object type declares its
//! fields once (see [`Node::serialize`] and [`Asset::serialize`]) against a
//! [`Serializer`] parameterized by [`Dir`]. That single code path is what
//! keeps the schema from drifting between reader and writer.
//!
//! Four primitive operations cover the whole object model:
//!
//! - [`field`](Serializer::field) — any serde scalar or struct. Loads are
//!   tolerant: a missing or malformed field keeps the in-memory default, so
//!   the schema can grow fields without breaking old files.
//! - [`bulk`](Serializer::bulk) — fixed-layout numeric arrays (vertices,
//!   indices, pixels) as a base64 blob of the raw little-endian bytes. No
//!   layout version is stored; writer and reader must agree on element
//!   layout and endianness.
//! - [`node_seq`](Serializer::node_seq) — owned sub-object sequences. Each
//!   element is a full record with a `{type, name, uuid}` header; on load
//!   the header is read *first*, the concrete variant is constructed by tag
//!   dispatch, and only then does the visitor recurse into the fresh
//!   instance — that ordering is what rebuilds polymorphic trees without a
//!   priori schema knowledge.
//! - [`asset_ref`](Serializer::asset_ref) — non-owning links, persisted as
//!   the referent's id with `0` meaning "no reference". Resolution happens
//!   at access time by registry lookup, so load order cannot dangle them.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytemuck::Pod;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::ids::Uuid;
use crate::node::Node;
use crate::object::{ObjectError, ObjectType};

/// Direction flag selecting which half of each primitive runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    Load,
    Save,
}

/// Bidirectional visitor over one JSON record.
pub struct Serializer<'a> {
    pub dir: Dir,
    pub json: &'a mut Value,
}

impl<'a> Serializer<'a> {
    pub fn new(json: &'a mut Value, dir: Dir) -> Serializer<'a> {
        Serializer { dir, json }
    }

    /// Scalar/struct field. Save encodes under `name`; load decodes if the
    /// field is present and well-formed, otherwise the existing value (the
    /// type's default, normally) is left untouched.
    pub fn field<T>(&mut self, name: &str, value: &mut T)
    where
        T: Serialize + DeserializeOwned,
    {
        match self.dir {
            Dir::Save => match serde_json::to_value(&*value) {
                Ok(encoded) => self.json[name] = encoded,
                Err(e) => log::warn!("failed to encode field '{name}': {e}"),
            },
            Dir::Load => {
                let Some(raw) = self.json.get(name) else {
                    return;
                };
                match serde_json::from_value(raw.clone()) {
                    Ok(decoded) => *value = decoded,
                    Err(e) => log::warn!("skipping malformed field '{name}': {e}"),
                }
            }
        }
    }

    /// Bulk array of plain fixed-size elements, embedded as base64 text.
    ///
    /// Load resizes the array to `decoded bytes / element size`; a trailing
    /// partial element is truncated with a warning. Decode failures keep
    /// the existing (default) contents.
    pub fn bulk<T: Pod>(&mut self, name: &str, data: &mut Vec<T>) {
        match self.dir {
            Dir::Save => {
                let bytes: &[u8] = bytemuck::cast_slice(data.as_slice());
                self.json[name] = Value::String(BASE64.encode(bytes));
            }
            Dir::Load => {
                let Some(text) = self.json.get(name).and_then(Value::as_str) else {
                    return;
                };
                let bytes = match BASE64.decode(text) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        log::warn!("skipping undecodable bulk field '{name}': {e}");
                        return;
                    }
                };
                let stride = size_of::<T>();
                let whole = bytes.len() / stride * stride;
                if whole != bytes.len() {
                    log::warn!(
                        "bulk field '{name}': {} trailing bytes do not fit an element, truncating",
                        bytes.len() - whole
                    );
                }
                *data = bytemuck::pod_collect_to_vec(&bytes[..whole]);
            }
        }
    }

    /// Non-owning reference to an externally-owned asset (or node), stored
    /// as the target's id. `Uuid::NONE` round-trips as `0`.
    pub fn asset_ref(&mut self, name: &str, reference: &mut Uuid) {
        match self.dir {
            Dir::Save => self.json[name] = json!(reference.0),
            Dir::Load => {
                let Some(raw) = self.json.get(name) else {
                    return;
                };
                match raw.as_u64() {
                    Some(id) => *reference = Uuid(id),
                    None => log::warn!("reference field '{name}' is not an id, keeping default"),
                }
            }
        }
    }

    /// Sequence of owned sub-objects, each a nested record of the same
    /// shape. On load, any element whose header is missing or carries an
    /// unknown tag aborts with a typed error — records written by this
    /// serializer always carry valid headers, so that means a corrupt file.
    pub fn node_seq(&mut self, name: &str, nodes: &mut Vec<Node>) -> Result<(), ObjectError> {
        match self.dir {
            Dir::Save => {
                let mut records = Vec::with_capacity(nodes.len());
                for node in nodes.iter_mut() {
                    let mut record = Value::Object(serde_json::Map::new());
                    write_header(&mut record, node.object_type(), &node.name, node.uuid);
                    let mut child = Serializer::new(&mut record, Dir::Save);
                    node.serialize(&mut child)?;
                    records.push(record);
                }
                self.json[name] = Value::Array(records);
            }
            Dir::Load => {
                let Some(records) = self.json.get(name).and_then(Value::as_array) else {
                    return Ok(());
                };
                nodes.clear();
                for record in records {
                    let (ty, node_name, uuid) = read_header(record)?;
                    let mut node = Node::create(ty, &node_name, uuid)?;
                    let mut owned = record.clone();
                    let mut child = Serializer::new(&mut owned, Dir::Load);
                    node.serialize(&mut child)?;
                    nodes.push(node);
                }
            }
        }
        Ok(())
    }
}

// ── Record headers ───────────────────────────────────────────────────────

/// Emit the `{type, name, uuid}` header every persisted record carries.
pub(crate) fn write_header(json: &mut Value, ty: ObjectType, name: &str, uuid: Uuid) {
    json["type"] = json!(ty as u32);
    json["name"] = json!(name);
    json["uuid"] = json!(uuid.0);
}

/// Read a record header. All three fields are required; the tag must be a
/// known ordinal.
pub(crate) fn read_header(json: &Value) -> Result<(ObjectType, String, Uuid), ObjectError> {
    let raw = json
        .get("type")
        .and_then(Value::as_u64)
        .ok_or(ObjectError::MissingHeader("type"))?;
    // No narrowing cast: a 64-bit tag that wraps onto a valid ordinal must
    // still be rejected.
    let ty = u32::try_from(raw)
        .ok()
        .and_then(ObjectType::from_u32)
        .ok_or(ObjectError::InvalidType(raw))?;
    let name = json
        .get("name")
        .and_then(Value::as_str)
        .ok_or(ObjectError::MissingHeader("name"))?
        .to_string();
    let uuid = json
        .get("uuid")
        .and_then(Value::as_u64)
        .map(Uuid)
        .ok_or(ObjectError::MissingHeader("uuid"))?;
    Ok((ty, name, uuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Vertex;
    use crate::math::Vec3;
    use crate::node::NodeKind;

    fn empty() -> Value {
        Value::Object(serde_json::Map::new())
    }

    #[test]
    fn field_round_trips_scalars_and_vectors() {
        let mut json = empty();
        let mut s = Serializer::new(&mut json, Dir::Save);
        s.field("intensity", &mut 4.5f32);
        s.field("color", &mut Vec3::new(0.1, 0.2, 0.3));

        let mut intensity = 0.0f32;
        let mut color = Vec3::ZERO;
        let mut s = Serializer::new(&mut json, Dir::Load);
        s.field("intensity", &mut intensity);
        s.field("color", &mut color);
        assert_eq!(intensity, 4.5);
        assert_eq!(color, Vec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn missing_field_keeps_default() {
        let mut json = empty();
        let mut roughness = 0.5f32;
        let mut s = Serializer::new(&mut json, Dir::Load);
        s.field("roughness", &mut roughness);
        assert_eq!(roughness, 0.5);
    }

    #[test]
    fn malformed_field_is_skipped() {
        let mut json = json!({ "metallic": "not a number" });
        let mut metallic = 0.25f32;
        let mut s = Serializer::new(&mut json, Dir::Load);
        s.field("metallic", &mut metallic);
        assert_eq!(metallic, 0.25);
    }

    #[test]
    fn bulk_round_trip_is_bit_exact() {
        let vertices = vec![
            Vertex {
                position: [1.0, 2.0, 3.0],
                normal: [0.0, 1.0, 0.0],
                tangent: [1.0, 0.0, 0.0, 1.0],
                uv: [0.5, 0.5],
            },
            Vertex {
                position: [-1.5, 0.25, 9.0],
                normal: [0.0, 0.0, 1.0],
                tangent: [0.0, 1.0, 0.0, -1.0],
                uv: [0.0, 1.0],
            },
        ];

        let mut json = empty();
        let mut out = vertices.clone();
        let mut s = Serializer::new(&mut json, Dir::Save);
        s.bulk("vertices", &mut out);
        assert!(json["vertices"].is_string());

        let mut loaded: Vec<Vertex> = Vec::new();
        let mut s = Serializer::new(&mut json, Dir::Load);
        s.bulk("vertices", &mut loaded);
        assert_eq!(loaded, vertices);
    }

    #[test]
    fn bulk_truncates_partial_trailing_element() {
        // 10 bytes of u32 payload: two whole elements plus two stray bytes.
        let bytes = [1u8, 0, 0, 0, 2, 0, 0, 0, 0xAA, 0xBB];
        let mut json = json!({ "indices": BASE64.encode(bytes) });
        let mut indices: Vec<u32> = Vec::new();
        let mut s = Serializer::new(&mut json, Dir::Load);
        s.bulk("indices", &mut indices);
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn bulk_ignores_undecodable_blob() {
        let mut json = json!({ "data": "%%% not base64 %%%" });
        let mut data: Vec<u8> = vec![7, 7, 7];
        let mut s = Serializer::new(&mut json, Dir::Load);
        s.bulk("data", &mut data);
        assert_eq!(data, vec![7, 7, 7]);
    }

    #[test]
    fn asset_ref_sentinel_round_trip() {
        let mut json = empty();
        let mut s = Serializer::new(&mut json, Dir::Save);
        s.asset_ref("mesh", &mut Uuid(99));
        s.asset_ref("material", &mut Uuid::NONE);
        assert_eq!(json["mesh"], json!(99));
        assert_eq!(json["material"], json!(0));

        let mut mesh = Uuid::NONE;
        let mut material = Uuid(42);
        let mut s = Serializer::new(&mut json, Dir::Load);
        s.asset_ref("mesh", &mut mesh);
        s.asset_ref("material", &mut material);
        assert_eq!(mesh, Uuid(99));
        assert_eq!(material, Uuid::NONE);
    }

    #[test]
    fn node_seq_rebuilds_polymorphic_trees() {
        let mut root = Node::new("root");
        let mut mesh = Node::create(ObjectType::MeshNode, "body", Uuid::NONE).unwrap();
        if let NodeKind::Mesh(m) = &mut mesh.kind {
            m.mesh = Uuid(11);
            m.material = Uuid(22);
        }
        mesh.position = Vec3::new(1.0, 2.0, 3.0);
        mesh.add_child(Node::create(ObjectType::LightNode, "lamp", Uuid::NONE).unwrap());
        root.add_child(mesh);

        let mut forest = vec![root];
        let mut json = empty();
        let mut s = Serializer::new(&mut json, Dir::Save);
        s.node_seq("nodes", &mut forest).unwrap();

        let mut loaded: Vec<Node> = Vec::new();
        let mut s = Serializer::new(&mut json, Dir::Load);
        s.node_seq("nodes", &mut loaded).unwrap();

        assert_eq!(loaded.len(), 1);
        let root = &loaded[0];
        assert_eq!(root.object_type(), ObjectType::Node);
        assert_eq!(root.uuid, forest[0].uuid);
        let body = &root.children[0];
        assert_eq!(body.object_type(), ObjectType::MeshNode);
        assert_eq!(body.name, "body");
        assert_eq!(body.position, Vec3::new(1.0, 2.0, 3.0));
        let NodeKind::Mesh(m) = &body.kind else {
            panic!("wrong variant re-materialized");
        };
        assert_eq!(m.mesh, Uuid(11));
        assert_eq!(m.material, Uuid(22));
        assert_eq!(body.children[0].object_type(), ObjectType::LightNode);
    }

    #[test]
    fn node_seq_rejects_unknown_tag() {
        let mut json = json!({
            "nodes": [{ "type": 42, "name": "mystery", "uuid": 7 }]
        });
        let mut loaded: Vec<Node> = Vec::new();
        let mut s = Serializer::new(&mut json, Dir::Load);
        let err = s.node_seq("nodes", &mut loaded).unwrap_err();
        assert!(matches!(err, ObjectError::InvalidType(42)));
    }

    #[test]
    fn node_seq_rejects_missing_header() {
        let mut json = json!({
            "nodes": [{ "name": "headless", "uuid": 7 }]
        });
        let mut loaded: Vec<Node> = Vec::new();
        let mut s = Serializer::new(&mut json, Dir::Load);
        let err = s.node_seq("nodes", &mut loaded).unwrap_err();
        assert!(matches!(err, ObjectError::MissingHeader("type")));
    }

    #[test]
    fn header_rejects_tags_beyond_32_bits() {
        // 2^32 + 1 wraps onto the Texture ordinal under a narrowing cast;
        // it must surface as an invalid tag carrying the raw value.
        let json = json!({ "type": 4_294_967_297u64, "name": "wrapped", "uuid": 7 });
        let err = read_header(&json).unwrap_err();
        assert!(matches!(err, ObjectError::InvalidType(4_294_967_297)));

        // In-range but unknown ordinals are still rejected too.
        let json = json!({ "type": u32::MAX, "name": "huge", "uuid": 7 });
        assert!(matches!(
            read_header(&json).unwrap_err(),
            ObjectError::InvalidType(_)
        ));
    }

    #[test]
    fn header_round_trip() {
        let mut json = empty();
        write_header(&mut json, ObjectType::Material, "gold", Uuid(5));
        let (ty, name, uuid) = read_header(&json).unwrap();
        assert_eq!(ty, ObjectType::Material);
        assert_eq!(name, "gold");
        assert_eq!(uuid, Uuid(5));
    }
}
