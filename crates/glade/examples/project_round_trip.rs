//! Project Round-Trip — build a small level, save it, reload it.
//!
//! Creates a texture, a mesh, a material wired to the texture, and a scene
//! with a node hierarchy, writes the project to `/tmp/glade_project.json`,
//! then loads it back into a fresh registry and prints what survived.
//!
//! Run with: `cargo run -p glade --example project_round_trip`

use std::path::Path;

use glade::prelude::*;

const SAVE_PATH: &str = "/tmp/glade_project.json";

fn main() {
    env_logger::init();

    let mut registry = Registry::new();
    build_level(&mut registry);

    let path = Path::new(SAVE_PATH);
    if let Err(err) = save_project(&mut registry, path) {
        eprintln!("save failed: {err}");
        return;
    }
    println!("saved {} objects to {SAVE_PATH}", registry.len());

    // Saving again is a no-op on the heavy asset records; the file is
    // byte-identical as long as the asset set is unchanged.
    if let Err(err) = save_project(&mut registry, path) {
        eprintln!("re-save failed: {err}");
        return;
    }

    let mut restored = Registry::new();
    if let Err(err) = load_project(&mut restored, path) {
        eprintln!("load failed: {err}");
        return;
    }

    println!("reloaded {} objects", restored.len());
    let scene_id = restored.initial_scene();
    if let Some(scene) = restored.scene(scene_id) {
        println!("initial scene: '{}' with {} nodes", scene_id, scene.node_count());
        for node in scene.get_all(ObjectType::MeshNode) {
            let NodeKind::Mesh(mesh_node) = &node.kind else {
                continue;
            };
            let mesh = restored.mesh(mesh_node.mesh);
            let material = restored.material(mesh_node.material);
            println!(
                "  mesh node '{}' -> mesh {:?}, material {:?}",
                node.name,
                mesh.map(|m| m.vertices.len()),
                material.map(|m| m.roughness),
            );
        }
        for node in scene.get_all(ObjectType::LightNode) {
            println!("  light node '{}' at {:?}", node.name, node.world_position());
        }
    }
}

fn build_level(registry: &mut Registry) {
    let texture = registry
        .create_asset(ObjectType::Texture, "checker")
        .unwrap();
    {
        let t = registry.texture_mut(texture).unwrap();
        t.width = 2;
        t.height = 2;
        t.channels = 4;
        t.data = vec![
            255, 255, 255, 255, 0, 0, 0, 255, //
            0, 0, 0, 255, 255, 255, 255, 255,
        ];
    }

    let mesh = registry.create_asset(ObjectType::Mesh, "triangle").unwrap();
    {
        let m = registry.mesh_mut(mesh).unwrap();
        m.vertices = vec![
            Vertex {
                position: [-0.5, 0.0, 0.0],
                normal: [0.0, 0.0, 1.0],
                tangent: [1.0, 0.0, 0.0, 1.0],
                uv: [0.0, 0.0],
            },
            Vertex {
                position: [0.5, 0.0, 0.0],
                normal: [0.0, 0.0, 1.0],
                tangent: [1.0, 0.0, 0.0, 1.0],
                uv: [1.0, 0.0],
            },
            Vertex {
                position: [0.0, 1.0, 0.0],
                normal: [0.0, 0.0, 1.0],
                tangent: [1.0, 0.0, 0.0, 1.0],
                uv: [0.5, 1.0],
            },
        ];
        m.indices = vec![0, 1, 2];
    }

    let material = registry
        .create_asset(ObjectType::Material, "checkered")
        .unwrap();
    {
        let m = registry.material_mut(material).unwrap();
        m.color_map = texture;
        m.roughness = 0.35;
    }

    let scene_id = registry.initial_scene();
    let scene = registry.scene_mut(scene_id).unwrap();

    let mut root = Node::new("level");
    root.position = Vec3::new(0.0, 1.0, 0.0);

    let mut prop = Node::create(ObjectType::MeshNode, "prop", Uuid::NONE).unwrap();
    prop.position = Vec3::new(2.0, 0.0, 0.0);
    prop.rotation = Vec3::new(0.0, 45.0, 0.0);
    if let NodeKind::Mesh(m) = &mut prop.kind {
        m.mesh = mesh;
        m.material = material;
    }
    root.add_child(prop);

    let mut sun = Node::create(ObjectType::LightNode, "sun", Uuid::NONE).unwrap();
    sun.position = Vec3::new(0.0, 10.0, 0.0);
    if let NodeKind::Light(l) = &mut sun.kind {
        l.light_type = LightType::Directional;
        l.intensity = 4.0;
    }
    root.add_child(sun);

    scene.add(root);
    scene.ensure_main_camera();
    scene.update_transforms();
}
