//! # Glade — Asset Graph & Project Persistence
//!
//! A typed object model for engine content: assets (textures, meshes,
//! materials, scenes) and scene-graph nodes, addressed by random 64-bit
//! ids, with a registry for creation, lookup, cloning, and merging, and a
//! single-format JSON project file with incremental saves.
//!
//! Start with `use glade::prelude::*`, create assets through a
//! [`Registry`](registry::Registry), and persist them with
//! [`save_project`](project::save_project) /
//! [`load_project`](project::load_project).

pub mod asset;
pub mod ids;
pub mod io;
pub mod math;
pub mod node;
pub mod object;
pub mod prelude;
pub mod project;
pub mod registry;
pub mod serializer;
