//! Scene data: meshes, textures, materials, instances, particles and the scene graph.
//!
//! - `model` holds vertex data and GPU meshes
//! - `texture` is the GPU texture wrapper and sampler setup
//! - `material` pairs a uniform with textures; shared materials are reference counted
//! - `instance` holds per-instance transformation and tint data
//! - `scene_graph` enables hierarchical scene organization
//! - `terrain` builds the terrain grid and mirrors its shader maths
//! - `particles` simulates and uploads the sprite fields
//! - `shapes` builds cones and spheres

pub mod instance;
pub mod material;
pub mod model;
pub mod particles;
pub mod scene_graph;
pub mod shapes;
pub mod terrain;
pub mod texture;
