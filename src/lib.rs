//! alpine-backdrop
//!
//! Animated 3D backdrops for a marketing page, rendered with wgpu natively and in the
//! browser. The hero section sits in front of a displaced snowy terrain with falling snow,
//! distant peaks and drifting clouds; the rest of the page shows a spinning globe with an
//! atmosphere glow and a starfield. Page scroll decides which of the two is visible.
//!
//! High-level modules
//! - `background`: scroll position to visible backdrop state machine
//! - `camera`: cameras, projection, uniforms and the eased camera rig
//! - `config`: RON-backed configuration of both scenes
//! - `context`: GPU context shared by both backdrops and one viewport per backdrop
//! - `data_structures`: meshes, instances, materials, particles and the scene graph
//! - `flow`: event loop and frame driver
//! - `pipelines`: render pipelines and their uniform layouts
//! - `relay`: the contact-form relay served next to the page
//! - `render`: render composition and batching per pipeline
//! - `resources`: asset loading and procedural fallback textures
//! - `scenes`: the scene controllers and both backdrops
//!

pub mod background;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
#[cfg(not(target_arch = "wasm32"))]
pub mod relay;
pub mod render;
pub mod resources;
pub mod scenes;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use flow::run;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point of the web build, invoked when the module is loaded.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    flow::run().map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
