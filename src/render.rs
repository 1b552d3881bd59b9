//! Render composition and pipeline batching.
//!
//! Scene nodes describe what they want drawn as a [`Render`] tree. Before a frame is
//! encoded the tree is flattened into [`Batches`], one list per pipeline, and the batches
//! are drawn in a fixed order: opaque geometry first, then translucent and additive
//! layers, then the overlay sprites that ignore depth.
//!
//! # Key types
//!
//! - [`Render<'a>`] is the enum describing render operations
//! - [`Instanced<'a>`] is an indexed mesh with an instance buffer and a material
//! - [`Sprites<'a>`] is a particle buffer expanded to camera-facing quads

use crate::{
    data_structures::model::{DrawMesh, Mesh},
    pipelines::Pipelines,
};

/// An indexed mesh drawn `amount` times from an instance buffer in vertex slot 1.
pub struct Instanced<'a> {
    pub mesh: &'a Mesh,
    pub material: &'a wgpu::BindGroup,
    pub instances: &'a wgpu::Buffer,
    pub amount: u32,
}

/// Particles in vertex slot 0, `vertices` generated per particle in the vertex shader.
pub struct Sprites<'a> {
    pub particles: &'a wgpu::Buffer,
    pub material: &'a wgpu::BindGroup,
    pub vertices: u32,
    pub amount: u32,
}

/// The pipeline a mesh node is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Terrain,
    Lit,
    Translucent,
    Cloud,
    Glow,
    Wireframe,
}

impl Pass {
    pub fn wrap(self, instanced: Instanced<'_>) -> Render<'_> {
        match self {
            Pass::Terrain => Render::Terrain(instanced),
            Pass::Lit => Render::Lit(instanced),
            Pass::Translucent => Render::Translucent(instanced),
            Pass::Cloud => Render::Cloud(instanced),
            Pass::Glow => Render::Glow(instanced),
            Pass::Wireframe => Render::Wireframe(instanced),
        }
    }
}

/// Specifies how a scene object should be rendered.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Terrain` renders the displaced terrain grid
/// - `Lit` renders opaque meshes with the directional/hemisphere light model
/// - `Translucent` renders alpha blended lit meshes (mountain peaks)
/// - `Cloud` renders additive noise-shaded cloud blobs
/// - `Glow` renders the back-face atmosphere shell
/// - `Wireframe` renders line-list overlays
/// - `Sprites` renders depth-tested particles
/// - `Overlay` renders particles over everything else
/// - `Composed(Vec<Render>)` recursively renders composition of multiple renders
pub enum Render<'a> {
    None,
    Terrain(Instanced<'a>),
    Lit(Instanced<'a>),
    Translucent(Instanced<'a>),
    Cloud(Instanced<'a>),
    Glow(Instanced<'a>),
    Wireframe(Instanced<'a>),
    Sprites(Sprites<'a>),
    Overlay(Sprites<'a>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub fn set_pipelines(self, batches: &mut Batches<'a>) {
        match self {
            Render::None => (),
            Render::Terrain(instanced) => batches.terrain.push(instanced),
            Render::Lit(instanced) => batches.lit.push(instanced),
            Render::Translucent(instanced) => batches.translucent.push(instanced),
            Render::Cloud(instanced) => batches.cloud.push(instanced),
            Render::Glow(instanced) => batches.glow.push(instanced),
            Render::Wireframe(instanced) => batches.wireframe.push(instanced),
            Render::Sprites(sprites) => batches.sprites.push(sprites),
            Render::Overlay(sprites) => batches.overlay.push(sprites),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(batches)),
        }
    }
}

/// Draw lists per pipeline, filled by [`Render::set_pipelines`].
#[derive(Default)]
pub struct Batches<'a> {
    pub terrain: Vec<Instanced<'a>>,
    pub lit: Vec<Instanced<'a>>,
    pub translucent: Vec<Instanced<'a>>,
    pub cloud: Vec<Instanced<'a>>,
    pub glow: Vec<Instanced<'a>>,
    pub wireframe: Vec<Instanced<'a>>,
    pub sprites: Vec<Sprites<'a>>,
    pub overlay: Vec<Sprites<'a>>,
}

impl<'a> Batches<'a> {
    pub fn from_render(render: Render<'a>) -> Self {
        let mut batches = Self::default();
        render.set_pipelines(&mut batches);
        batches
    }

    /// Number of draw calls the batches will issue.
    pub fn len(&self) -> usize {
        self.terrain.len()
            + self.lit.len()
            + self.translucent.len()
            + self.cloud.len()
            + self.glow.len()
            + self.wireframe.len()
            + self.sprites.len()
            + self.overlay.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn draw<'pass>(
        self,
        render_pass: &mut wgpu::RenderPass<'pass>,
        pipelines: &'a Pipelines,
        camera_bind_group: &'a wgpu::BindGroup,
    ) where
        'a: 'pass,
    {
        let meshes = [
            (&pipelines.terrain, self.terrain),
            (&pipelines.lit, self.lit),
            (&pipelines.translucent, self.translucent),
            (&pipelines.cloud, self.cloud),
            (&pipelines.glow, self.glow),
            (&pipelines.wireframe, self.wireframe),
        ];
        for (pipeline, batch) in meshes {
            if batch.is_empty() {
                continue;
            }
            render_pass.set_pipeline(pipeline);
            for instanced in batch {
                if instanced.amount == 0 || instanced.instances.size() == 0 {
                    log::debug!("Skipping {} with zero instances", instanced.mesh.name);
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instances.slice(..));
                render_pass.draw_mesh_instanced(
                    instanced.mesh,
                    0..instanced.amount,
                    camera_bind_group,
                    instanced.material,
                );
            }
        }

        let sprites = [
            (&pipelines.sprite, self.sprites),
            (&pipelines.overlay_sprite, self.overlay),
        ];
        for (pipeline, batch) in sprites {
            if batch.is_empty() {
                continue;
            }
            render_pass.set_pipeline(pipeline);
            for sprite in batch {
                if sprite.amount == 0 {
                    continue;
                }
                render_pass.set_bind_group(0, camera_bind_group, &[]);
                render_pass.set_bind_group(1, sprite.material, &[]);
                render_pass.set_vertex_buffer(0, sprite.particles.slice(..));
                render_pass.draw(0..sprite.vertices, 0..sprite.amount);
            }
        }
    }
}
