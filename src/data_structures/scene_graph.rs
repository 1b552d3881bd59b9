//! Scene graph and hierarchical scene organization.
//!
//! A node holds a list of `(local, world)` instance pairs and its children. Instance `i`
//! of a parent is the parent space of instance `i` of every child, so a globe container
//! with one instance carries its surface, wireframe and atmosphere children along when it
//! spins. Mesh nodes reference their mesh and material through `Rc`, which lets many
//! instances share one immutable material.

use std::{ops::Range, rc::Rc};

use log::warn;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::{Instance, InstanceRaw},
        material::Material,
        model::Mesh,
    },
    render::{Instanced, Pass, Render},
};

pub trait SceneNode {
    fn get_world_transforms(&self) -> Vec<Instance>;

    fn get_local_transform(&self, idx: usize) -> Option<Instance>;

    fn set_local_transform(&mut self, idx: usize, instance: Instance);

    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(&mut Instance));

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    /// Recomputes `world = parent * local` for the instances in `range` and passes the
    /// result down to the same range of every child.
    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Instance]);

    /// Recomputes all world transforms with this node as the root.
    fn update_world_transform_all(&mut self);

    fn instance_count(&self) -> usize;

    /// Uploads changed instance data of this node and its children.
    fn write_to_buffers(&mut self, queue: &wgpu::Queue);

    fn get_render(&self) -> Render<'_>;
}

fn identity_parents(amount: usize) -> Vec<Instance> {
    (0..amount).map(|_| Instance::default()).collect()
}

/// Shared body of `update_world_transforms`: updates the world half of each pair and
/// returns the new world transforms, or `None` when the request does not fit.
fn compose_range(
    instances: &mut [(Instance, Instance)],
    range: Range<usize>,
    parents_world_transform: &[Instance],
) -> Option<Vec<Instance>> {
    if parents_world_transform.len() > instances.len() {
        warn!(
            "Tried to transform with {} parents, but there are only {} instances to transform.",
            parents_world_transform.len(),
            instances.len()
        );
        return None;
    }
    let Some(targets) = instances.get_mut(range.clone()) else {
        warn!(
            "Tried to transform range {}..{}, which is out of bounds for len {}.",
            range.start,
            range.end,
            instances.len(),
        );
        return None;
    };
    Some(
        targets
            .iter_mut()
            .zip(parents_world_transform.iter())
            .map(|((local, world), parent)| {
                *world = parent * &*local;
                world.clone()
            })
            .collect(),
    )
}

/// A transform-only node grouping its children.
pub struct ContainerNode {
    pub children: Vec<Box<dyn SceneNode>>,
    pub instances: Vec<(Instance, Instance)>,
}

impl ContainerNode {
    pub fn new(amount: usize) -> Self {
        let instances = (0..amount)
            .map(|_| (Instance::default(), Instance::default()))
            .collect();
        Self {
            instances,
            children: vec![],
        }
    }
}

impl SceneNode for ContainerNode {
    fn get_world_transforms(&self) -> Vec<Instance> {
        self.instances
            .iter()
            .map(|(_, world)| world)
            .cloned()
            .collect()
    }

    fn get_local_transform(&self, idx: usize) -> Option<Instance> {
        self.instances.get(idx).map(|(local, _)| local).cloned()
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(&mut Instance)) {
        self.instances
            .iter_mut()
            .for_each(|(local, _)| mutation(local));
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Instance]) {
        if let Some(world_transforms) =
            compose_range(&mut self.instances, range.clone(), parents_world_transform)
        {
            for child in self.children.iter_mut() {
                child.update_world_transforms(range.clone(), &world_transforms);
            }
        }
    }

    fn update_world_transform_all(&mut self) {
        let range = 0..self.instances.len();
        self.update_world_transforms(range, &identity_parents(self.instances.len()));
    }

    fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue));
    }

    fn get_render(&self) -> Render<'_> {
        Render::Composed(self.children.iter().map(|child| child.get_render()).collect())
    }
}

/// A mesh drawn once per instance with a shared material.
pub struct MeshNode<U: bytemuck::Pod> {
    name: String,
    children: Vec<Box<dyn SceneNode>>,
    instances: Vec<(Instance, Instance)>,
    instance_buffer: wgpu::Buffer,
    mesh: Rc<Mesh>,
    material: Rc<Material<U>>,
    pass: Pass,
    dirty: bool,
}

impl<U: bytemuck::Pod> MeshNode<U> {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        mesh: Rc<Mesh>,
        material: Rc<Material<U>>,
        pass: Pass,
        amount: usize,
    ) -> Self {
        let instances = (0..amount)
            .map(|_| (Instance::default(), Instance::default()))
            .collect::<Vec<_>>();
        let instance_data = instances
            .iter()
            .map(|(_, world)| world.to_raw())
            .collect::<Vec<_>>();

        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Instance Buffer", name)),
            contents: bytemuck::cast_slice(&instance_data),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            name: name.to_string(),
            children: vec![],
            instances,
            instance_buffer,
            mesh,
            material,
            pass,
            dirty: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn material(&self) -> &Rc<Material<U>> {
        &self.material
    }
}

impl<U: bytemuck::Pod> SceneNode for MeshNode<U> {
    fn get_world_transforms(&self) -> Vec<Instance> {
        self.instances
            .iter()
            .map(|(_, world)| world)
            .cloned()
            .collect()
    }

    fn get_local_transform(&self, idx: usize) -> Option<Instance> {
        self.instances.get(idx).map(|(local, _)| local).cloned()
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(&mut Instance)) {
        self.instances
            .iter_mut()
            .for_each(|(local, _)| mutation(local));
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Instance]) {
        if let Some(world_transforms) =
            compose_range(&mut self.instances, range.clone(), parents_world_transform)
        {
            self.dirty = true;
            for child in self.children.iter_mut() {
                child.update_world_transforms(range.clone(), &world_transforms);
            }
        }
    }

    fn update_world_transform_all(&mut self) {
        let range = 0..self.instances.len();
        self.update_world_transforms(range, &identity_parents(self.instances.len()));
    }

    fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        if self.dirty {
            let raw_instances: Vec<InstanceRaw> = self
                .instances
                .iter()
                .map(|(_, world)| world.to_raw())
                .collect();
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raw_instances));
            self.dirty = false;
        }
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue));
    }

    fn get_render(&self) -> Render<'_> {
        let own = self.pass.wrap(Instanced {
            mesh: &self.mesh,
            material: &self.material.bind_group,
            instances: &self.instance_buffer,
            amount: self.instances.len() as u32,
        });
        if self.children.is_empty() {
            own
        } else {
            Render::Composed(
                std::iter::once(own)
                    .chain(self.children.iter().map(|child| child.get_render()))
                    .collect(),
            )
        }
    }
}
