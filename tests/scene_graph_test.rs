use std::f32::consts::FRAC_PI_2;

use alpine_backdrop::{
    data_structures::{
        instance::Instance,
        scene_graph::{ContainerNode, SceneNode},
    },
    render::Batches,
};
use cgmath::{Quaternion, Rad, Rotation3, Vector3};

use crate::common::test_utils::assert_close;
mod common;

fn at(x: f32, y: f32, z: f32) -> Instance {
    Instance::from(Vector3::new(x, y, z))
}

#[test]
fn should_compose_nested_translations() {
    let mut root = ContainerNode::new(1);
    root.set_local_transform(0, at(1.0, 0.0, 0.0));
    let mut child = ContainerNode::new(1);
    child.set_local_transform(0, at(0.0, 2.0, 0.0));
    root.add_child(Box::new(child));

    root.update_world_transform_all();

    let world = root.get_children()[0].get_world_transforms();
    assert_eq!(world[0].position, Vector3::new(1.0, 2.0, 0.0));
}

#[test]
fn should_carry_children_along_a_parent_rotation() {
    let mut root = ContainerNode::new(1);
    root.set_local_transform(
        0,
        Instance {
            rotation: Quaternion::from_angle_y(Rad(FRAC_PI_2)),
            ..Default::default()
        },
    );
    let mut child = ContainerNode::new(1);
    child.set_local_transform(0, at(1.0, 0.0, 0.0));
    root.add_child(Box::new(child));

    root.update_world_transform_all();

    let position = root.get_children()[0].get_world_transforms()[0].position;
    assert_close(position.x, 0.0, 1e-6);
    assert_close(position.y, 0.0, 1e-6);
    assert_close(position.z, -1.0, 1e-6);
}

#[test]
fn should_pair_instances_by_index() {
    let mut root = ContainerNode::new(2);
    root.set_local_transform(0, at(10.0, 0.0, 0.0));
    root.set_local_transform(1, at(-10.0, 0.0, 0.0));
    let mut child = ContainerNode::new(2);
    child.set_local_transform_all(&mut |local: &mut Instance| local.position.y = 1.0);
    root.add_child(Box::new(child));

    root.update_world_transform_all();

    let world = root.get_children()[0].get_world_transforms();
    assert_eq!(world[0].position, Vector3::new(10.0, 1.0, 0.0));
    assert_eq!(world[1].position, Vector3::new(-10.0, 1.0, 0.0));
}

#[test]
fn should_leave_child_untouched_when_it_has_fewer_instances() {
    let mut root = ContainerNode::new(2);
    root.set_local_transform(0, at(5.0, 0.0, 0.0));
    root.add_child(Box::new(ContainerNode::new(1)));

    root.update_world_transform_all();

    let world = root.get_children()[0].get_world_transforms();
    assert_eq!(world[0], Instance::default());
}

#[test]
fn should_ignore_out_of_range_instances() {
    let mut root = ContainerNode::new(1);
    root.set_local_transform(5, at(1.0, 1.0, 1.0));
    assert_eq!(root.instance_count(), 1);
    assert!(root.get_local_transform(5).is_none());
    assert_eq!(root.get_local_transform(0), Some(Instance::default()));
}

#[test]
fn should_render_nothing_without_meshes() {
    let mut root = ContainerNode::new(1);
    root.add_child(Box::new(ContainerNode::new(1)));
    let batches = Batches::from_render(root.get_render());
    assert!(batches.is_empty());
}
