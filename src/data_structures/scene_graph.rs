//! Scene graph and hierarchical scene organization.
//!
//! Two node kinds exist: [`ContainerNode`] groups children under a single
//! local transform (the castle group is one of these), and [`ModelNode`]
//! holds one geometry drawn at N per-instance transforms (battlements,
//! towers and walls reuse a single geometry this way). World transforms are
//! recomputed by parent-to-child propagation, so translating a container
//! translates everything below it rigidly.

use log::warn;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::{Instance, InstanceRaw},
        model,
    },
    render::Instanced,
};

pub trait SceneNode {
    /// The node's local transform relative to its parent.
    fn local_transform(&self) -> Instance;

    fn set_local_transform(&mut self, instance: Instance);

    /// The world transform computed by the last propagation pass (the first
    /// instance's transform for multi-instance nodes).
    fn world_transform(&self) -> Instance;

    /// Recompute world transforms from the parent's world transform down.
    fn update_world_transforms(&mut self, parent: &Instance);

    /// Push changed world transforms into GPU instance buffers.
    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device);

    fn get_render(&self) -> Vec<Instanced<'_>>;
}

/// A composite node: children share this node's transform.
pub struct ContainerNode {
    pub children: Vec<Box<dyn SceneNode>>,
    local: Instance,
    world: Instance,
}

impl ContainerNode {
    pub fn new() -> Self {
        Self {
            children: vec![],
            local: Instance::default(),
            world: Instance::default(),
        }
    }

    pub fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    /// The group's position, the only interactive state of the scene.
    pub fn position(&self) -> cgmath::Vector3<f32> {
        self.local.position
    }

    pub fn set_position(&mut self, position: cgmath::Vector3<f32>) {
        self.local.position = position;
    }

    pub fn translate(&mut self, delta: cgmath::Vector3<f32>) {
        self.local.position += delta;
    }
}

impl Default for ContainerNode {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneNode for ContainerNode {
    fn local_transform(&self) -> Instance {
        self.local.clone()
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn world_transform(&self) -> Instance {
        self.world.clone()
    }

    fn update_world_transforms(&mut self, parent: &Instance) {
        self.world = parent * &self.local;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        for child in self.children.iter_mut() {
            child.write_to_buffers(queue, device);
        }
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }
}

/// One geometry with N per-instance transforms, the leaf of the scene graph.
pub struct ModelNode {
    instance_buffer: wgpu::Buffer,
    /// (local, world) transform pairs, one per instance.
    instances: Vec<(Instance, Instance)>,
    model: model::Model,
}

impl ModelNode {
    /// Wrap a model with `amount` identity-placed instances. Positions are
    /// assigned afterwards via [`set_instance`](Self::set_instance).
    pub fn from_model(amount: usize, device: &wgpu::Device, model: model::Model) -> Self {
        let instances = (0..amount)
            .map(|_| (Instance::default(), Instance::default()))
            .collect::<Vec<_>>();

        let instance_data = instances
            .iter()
            .map(|(_, world)| world.to_raw())
            .collect::<Vec<_>>();

        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&instance_data),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            instance_buffer,
            instances,
            model,
        }
    }

    /// Set the local transform of instance `idx`. Out-of-range indices are
    /// logged and ignored.
    pub fn set_instance(&mut self, idx: usize, instance: Instance) {
        match self.instances.get_mut(idx) {
            Some((local, _)) => *local = instance,
            None => warn!(
                "instance index {} is out of bounds for node with {} instances",
                idx,
                self.instances.len()
            ),
        }
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

impl SceneNode for ModelNode {
    fn local_transform(&self) -> Instance {
        self.instances
            .first()
            .map(|(local, _)| local.clone())
            .unwrap_or_default()
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.set_instance(0, instance);
    }

    fn world_transform(&self) -> Instance {
        self.instances
            .first()
            .map(|(_, world)| world.clone())
            .unwrap_or_default()
    }

    fn update_world_transforms(&mut self, parent: &Instance) {
        for (local, world) in self.instances.iter_mut() {
            *world = parent * local;
        }
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, _device: &wgpu::Device) {
        let raw_instances: Vec<InstanceRaw> = self
            .instances
            .iter()
            .map(|(_, world)| world.to_raw())
            .collect();
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&raw_instances),
        );
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        vec![Instanced {
            instance: &self.instance_buffer,
            model: &self.model,
            amount: self.instances.len(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    /// A GPU-free node recording the world transform it last received.
    struct Probe {
        local: Instance,
        world: Instance,
    }
    impl Probe {
        fn at(position: Vector3<f32>) -> Self {
            Self {
                local: Instance::from(position),
                world: Instance::default(),
            }
        }
    }
    impl SceneNode for Probe {
        fn local_transform(&self) -> Instance {
            self.local.clone()
        }
        fn set_local_transform(&mut self, instance: Instance) {
            self.local = instance;
        }
        fn world_transform(&self) -> Instance {
            self.world.clone()
        }
        fn update_world_transforms(&mut self, parent: &Instance) {
            self.world = parent * &self.local;
        }
        fn write_to_buffers(&mut self, _: &wgpu::Queue, _: &wgpu::Device) {}
        fn get_render(&self) -> Vec<Instanced<'_>> {
            vec![]
        }
    }

    #[test]
    fn translating_the_group_translates_children_rigidly() {
        let mut group = ContainerNode::new();
        group.add_child(Box::new(Probe::at(Vector3::new(10.0, 6.0, 10.0))));
        group.add_child(Box::new(Probe::at(Vector3::new(-10.0, 6.0, -10.0))));

        group.translate(Vector3::new(3.0, 2.0, 0.0));
        group.update_world_transforms(&Instance::default());

        // Every child ends up at its local offset plus the group translation.
        assert_eq!(
            group.children[0].world_transform().position,
            Vector3::new(13.0, 8.0, 10.0)
        );
        assert_eq!(
            group.children[1].world_transform().position,
            Vector3::new(-7.0, 8.0, -10.0)
        );
    }

    #[test]
    fn nested_containers_compose_positions() {
        let mut inner = ContainerNode::new();
        inner.set_position(Vector3::new(0.0, 5.0, 0.0));
        inner.add_child(Box::new(Probe::at(Vector3::new(1.0, 0.0, 0.0))));

        let mut outer = ContainerNode::new();
        outer.set_position(Vector3::new(-1.0, -1.0, -1.0));
        outer.add_child(Box::new(inner));
        outer.update_world_transforms(&Instance::default());

        assert_eq!(
            outer.children[0].world_transform().position,
            Vector3::new(-1.0, 4.0, -1.0)
        );
    }
}
