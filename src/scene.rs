//! The castle scene builder.
//!
//! One parameterized builder assembles the whole scene from a
//! [`CastleConfig`]: a square wall perimeter with an archway, battlements,
//! four corner towers with cone roofs, a central keep, and a
//! rounded-rectangle moat. All castle meshes hang under a single
//! [`ContainerNode`] so the group translates as one rigid unit; the moat
//! water is a separate scene child and stays put.

use cgmath::{Deg, Quaternion, Rotation3, Vector3};

use crate::{
    data_structures::{
        instance::Instance,
        model::{Material, Model},
        scene_graph::{ContainerNode, ModelNode, SceneNode},
        texture::Texture,
    },
    render::Instanced,
    resources::{self, hex_color, primitives, texture::material_layout},
};

/// Which optional decorative features to build. The scene builder is written
/// once and consults this set instead of keeping divergent variants.
#[derive(Clone, Copy, Debug)]
pub struct CastleFeatures {
    pub archway: bool,
    pub battlements: bool,
    pub moat: bool,
    pub tower_roofs: bool,
    pub windows: bool,
    /// Wooden gate filling the archway; only built together with it.
    pub gate: bool,
    /// Cobblestone path leading out of the gate, across the moat.
    pub path: bool,
}

impl Default for CastleFeatures {
    fn default() -> Self {
        Self {
            archway: true,
            battlements: true,
            moat: true,
            tower_roofs: true,
            windows: true,
            gate: true,
            path: true,
        }
    }
}

/// Dimensions of the castle. The defaults reproduce the canonical scene:
/// a 20-unit square perimeter with walls at +/-10 in X and Z.
#[derive(Clone, Debug)]
pub struct CastleConfig {
    pub wall_width: f32,
    pub wall_height: f32,
    pub wall_thickness: f32,
    /// Width of the archway opening in the front wall.
    pub entry_width: f32,
    /// Clear height under the arch-top infill.
    pub arch_clearance: f32,
    pub battlement_size: f32,
    pub battlement_spacing: f32,
    pub tower_radius: f32,
    pub tower_height: f32,
    pub tower_segments: usize,
    pub roof_radius: f32,
    pub roof_height: f32,
    pub keep_size: f32,
    pub keep_roof_size: f32,
    pub keep_roof_height: f32,
    pub window_width: f32,
    pub window_height: f32,
    pub ground_size: f32,
    pub moat_width: f32,
    pub corner_radius: f32,
    pub corner_segments: usize,
    pub features: CastleFeatures,
}

impl Default for CastleConfig {
    fn default() -> Self {
        Self {
            wall_width: 20.0,
            wall_height: 5.0,
            wall_thickness: 0.5,
            entry_width: 5.0,
            arch_clearance: 3.5,
            battlement_size: 1.0,
            battlement_spacing: 2.0,
            tower_radius: 2.0,
            tower_height: 12.0,
            tower_segments: 32,
            roof_radius: 2.5,
            roof_height: 4.0,
            keep_size: 10.0,
            keep_roof_size: 11.0,
            keep_roof_height: 1.0,
            window_width: 1.0,
            window_height: 1.5,
            ground_size: 100.0,
            moat_width: 3.0,
            corner_radius: 2.0,
            corner_segments: 8,
            features: CastleFeatures::default(),
        }
    }
}

impl CastleConfig {
    /// Walls sit at +/- this distance in X and Z.
    pub fn half_width(&self) -> f32 {
        self.wall_width / 2.0
    }

    /// Width of each wall segment flanking the archway.
    pub fn segment_width(&self) -> f32 {
        (self.wall_width - self.entry_width) / 2.0
    }

    /// Center offset of each flanking segment from the wall's middle.
    pub fn segment_offset(&self) -> f32 {
        self.wall_width / 4.0 + self.entry_width / 4.0
    }

    /// Height of the infill piece closing the archway above the clearance.
    pub fn arch_top_height(&self) -> f32 {
        self.wall_height - self.arch_clearance
    }

    /// Battlement centers along one wall, symmetric around the middle.
    pub fn battlement_positions(&self) -> Vec<f32> {
        let limit = self.half_width() - self.battlement_size;
        let mut positions = Vec::new();
        let mut x = -limit;
        while x <= limit + 1e-4 {
            positions.push(x);
            x += self.battlement_spacing;
        }
        positions
    }

    /// The four (x, z) tower corners.
    pub fn tower_corners(&self) -> [[f32; 2]; 4] {
        let h = self.half_width();
        [[h, h], [-h, h], [h, -h], [-h, -h]]
    }

    /// Half-extent of the moat's outer rounded rectangle.
    pub fn moat_outer_half(&self) -> f32 {
        self.half_width() + self.moat_width
    }
}

/// The built scene: the movable castle group and the static moat water.
pub struct CastleScene {
    pub castle: ContainerNode,
    pub water: Option<ModelNode>,
}

impl CastleScene {
    /// Build the scene once. Textures resolve to loaded images or fallback
    /// colors before any geometry is assembled.
    pub async fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        config: &CastleConfig,
    ) -> Self {
        let layout = material_layout(device);
        let (stone, roof, ground, wood, metal, cobblestone, dark_stone) = futures::join!(
            resources::load_material(device, queue, &layout, resources::STONE),
            resources::load_material(device, queue, &layout, resources::ROOF),
            resources::load_material(device, queue, &layout, resources::GROUND),
            resources::load_material(device, queue, &layout, resources::WOOD),
            resources::load_material(device, queue, &layout, resources::METAL),
            resources::load_material(device, queue, &layout, resources::COBBLESTONE),
            resources::load_material(device, queue, &layout, resources::DARK_STONE),
        );

        let features = &config.features;
        let half = config.half_width();
        let thickness = config.wall_thickness;
        let mut castle = ContainerNode::new();

        // Ground. Does not receive shadows to avoid the dark rectangle the
        // keep would otherwise stamp onto it.
        castle.add_child(Box::new(solid_node(
            device,
            primitives::plane(config.ground_size, config.ground_size, resources::GROUND.repeat),
            "ground",
            ground,
            true,
            false,
            vec![at(0.0, 0.0, 0.0)],
        )));

        // Battlements on the two Z-facing walls, one shared geometry.
        if features.battlements {
            let mut placements = Vec::new();
            for x in config.battlement_positions() {
                placements.push(at(x, config.wall_height, half));
                placements.push(at(x, config.wall_height, -half));
            }
            castle.add_child(Box::new(solid_node(
                device,
                primitives::cuboid(
                    config.battlement_size,
                    config.battlement_size,
                    thickness,
                    resources::STONE.repeat,
                ),
                "battlements",
                stone.clone(),
                true,
                true,
                placements,
            )));
        }

        // Full walls: back plus the two rotated side walls, and the front
        // too when the archway is disabled.
        let wall_y = config.wall_height / 2.0;
        let mut wall_placements = vec![
            at(0.0, wall_y, -half),
            at_rot_y(half, wall_y, 0.0, 90.0),
            at_rot_y(-half, wall_y, 0.0, 90.0),
        ];
        if !features.archway {
            wall_placements.push(at(0.0, wall_y, half));
        }
        castle.add_child(Box::new(solid_node(
            device,
            primitives::cuboid(
                config.wall_width,
                config.wall_height,
                thickness,
                resources::STONE.repeat,
            ),
            "walls",
            stone.clone(),
            true,
            true,
            wall_placements,
        )));

        if features.archway {
            // Two segments flanking the opening, then the arch-top infill.
            let front_z = half - thickness / 2.0;
            castle.add_child(Box::new(solid_node(
                device,
                primitives::cuboid(
                    config.segment_width(),
                    config.wall_height,
                    thickness,
                    resources::STONE.repeat,
                ),
                "gate walls",
                stone.clone(),
                true,
                true,
                vec![
                    at(-config.segment_offset(), wall_y, front_z),
                    at(config.segment_offset(), wall_y, front_z),
                ],
            )));
            castle.add_child(Box::new(solid_node(
                device,
                primitives::cuboid(
                    config.entry_width,
                    config.arch_top_height(),
                    thickness,
                    resources::STONE.repeat,
                ),
                "arch top",
                stone.clone(),
                true,
                true,
                vec![at(
                    0.0,
                    config.wall_height - config.arch_top_height() / 2.0,
                    front_z,
                )],
            )));

            if features.gate {
                castle.add_child(Box::new(solid_node(
                    device,
                    primitives::cuboid(
                        config.entry_width,
                        config.arch_clearance,
                        0.2,
                        resources::WOOD.repeat,
                    ),
                    "gate",
                    wood,
                    true,
                    true,
                    vec![at(0.0, config.arch_clearance / 2.0, front_z)],
                )));
            }
            if features.path {
                let length = config.moat_width + 2.0 * config.corner_radius;
                castle.add_child(Box::new(solid_node(
                    device,
                    primitives::plane(config.entry_width, length, resources::COBBLESTONE.repeat),
                    "path",
                    cobblestone,
                    true,
                    true,
                    vec![at(0.0, 0.02, half + length / 2.0)],
                )));
            }
        }

        // Corner towers and their cone roofs.
        let tower_placements = config
            .tower_corners()
            .into_iter()
            .map(|[x, z]| at(x, config.tower_height / 2.0, z))
            .collect();
        castle.add_child(Box::new(solid_node(
            device,
            primitives::cylinder(
                config.tower_radius,
                config.tower_height,
                config.tower_segments,
                resources::STONE.repeat,
            ),
            "towers",
            stone.clone(),
            true,
            true,
            tower_placements,
        )));
        if features.tower_roofs {
            let roof_placements = config
                .tower_corners()
                .into_iter()
                .map(|[x, z]| at(x, config.tower_height - config.roof_height / 2.0, z))
                .collect();
            castle.add_child(Box::new(solid_node(
                device,
                primitives::cone(
                    config.roof_radius,
                    config.roof_height,
                    config.tower_segments,
                    resources::ROOF.repeat,
                ),
                "tower roofs",
                roof.clone(),
                true,
                true,
                roof_placements,
            )));
        }

        // The keep does not cast a shadow: its shadow would read as a black
        // rectangle covering the courtyard.
        castle.add_child(Box::new(solid_node(
            device,
            primitives::cuboid(
                config.keep_size,
                config.keep_size,
                config.keep_size,
                resources::STONE.repeat,
            ),
            "keep",
            stone.clone(),
            false,
            true,
            vec![at(0.0, config.keep_size / 2.0, 0.0)],
        )));
        castle.add_child(Box::new(solid_node(
            device,
            primitives::cuboid(
                config.keep_size + 1.0,
                0.5,
                config.keep_size + 1.0,
                resources::DARK_STONE.repeat,
            ),
            "keep plinth",
            dark_stone,
            true,
            true,
            vec![at(0.0, 0.25, 0.0)],
        )));
        castle.add_child(Box::new(solid_node(
            device,
            primitives::cuboid(
                config.keep_roof_size,
                config.keep_roof_height,
                config.keep_roof_size,
                resources::ROOF.repeat,
            ),
            "keep roof",
            roof,
            true,
            true,
            vec![at(0.0, config.keep_size + config.keep_roof_height / 2.0, 0.0)],
        )));

        if features.windows {
            let window_y = config.keep_size / 2.0 + 2.0;
            let face = config.keep_size / 2.0;
            let window_material = Material::new(
                device,
                "window",
                Texture::solid_color([255, 255, 255, 255], device, queue),
                hex_color(0x333333),
                &layout,
            );
            castle.add_child(Box::new(solid_node(
                device,
                primitives::quad(config.window_width, config.window_height, 1.0).double_sided(),
                "windows",
                window_material,
                true,
                true,
                vec![at(0.0, window_y, face + 0.1), at(0.0, window_y, -(face + 0.1))],
            )));
            castle.add_child(Box::new(solid_node(
                device,
                primitives::cuboid(
                    config.window_width + 0.2,
                    config.window_height + 0.2,
                    0.1,
                    resources::METAL.repeat,
                ),
                "window frames",
                metal,
                true,
                true,
                vec![
                    at(0.0, window_y, face + 0.05),
                    at(0.0, window_y, -(face + 0.05)),
                ],
            )));
        }

        // The moat is a scene child of its own: moving the castle leaves the
        // water where it was dug.
        let water = features.moat.then(|| {
            let mut color = hex_color(0x006994);
            color[3] = 0.8;
            let material = Material::new(
                device,
                "water",
                Texture::solid_color([255, 255, 255, 255], device, queue),
                color,
                &layout,
            );
            solid_node(
                device,
                primitives::rounded_rect_ring(
                    config.moat_outer_half(),
                    config.half_width(),
                    config.corner_radius,
                    config.corner_segments,
                    8.0,
                )
                .double_sided(),
                "moat water",
                material,
                false,
                false,
                vec![at(0.0, 0.01, 0.0)],
            )
        });

        let mut scene = Self { castle, water };
        scene.update_transforms();
        scene
    }

    /// Recompute world transforms after the castle group moved.
    pub fn update_transforms(&mut self) {
        let root = Instance::default();
        self.castle.update_world_transforms(&root);
        if let Some(water) = &mut self.water {
            water.update_world_transforms(&root);
        }
    }

    /// Push world transforms into the GPU instance buffers.
    pub fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.castle.write_to_buffers(queue, device);
        if let Some(water) = &mut self.water {
            water.write_to_buffers(queue, device);
        }
    }

    /// Opaque draw batch: everything in the castle group.
    pub fn opaque(&self) -> Vec<Instanced<'_>> {
        self.castle.get_render()
    }

    /// Transparent draw batch: the moat water, if built.
    pub fn transparent(&self) -> Vec<Instanced<'_>> {
        self.water
            .as_ref()
            .map(|w| w.get_render())
            .unwrap_or_default()
    }
}

fn at(x: f32, y: f32, z: f32) -> Instance {
    Instance::from(Vector3::new(x, y, z))
}

fn at_rot_y(x: f32, y: f32, z: f32, degrees: f32) -> Instance {
    let mut instance = at(x, y, z);
    instance.rotation = Quaternion::from_angle_y(Deg(degrees));
    instance
}

/// One geometry, one material, N placements.
fn solid_node(
    device: &wgpu::Device,
    data: primitives::MeshData,
    name: &str,
    material: Material,
    casts_shadow: bool,
    receives_shadow: bool,
    placements: Vec<Instance>,
) -> ModelNode {
    let mesh = data.into_mesh(device, name, 0, casts_shadow, receives_shadow);
    let model = Model {
        meshes: vec![mesh],
        materials: vec![material],
    };
    let mut node = ModelNode::from_model(placements.len(), device, model);
    for (i, placement) in placements.into_iter().enumerate() {
        node.set_instance(i, placement);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_reproduces_the_canonical_layout() {
        let config = CastleConfig::default();
        assert_eq!(config.half_width(), 10.0);
        assert_eq!(config.segment_width(), 7.5);
        assert_eq!(config.segment_offset(), 6.25);
        assert_eq!(config.arch_top_height(), 1.5);
        assert_eq!(config.moat_outer_half(), 13.0);
    }

    #[test]
    fn battlements_run_from_minus_nine_to_nine_inclusive() {
        let config = CastleConfig::default();
        let positions = config.battlement_positions();
        assert_eq!(positions.len(), 10);
        assert!((positions[0] + 9.0).abs() < 1e-4);
        assert!((positions[9] - 9.0).abs() < 1e-4);
        for pair in positions.windows(2) {
            assert!((pair[1] - pair[0] - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn towers_sit_on_the_four_corners() {
        let corners = CastleConfig::default().tower_corners();
        assert_eq!(corners.len(), 4);
        for [x, z] in corners {
            assert_eq!(x.abs(), 10.0);
            assert_eq!(z.abs(), 10.0);
        }
    }

    #[test]
    fn archway_segments_flank_a_five_unit_opening() {
        let config = CastleConfig::default();
        // Inner edges of the two segments leave exactly the entry width free.
        let inner_left = -config.segment_offset() + config.segment_width() / 2.0;
        let inner_right = config.segment_offset() - config.segment_width() / 2.0;
        assert!((inner_right - inner_left - config.entry_width).abs() < 1e-4);
    }
}
