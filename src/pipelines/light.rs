//! The scene's lighting: one ambient term plus one white directional light,
//! carried in a single uniform together with the light-space matrix used for
//! shadow mapping. The light bind group also exposes the shadow map and its
//! comparison sampler to the scene shader.

use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3, ortho};
use wgpu::util::DeviceExt;

use crate::camera::OPENGL_TO_WGPU_MATRIX;

/// Half-extent of the orthographic shadow frustum. Generous enough to cover
/// the moat plus a well-traveled castle.
const SHADOW_EXTENT: f32 = 60.0;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// Light-space view projection for the shadow pass and shadow sampling.
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use padding fields here
    _padding: u32,
    pub color: [f32; 3],
    _padding2: u32,
    pub ambient: [f32; 3],
    _padding3: u32,
}

impl LightUniform {
    pub fn new(position: [f32; 3], color: [f32; 3], ambient: [f32; 3]) -> Self {
        Self {
            view_proj: light_view_proj(position).into(),
            position,
            _padding: 0,
            color,
            _padding2: 0,
            ambient,
            _padding3: 0,
        }
    }
}

/// Orthographic view projection looking from the light toward the origin.
fn light_view_proj(position: [f32; 3]) -> Matrix4<f32> {
    let eye = Point3::from(position);
    let view = Matrix4::look_at_rh(eye, Point3::origin(), Vector3::unit_y());
    let proj = ortho(
        -SHADOW_EXTENT,
        SHADOW_EXTENT,
        -SHADOW_EXTENT,
        SHADOW_EXTENT,
        1.0,
        150.0,
    );
    OPENGL_TO_WGPU_MATRIX * proj * view
}

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    /// Bundle the light uniform with the shadow map so the scene shader can
    /// bind everything light-related as one group. The buffer is created by
    /// the caller because the shadow pass binds the same one.
    pub fn new(
        device: &wgpu::Device,
        uniform: LightUniform,
        buffer: wgpu::Buffer,
        shadow_view: &wgpu::TextureView,
        shadow_sampler: &wgpu::Sampler,
    ) -> Self {
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(shadow_sampler),
                },
            ],
            label: Some("light_bind_group"),
        });

        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Depth,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
        ],
        label: Some("light_bind_group_layout"),
    })
}
