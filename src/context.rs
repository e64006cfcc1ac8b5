use std::sync::Arc;

use winit::window::Window;

use crate::{
    camera::{Camera, CameraResources, OrbitController, Projection},
    data_structures::texture,
    pipelines::{
        Pipelines,
        basic::mk_basic_pipeline,
        gui::mk_gui_pipeline,
        light::{LightResources, LightUniform, mk_buffer},
        shadow::ShadowResources,
        transparent::mk_transparent_pipeline,
    },
    resources::hex_color,
};

#[derive(Debug, PartialEq)]
pub enum MouseButtonState {
    Right,
    Left,
    None,
}

#[derive(Debug)]
pub struct MouseState {
    pub coords: winit::dpi::PhysicalPosition<f64>,
    pub pressed: MouseButtonState,
}

/// The central GPU and window context: device, queue, surface, camera,
/// light/shadow resources and the render pipelines.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub clear_colour: wgpu::Color,
    pub camera: CameraResources,
    pub projection: Projection,
    pub light: LightResources,
    pub shadow: ShadowResources,
    pub pipelines: Pipelines,
    pub mouse: MouseState,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        log::info!("surface");
        let surface_caps = surface.get_capabilities(&adapter);
        // The scene shader assumes an sRGB surface; on a non-sRGB surface
        // the colors would come out darker.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        // The canonical viewpoint: above and outside the front-right corner,
        // orbiting the castle's origin, zoom clamped to 10..50 units.
        let camera = Camera::looking_from(
            cgmath::Point3::new(20.0, 15.0, 20.0),
            cgmath::Point3::new(0.0, 0.0, 0.0),
        );
        let controller = OrbitController::new(10.0, 50.0, 0.05);
        let projection =
            Projection::new(config.width, config.height, cgmath::Deg(75.0), 0.1, 1000.0);
        let camera = CameraResources::new(&device, camera, controller, &projection);

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        // One white directional light plus a dim ambient term.
        let ambient = hex_color(0x404040);
        let light_uniform = LightUniform::new(
            [20.0, 30.0, 20.0],
            [1.0, 1.0, 1.0],
            [ambient[0], ambient[1], ambient[2]],
        );
        let light_buffer = mk_buffer(&device, light_uniform);
        let shadow = ShadowResources::new(&device, &light_buffer);
        let shadow_sampler = shadow
            .texture
            .sampler
            .clone()
            .expect("depth textures always carry a comparison sampler");
        let light = LightResources::new(
            &device,
            light_uniform,
            light_buffer,
            &shadow.texture.view,
            &shadow_sampler,
        );

        let pipelines = Pipelines {
            basic: mk_basic_pipeline(
                &device,
                config.format,
                &light.bind_group_layout,
                &camera.bind_group_layout,
            ),
            transparent: mk_transparent_pipeline(
                &device,
                config.format,
                &light.bind_group_layout,
                &camera.bind_group_layout,
            ),
            gui: mk_gui_pipeline(&device, config.format),
        };

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            clear_colour: wgpu::Color {
                r: 0.53,
                g: 0.81,
                b: 0.92,
                a: 1.0,
            },
            camera,
            projection,
            light,
            shadow,
            pipelines,
            mouse: MouseState {
                coords: (0.0, 0.0).into(),
                pressed: MouseButtonState::None,
            },
        })
    }

    /// Write the current camera uniform to its GPU buffer.
    pub fn write_camera_buffer(&mut self) {
        self.camera
            .uniform
            .update_view_proj(&self.camera.camera, &self.projection);
        self.queue.write_buffer(
            &self.camera.buffer,
            0,
            bytemuck::cast_slice(&[self.camera.uniform]),
        );
    }
}
