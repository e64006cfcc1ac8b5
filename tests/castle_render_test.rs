//! Headless GPU test: build the full castle scene, render one frame
//! offscreen (shadow pass plus main pass) and read the pixels back.
//!
//! Needs a real adapter, so it only runs with `--features integration-tests`.

#![cfg(feature = "integration-tests")]

use std::iter;

use castellan::{
    camera::{Camera, CameraResources, OrbitController, Projection},
    data_structures::model::{DrawModel, DrawShadow},
    data_structures::texture::Texture,
    pipelines::{
        basic::mk_basic_pipeline,
        light::{LightResources, LightUniform, mk_buffer},
        shadow::ShadowResources,
        transparent::mk_transparent_pipeline,
    },
    resources::hex_color,
    scene::{CastleConfig, CastleScene},
};
use cgmath::{Deg, Point3};

// 512 keeps bytes_per_row a multiple of 256, which buffer readback requires.
const WIDTH: u32 = 512;
const HEIGHT: u32 = 512;

#[test]
fn castle_scene_renders_offscreen() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .expect("no suitable GPU adapter");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .expect("failed to create device");

        let format = wgpu::TextureFormat::Rgba8UnormSrgb;

        let camera = Camera::looking_from(Point3::new(20.0, 15.0, 20.0), Point3::new(0.0, 0.0, 0.0));
        let controller = OrbitController::new(10.0, 50.0, 0.05);
        let projection = Projection::new(WIDTH, HEIGHT, Deg(75.0), 0.1, 1000.0);
        let camera = CameraResources::new(&device, camera, controller, &projection);

        let ambient = hex_color(0x404040);
        let light_uniform = LightUniform::new(
            [20.0, 30.0, 20.0],
            [1.0, 1.0, 1.0],
            [ambient[0], ambient[1], ambient[2]],
        );
        let light_buffer = mk_buffer(&device, light_uniform);
        let shadow = ShadowResources::new(&device, &light_buffer);
        let shadow_sampler = shadow.texture.sampler.clone().unwrap();
        let light = LightResources::new(
            &device,
            light_uniform,
            light_buffer,
            &shadow.texture.view,
            &shadow_sampler,
        );

        let basic = mk_basic_pipeline(
            &device,
            format,
            &light.bind_group_layout,
            &camera.bind_group_layout,
        );
        let transparent = mk_transparent_pipeline(
            &device,
            format,
            &light.bind_group_layout,
            &camera.bind_group_layout,
        );

        let mut scene = CastleScene::new(&device, &queue, &CastleConfig::default()).await;
        scene.update_transforms();
        scene.write_to_buffers(&queue, &device);

        let color_target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test color target"),
            size: wgpu::Extent3d {
                width: WIDTH,
                height: HEIGHT,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color_target.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = Texture::create_depth_texture(&device, [WIDTH, HEIGHT], "test depth");

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("test encoder"),
        });

        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &shadow.texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            shadow_pass.set_pipeline(&shadow.pipeline);
            for instanced in scene.opaque() {
                shadow_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                shadow_pass.draw_model_shadow(
                    instanced.model,
                    0..instanced.amount as u32,
                    &shadow.bind_group,
                );
            }
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&basic);
            for instanced in scene.opaque() {
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    &camera.bind_group,
                    &light.bind_group,
                );
            }
            render_pass.set_pipeline(&transparent);
            for instanced in scene.transparent() {
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    &camera.bind_group,
                    &light.bind_group,
                );
            }
        }

        let u32_size = std::mem::size_of::<u32>() as u32;
        let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size: (u32_size * WIDTH * HEIGHT) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &color_target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(u32_size * WIDTH),
                    rows_per_image: Some(HEIGHT),
                },
            },
            wgpu::Extent3d {
                width: WIDTH,
                height: HEIGHT,
                depth_or_array_layers: 1,
            },
        );

        queue.submit(iter::once(encoder.finish()));

        let buffer_slice = output_buffer.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });
        device
            .poll(wgpu::PollType::Wait)
            .unwrap();
        rx.receive().await.unwrap().unwrap();

        let data = buffer_slice.get_mapped_range();
        let image =
            image::ImageBuffer::<image::Rgba<u8>, _>::from_raw(WIDTH, HEIGHT, data).unwrap();

        // The scene must actually show up: a healthy share of pixels differs
        // from the black clear color, and they are not all one flat value.
        let mut lit = 0usize;
        let mut first_lit = None;
        let mut varied = false;
        for pixel in image.pixels() {
            let rgb = [pixel[0], pixel[1], pixel[2]];
            if rgb != [0, 0, 0] {
                lit += 1;
                match first_lit {
                    None => first_lit = Some(rgb),
                    Some(first) if first != rgb => varied = true,
                    _ => (),
                }
            }
        }
        let total = (WIDTH * HEIGHT) as usize;
        assert!(
            lit > total / 10,
            "only {lit}/{total} pixels were rendered on"
        );
        assert!(varied, "rendered pixels are a single flat color");
    });
}
