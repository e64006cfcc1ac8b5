//! castellan
//!
//! A low-polygon castle scene viewer for native and WASM targets. The crate
//! constructs a fixed castle scene (walls, towers, keep, moat) as an
//! instanced scene graph, renders it with wgpu, and lets the user orbit the
//! camera and nudge the castle along the three axes with on-screen buttons.
//!
//! High-level modules
//! - `app`: window, event loop and per-frame render composition
//! - `camera`: orbit camera, inertial damping controller and view/projection uniform
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `controls`: direction commands, castle movement and the on-screen button bar
//! - `data_structures`: engine data models (meshes, instances, textures, scene graph)
//! - `pipelines`: definitions for the render pipelines (scene, transparent, shadow, gui)
//! - `render`: batch descriptors handed from scene nodes to the render pass
//! - `resources`: texture loading with color fallback and procedural geometry
//! - `scene`: the parameterized castle scene builder
//!

pub mod app;
pub mod camera;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use wgpu::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
