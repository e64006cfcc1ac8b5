//! Render pipeline definitions: the opaque scene pipeline, the alpha-blended
//! pipeline for the moat water, the depth-only shadow pass and the GUI
//! button pipeline.

pub mod basic;
pub mod gui;
pub mod light;
pub mod shadow;
pub mod transparent;

/// All pipelines used by a frame, created once at context setup.
#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
    pub gui: wgpu::RenderPipeline,
}
