//! Batch descriptors handed from scene nodes to the render pass.
//!
//! Scene nodes describe what to draw with borrowed GPU resources; the app
//! collects these per pipeline (opaque, transparent, gui) and issues the
//! draw calls in a fixed order each frame.

use crate::data_structures::model::Model;

/// Data for instanced object rendering: a model and its instance buffer.
///
/// Used for 3D objects rendered with GPU instancing. The instance buffer
/// contains per-instance transformation data.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// Data for flat (2D / GUI) object rendering: vertex and index buffers.
///
/// Used for the screen-space button quads; positions are already in clip
/// space so no bind groups are involved.
pub struct Flat<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub index: &'a wgpu::Buffer,
    pub amount: usize,
}
