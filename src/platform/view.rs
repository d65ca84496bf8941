//! Render snapshots
//!
//! Packs the simulation into flat `Pod` records the renderer uploads as
//! they are. Every record is made of `f32`s only, so a slice of them can
//! also be handed to JavaScript as a `Float32Array`.

use bytemuck::{Pod, Zeroable};

use crate::sim::GameState;

/// Opacity of the ambient bodies
const DRIFT_OPACITY: f32 = 0.9;
const BUBBLE_OPACITY: f32 = 0.75;

/// One drawn sphere: food particle, drifting particle or bubble
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub pos: [f32; 3],
    /// Radius after scaling
    pub radius: f32,
    pub opacity: f32,
    pub spin: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EnzymeData {
    pub pos: [f32; 3],
    pub heading: f32,
    pub tilt: f32,
    pub light: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraData {
    pub eye: [f32; 3],
    pub direction: [f32; 3],
}

/// Session batch, index-aligned with `GameSession::particles`
pub fn particle_instances(state: &GameState) -> Vec<InstanceData> {
    state
        .session
        .particles
        .iter()
        .map(|p| {
            let visual = &p.visual;
            InstanceData {
                pos: p.render_pos().to_array(),
                radius: p.radius * visual.scale,
                opacity: if visual.visible { visual.opacity } else { 0.0 },
                spin: visual.spin,
            }
        })
        .collect()
}

pub fn drift_instances(state: &GameState) -> Vec<InstanceData> {
    state
        .ambient
        .particles
        .iter()
        .map(|p| InstanceData {
            pos: p.pos.to_array(),
            radius: p.radius,
            opacity: DRIFT_OPACITY,
            spin: p.rotation.y,
        })
        .collect()
}

pub fn bubble_instances(state: &GameState) -> Vec<InstanceData> {
    state
        .ambient
        .bubbles
        .iter()
        .map(|b| InstanceData {
            pos: b.pos.to_array(),
            radius: b.radius * b.scale,
            opacity: BUBBLE_OPACITY,
            spin: b.rotation.1,
        })
        .collect()
}

pub fn enzyme_data(state: &GameState) -> Option<EnzymeData> {
    state.session.enzyme.as_ref().map(|e| EnzymeData {
        pos: e.body_pos().to_array(),
        heading: e.heading,
        tilt: e.tilt,
        light: e.light_intensity(),
    })
}

pub fn camera_data(state: &GameState) -> Option<CameraData> {
    state.session.camera.as_ref().map(|c| CameraData {
        eye: c.position.to_array(),
        direction: c.view_direction().to_array(),
    })
}

/// Fluid surface vertices, ready for a vertex buffer
pub fn surface_bytes(state: &GameState) -> &[u8] {
    state.surface.vertex_bytes()
}

/// Flatten records into their `f32` fields
pub fn to_floats<T: Pod>(records: &[T]) -> Vec<f32> {
    bytemuck::cast_slice::<T, f32>(records).to_vec()
}
