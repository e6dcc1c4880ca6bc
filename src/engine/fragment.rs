//! CPU evaluation of the terrain fragment stage.
//!
//! Mirrors `shaders::fragment` line for line: the face of a fragment is
//! `vertex_id / 3`, its material comes from the terrain type buffer, and the
//! lit variant scales the material color by a clamped diffuse term from a
//! single point light plus ambient.

use nalgebra::{Point3, Vector3, Vector4};

use crate::engine::buffer::{face_id, TerrainBuffers, TerrainType};
use crate::engine::light::PointLight;

/// Terrain codes at or above this value saturate the debug red channel.
pub const DEBUG_CODE_SCALE: f32 = 65535.0;

/// Selects which of the two shader variants runs. Chosen once per draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lighting {
    Enabled,
    Disabled,
}

impl Lighting {
    pub fn is_enabled(self) -> bool {
        matches!(self, Lighting::Enabled)
    }
}

impl From<bool> for Lighting {
    fn from(enabled: bool) -> Self {
        if enabled {
            Lighting::Enabled
        } else {
            Lighting::Disabled
        }
    }
}

/// Everything a fragment invocation reads. Fixed for a draw call.
#[derive(Debug, Clone, Copy)]
pub struct FragmentInputs<'a> {
    pub light: &'a PointLight,
    pub ambient_light: &'a Vector3<f32>,
    pub buffers: &'a TerrainBuffers,
}

impl<'a> FragmentInputs<'a> {
    pub fn new(
        light: &'a PointLight,
        ambient_light: &'a Vector3<f32>,
        buffers: &'a TerrainBuffers,
    ) -> Self {
        Self {
            light,
            ambient_light,
            buffers,
        }
    }
}

/// Material color of a terrain code, before lighting.
pub fn base_color(terrain_type: u32) -> Vector4<f32> {
    match TerrainType::from_code(terrain_type) {
        Some(TerrainType::Grass) => Vector4::new(0.0, 0.5, 0.0, 1.0),
        Some(TerrainType::Dirt) => Vector4::new(0.5, 0.4, 0.2, 1.0),
        Some(TerrainType::Stone) => Vector4::new(0.5, 0.5, 0.5, 1.0),
        // unknown: code as red intensity, unclamped
        None => Vector4::new(terrain_type as f32 / DEBUG_CODE_SCALE, 0.0, 0.0, 1.0),
    }
}

/// Diffuse factor in `[0, 1]`.
///
/// `normal` must already be unit length. Only the light direction matters:
/// dividing by the path length normalizes it, and there is no distance
/// falloff. A zero-length path yields NaN, which `clamp` passes through.
#[inline]
pub fn brightness(normal: &Vector3<f32>, world_position: &Point3<f32>, light: &PointLight) -> f32 {
    let light_path = light.path_from(world_position);
    let brightness = normal.dot(&light_path) / light_path.norm();
    brightness.clamp(0.0, 1.0)
}

/// Lit composite: `(clamp(brightness * intensity + ambient, 0, 1), 1) * base`.
#[inline]
pub fn composite(
    base_color: &Vector4<f32>,
    brightness: f32,
    light: &PointLight,
    ambient_light: &Vector3<f32>,
) -> Vector4<f32> {
    let lighting = (light.intensity * brightness + ambient_light).map(|c| c.clamp(0.0, 1.0));
    lighting.push(1.0).component_mul(base_color)
}

/// The terrain fragment stage with its lighting variant fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainFragmentShader {
    lighting: Lighting,
}

impl TerrainFragmentShader {
    pub fn new(lighting: Lighting) -> Self {
        Self { lighting }
    }

    pub fn lighting(&self) -> Lighting {
        self.lighting
    }

    /// Color of the fragment generated by `vertex_id`.
    ///
    /// Indices are not checked against the buffers beyond slice indexing.
    pub fn shade(&self, inputs: &FragmentInputs<'_>, vertex_id: u32) -> Vector4<f32> {
        let face_id = face_id(vertex_id);
        let terrain_type = inputs.buffers.terrain_type(face_id);
        let base_color = base_color(terrain_type);

        match self.lighting {
            Lighting::Disabled => base_color,
            Lighting::Enabled => {
                let world_position = inputs.buffers.position(vertex_id);
                let normal = inputs.buffers.normal(face_id);
                let brightness = brightness(&normal, &world_position, inputs.light);
                composite(&base_color, brightness, inputs.light, inputs.ambient_light)
            }
        }
    }
}
