use bytemuck::{Pod, Zeroable};
use nalgebra::{Point3, Vector3};

/// A single point light, fixed for a whole draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Point3<f32>,
    /// RGB intensity. Components are unbounded; the lit variant clamps the
    /// combined lighting term, not the intensity.
    pub intensity: Vector3<f32>,
}

impl PointLight {
    pub fn new(position: Point3<f32>, intensity: Vector3<f32>) -> Self {
        Self {
            position,
            intensity,
        }
    }

    /// Vector from `point` towards the light.
    #[inline]
    pub fn path_from(&self, point: &Point3<f32>) -> Vector3<f32> {
        self.position - point
    }

    /// std140 layout of the `PointLight` uniform block.
    pub fn to_uniform(&self) -> PointLightUniform {
        PointLightUniform {
            position: self.position.coords.into(),
            _pad0: 0.0,
            intensity: self.intensity.into(),
            _pad1: 0.0,
        }
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 16.0, 0.0), Vector3::new(1.0, 1.0, 1.0))
    }
}

/// Ambient term used by the demo scene.
pub fn default_ambient() -> Vector3<f32> {
    Vector3::new(0.4, 0.4, 0.4)
}

/// Uniform buffer contents for `PointLight`. Each `vec3` occupies 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 3],
    _pad0: f32,
    pub intensity: [f32; 3],
    _pad1: f32,
}

/// Uniform buffer contents for `Ambient`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct AmbientUniform {
    pub ambient_light: [f32; 3],
    _pad0: f32,
}

impl AmbientUniform {
    pub fn new(ambient: &Vector3<f32>) -> Self {
        Self {
            ambient_light: (*ambient).into(),
            _pad0: 0.0,
        }
    }
}
