use anyhow::{bail, Context, Result};
use image::{Rgba, RgbaImage};
use log::info;
use nalgebra::{Vector3, Vector4};
use std::path::Path;
use std::time::Instant;

use crate::engine::buffer::{TerrainBuffers, VERTICES_PER_TRIANGLE};
use crate::engine::fragment::{FragmentInputs, TerrainFragmentShader};
use crate::engine::light::{AmbientUniform, PointLight, PointLightUniform};

/// Clamps a color to `[0, 1]` and quantizes it to 8 bits per channel.
pub fn to_rgba8(color: &Vector4<f32>) -> Rgba<u8> {
    let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([
        quantize(color.x),
        quantize(color.y),
        quantize(color.z),
        quantize(color.w),
    ])
}

/// Per-draw data in the order of the fragment stage's `set = 0` bindings.
pub struct DrawBindings<'a> {
    pub light: PointLightUniform,
    pub ambient: AmbientUniform,
    pub positions: &'a [u8],
    pub normals: &'a [u8],
    pub terrain_types: &'a [u8],
}

impl DrawBindings<'_> {
    /// `(binding, byte size)` for every binding.
    pub fn binding_sizes(&self) -> [(u32, usize); 5] {
        [
            (0, bytemuck::bytes_of(&self.light).len()),
            (1, bytemuck::bytes_of(&self.ambient).len()),
            (2, self.positions.len()),
            (3, self.normals.len()),
            (4, self.terrain_types.len()),
        ]
    }
}

/// Runs the terrain fragment stage on the CPU over a whole buffer set.
pub struct Renderer {
    shader: TerrainFragmentShader,
    light: PointLight,
    ambient_light: Vector3<f32>,
}

impl Renderer {
    pub fn new(
        shader: TerrainFragmentShader,
        light: PointLight,
        ambient_light: Vector3<f32>,
    ) -> Self {
        info!(
            "Renderer created ({:?} variant, light at {:?})",
            shader.lighting(),
            light.position
        );
        Self {
            shader,
            light,
            ambient_light,
        }
    }

    pub fn shader(&self) -> &TerrainFragmentShader {
        &self.shader
    }

    /// Uniform and buffer payloads a GPU draw of `buffers` would bind.
    pub fn bindings<'a>(&self, buffers: &'a TerrainBuffers) -> DrawBindings<'a> {
        DrawBindings {
            light: self.light.to_uniform(),
            ambient: AmbientUniform::new(&self.ambient_light),
            positions: buffers.positions_bytes(),
            normals: buffers.normals_bytes(),
            terrain_types: buffers.terrain_types_bytes(),
        }
    }

    fn inputs<'a>(&'a self, buffers: &'a TerrainBuffers) -> FragmentInputs<'a> {
        FragmentInputs::new(&self.light, &self.ambient_light, buffers)
    }

    /// One invocation per fragment-generating vertex, in vertex order.
    pub fn shade_all(&self, buffers: &TerrainBuffers) -> Vec<Vector4<f32>> {
        let inputs = self.inputs(buffers);
        (0..buffers.vertex_count() as u32)
            .map(|vertex_id| self.shader.shade(&inputs, vertex_id))
            .collect()
    }

    /// One color per face, taken from the face's first vertex.
    pub fn shade_faces(&self, buffers: &TerrainBuffers) -> Vec<Vector4<f32>> {
        let inputs = self.inputs(buffers);
        (0..buffers.face_count() as u32)
            .map(|face_id| self.shader.shade(&inputs, face_id * VERTICES_PER_TRIANGLE as u32))
            .collect()
    }

    /// Draws every face as a `tile x tile` square, row-major, in a grid with
    /// `ceil(sqrt(faces))` columns.
    pub fn render_face_atlas(&self, buffers: &TerrainBuffers, tile: u32) -> Result<RgbaImage> {
        if tile == 0 {
            bail!("atlas tile size must be positive");
        }
        buffers.validate()?;

        let (columns, rows) = atlas_grid(buffers.face_count());
        let (width, height) = match (columns.checked_mul(tile), rows.checked_mul(tile)) {
            (Some(width), Some(height)) => (width, height),
            _ => bail!(
                "atlas of {}x{} tiles at {} pixels per tile does not fit in u32",
                columns,
                rows,
                tile
            ),
        };

        let start = Instant::now();
        let colors = self.shade_faces(buffers);
        let mut image = RgbaImage::new(width, height);
        for (face, color) in colors.iter().enumerate() {
            let pixel = to_rgba8(color);
            let x0 = (face as u32 % columns) * tile;
            let y0 = (face as u32 / columns) * tile;
            for y in y0..y0 + tile {
                for x in x0..x0 + tile {
                    image.put_pixel(x, y, pixel);
                }
            }
        }

        info!(
            "Shaded {} faces into a {}x{} atlas in {:?}",
            colors.len(),
            image.width(),
            image.height(),
            start.elapsed()
        );
        Ok(image)
    }

    pub fn save_face_atlas<P: AsRef<Path>>(
        &self,
        buffers: &TerrainBuffers,
        tile: u32,
        path: P,
    ) -> Result<()> {
        let path = path.as_ref();
        let image = self.render_face_atlas(buffers, tile)?;
        image
            .save(path)
            .with_context(|| format!("Failed to write atlas to {}", path.display()))?;
        info!("Atlas written to {}", path.display());
        Ok(())
    }
}

/// Columns and rows of the atlas grid.
fn atlas_grid(faces: usize) -> (u32, u32) {
    if faces == 0 {
        return (0, 0);
    }
    let columns = (faces as f64).sqrt().ceil() as u32;
    let rows = (faces as u32 + columns - 1) / columns;
    (columns, rows)
}
