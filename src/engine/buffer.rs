use anyhow::{bail, Result};
use log::info;
use nalgebra::{Point3, Vector3};

pub const VERTICES_PER_TRIANGLE: usize = 3;
pub const TRIANGLES_PER_BLOCK: usize = 12;
pub const TRIANGLE_VERTICES_PER_BLOCK: usize = TRIANGLES_PER_BLOCK * VERTICES_PER_TRIANGLE;

/// Scalars per position or normal entry in the flat buffers.
pub const COMPONENTS: usize = 3;

/// Terrain materials with a dedicated color. Any other code is shaded with
/// the debug encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TerrainType {
    Grass = 0,
    Dirt = 1,
    Stone = 2,
}

impl TerrainType {
    #[inline]
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(TerrainType::Grass),
            1 => Some(TerrainType::Dirt),
            2 => Some(TerrainType::Stone),
            _ => None,
        }
    }
}

/// An axis-aligned terrain block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub low_corner: Point3<f32>,
    pub high_corner: Point3<f32>,
    pub terrain: TerrainType,
}

impl Block {
    pub fn new(low_corner: Point3<f32>, high_corner: Point3<f32>, terrain: TerrainType) -> Self {
        Self {
            low_corner,
            high_corner,
            terrain,
        }
    }

    /// The sides of the block as triangles. Vertices are counter-clockwise
    /// when viewed from outside, so `(b - a) x (c - a)` points outwards.
    pub fn to_triangles(&self) -> [[Point3<f32>; VERTICES_PER_TRIANGLE]; TRIANGLES_PER_BLOCK] {
        let (x1, y1, z1) = (self.low_corner.x, self.low_corner.y, self.low_corner.z);
        let (x2, y2, z2) = (self.high_corner.x, self.high_corner.y, self.high_corner.z);

        let vtx = |x: f32, y: f32, z: f32| Point3::new(x, y, z);

        [
            // front
            [vtx(x1, y1, z2), vtx(x2, y2, z2), vtx(x1, y2, z2)],
            [vtx(x1, y1, z2), vtx(x2, y1, z2), vtx(x2, y2, z2)],
            // left
            [vtx(x1, y1, z1), vtx(x1, y2, z2), vtx(x1, y2, z1)],
            [vtx(x1, y1, z1), vtx(x1, y1, z2), vtx(x1, y2, z2)],
            // top
            [vtx(x1, y2, z1), vtx(x2, y2, z2), vtx(x2, y2, z1)],
            [vtx(x1, y2, z1), vtx(x1, y2, z2), vtx(x2, y2, z2)],
            // back
            [vtx(x1, y1, z1), vtx(x2, y2, z1), vtx(x2, y1, z1)],
            [vtx(x1, y1, z1), vtx(x1, y2, z1), vtx(x2, y2, z1)],
            // right
            [vtx(x2, y1, z1), vtx(x2, y2, z2), vtx(x2, y1, z2)],
            [vtx(x2, y1, z1), vtx(x2, y2, z1), vtx(x2, y2, z2)],
            // bottom
            [vtx(x1, y1, z1), vtx(x2, y1, z2), vtx(x1, y1, z2)],
            [vtx(x1, y1, z1), vtx(x2, y1, z1), vtx(x2, y1, z2)],
        ]
    }
}

/// Unit normal of a counter-clockwise triangle.
pub fn face_normal(triangle: &[Point3<f32>; VERTICES_PER_TRIANGLE]) -> Vector3<f32> {
    let [a, b, c] = triangle;
    (b - a).cross(&(c - a)).normalize()
}

/// Face that a fragment-generating vertex belongs to.
#[inline]
pub fn face_id(vertex_id: u32) -> u32 {
    vertex_id / VERTICES_PER_TRIANGLE as u32
}

/// The three flat buffers read by the terrain fragment stage.
///
/// - `positions`: one `xyz` triple per vertex, read at `vertex_id * 3`.
/// - `normals`: one unit `xyz` triple per face, read at `face_id * 3`.
/// - `terrain_types`: one code per face, read at `face_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainBuffers {
    positions: Vec<f32>,
    normals: Vec<f32>,
    terrain_types: Vec<u32>,
}

impl TerrainBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps buffers produced elsewhere. Nothing is checked here; see
    /// [`TerrainBuffers::validate`].
    pub fn from_raw(positions: Vec<f32>, normals: Vec<f32>, terrain_types: Vec<u32>) -> Self {
        Self {
            positions,
            normals,
            terrain_types,
        }
    }

    /// Appends one face. The normal is derived from the winding.
    pub fn push_triangle(
        &mut self,
        triangle: &[Point3<f32>; VERTICES_PER_TRIANGLE],
        terrain_type: u32,
    ) {
        for vertex in triangle {
            self.positions.extend_from_slice(&[vertex.x, vertex.y, vertex.z]);
        }
        let normal = face_normal(triangle);
        self.normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
        self.terrain_types.push(terrain_type);
    }

    pub fn push_block(&mut self, block: &Block) {
        for triangle in block.to_triangles().iter() {
            self.push_triangle(triangle, block.terrain.code());
        }
    }

    pub fn face_count(&self) -> usize {
        self.terrain_types.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / COMPONENTS
    }

    pub fn is_empty(&self) -> bool {
        self.terrain_types.is_empty()
    }

    /// Checks that the three buffers describe the same number of faces.
    pub fn validate(&self) -> Result<()> {
        let faces = self.terrain_types.len();
        let expected_positions = faces * VERTICES_PER_TRIANGLE * COMPONENTS;
        if self.positions.len() != expected_positions {
            bail!(
                "position buffer holds {} scalars, expected {} for {} faces",
                self.positions.len(),
                expected_positions,
                faces
            );
        }
        let expected_normals = faces * COMPONENTS;
        if self.normals.len() != expected_normals {
            bail!(
                "normal buffer holds {} scalars, expected {} for {} faces",
                self.normals.len(),
                expected_normals,
                faces
            );
        }
        Ok(())
    }

    /// World position of a vertex. Panics if `vertex_id` is out of range.
    #[inline]
    pub fn position(&self, vertex_id: u32) -> Point3<f32> {
        let position_id = vertex_id as usize * COMPONENTS;
        Point3::new(
            self.positions[position_id],
            self.positions[position_id + 1],
            self.positions[position_id + 2],
        )
    }

    /// Flat normal of a face, as stored. Not renormalized.
    #[inline]
    pub fn normal(&self, face_id: u32) -> Vector3<f32> {
        let normal_id = face_id as usize * COMPONENTS;
        Vector3::new(
            self.normals[normal_id],
            self.normals[normal_id + 1],
            self.normals[normal_id + 2],
        )
    }

    #[inline]
    pub fn terrain_type(&self, face_id: u32) -> u32 {
        self.terrain_types[face_id as usize]
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn terrain_types(&self) -> &[u32] {
        &self.terrain_types
    }

    pub fn positions_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normals_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    pub fn terrain_types_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.terrain_types)
    }
}

/// Terrain code outside the named materials, used to exercise the debug color.
pub const DEBUG_TERRAIN_CODE: u32 = 4096;

/// A small walled field: grass ground, two dirt platforms, stone walls on two
/// sides and a single debug-coded face.
pub fn demo_terrain() -> TerrainBuffers {
    let mut buffers = TerrainBuffers::new();

    // ground
    for i in -4..=4 {
        for j in -4..=4 {
            let (x, z) = (i as f32, j as f32);
            buffers.push_block(&Block::new(
                Point3::new(x - 0.5, 0.0, z - 0.5),
                Point3::new(x + 0.5, 1.0, z + 0.5),
                TerrainType::Grass,
            ));
        }
    }
    // low dirt platform
    for i in -1..=1 {
        for j in -1..=1 {
            let (x, z) = (3.0 + i as f32, j as f32);
            buffers.push_block(&Block::new(
                Point3::new(x - 0.5, 2.0, z - 0.5),
                Point3::new(x + 0.5, 3.0, z + 0.5),
                TerrainType::Dirt,
            ));
        }
    }
    // high dirt block
    buffers.push_block(&Block::new(
        Point3::new(-2.5, 5.0, 1.5),
        Point3::new(-1.5, 6.0, 2.5),
        TerrainType::Dirt,
    ));
    // front and back walls
    for &z in &[-5.0f32, 5.0] {
        for i in -4..=4 {
            for j in 0..2 {
                let (x, y) = (i as f32, 1.0 + j as f32);
                buffers.push_block(&Block::new(
                    Point3::new(x - 0.5, y, z - 0.5),
                    Point3::new(x + 0.5, y + 1.0, z + 0.5),
                    TerrainType::Stone,
                ));
            }
        }
    }
    // marker
    buffers.push_triangle(
        &[
            Point3::new(0.0, 4.0, 0.0),
            Point3::new(1.0, 4.0, 0.0),
            Point3::new(0.0, 4.0, -1.0),
        ],
        DEBUG_TERRAIN_CODE,
    );

    info!(
        "Demo terrain built with {} faces ({} vertices)",
        buffers.face_count(),
        buffers.vertex_count()
    );
    buffers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_block(terrain: TerrainType) -> Block {
        Block::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0), terrain)
    }

    #[test]
    fn test_block_flattens_to_twelve_faces() {
        let mut buffers = TerrainBuffers::new();
        buffers.push_block(&unit_block(TerrainType::Dirt));

        assert_eq!(buffers.face_count(), TRIANGLES_PER_BLOCK);
        assert_eq!(buffers.vertex_count(), TRIANGLE_VERTICES_PER_BLOCK);
        assert_eq!(buffers.normals().len(), TRIANGLES_PER_BLOCK * COMPONENTS);
        assert!(buffers.terrain_types().iter().all(|&t| t == 1));
        assert!(buffers.validate().is_ok());
    }

    #[test]
    fn test_block_normals_point_outwards() {
        let block = unit_block(TerrainType::Stone);
        let center = Point3::new(0.5, 0.5, 0.5);
        for triangle in block.to_triangles().iter() {
            let normal = face_normal(triangle);
            assert!((normal.norm() - 1.0).abs() < 1e-6);
            let centroid =
                Point3::from((triangle[0].coords + triangle[1].coords + triangle[2].coords) / 3.0);
            assert!(normal.dot(&(centroid - center)) > 0.0, "inward normal {:?}", normal);
        }
    }

    #[test]
    fn test_top_faces_face_up() {
        let mut buffers = TerrainBuffers::new();
        buffers.push_block(&unit_block(TerrainType::Grass));
        // top is the third side
        assert_eq!(buffers.normal(4), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(buffers.normal(5), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_fetch_uses_vertex_and_face_strides() {
        let mut buffers = TerrainBuffers::new();
        buffers.push_triangle(
            &[Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            TerrainType::Grass.code(),
        );
        buffers.push_triangle(
            &[Point3::new(5.0, 0.0, 0.0), Point3::new(5.0, 1.0, 0.0), Point3::new(5.0, 0.0, 1.0)],
            9,
        );

        assert_eq!(buffers.position(4), Point3::new(5.0, 1.0, 0.0));
        assert_eq!(buffers.normal(face_id(4)), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(buffers.terrain_type(face_id(4)), 9);
        assert_eq!(buffers.terrain_type(face_id(2)), 0);
    }

    #[test]
    fn test_face_id_is_shared_by_three_vertices() {
        for face in 0..10u32 {
            assert_eq!(face_id(face * 3), face);
            assert_eq!(face_id(face * 3 + 1), face);
            assert_eq!(face_id(face * 3 + 2), face);
        }
    }

    #[test]
    fn test_validate_rejects_mismatched_buffers() {
        let buffers = TerrainBuffers::from_raw(vec![0.0; 9], vec![0.0; 6], vec![0]);
        let err = buffers.validate().unwrap_err();
        assert!(err.to_string().contains("normal buffer"));

        let buffers = TerrainBuffers::from_raw(vec![0.0; 8], vec![0.0; 3], vec![0]);
        assert!(buffers.validate().is_err());
    }

    #[test]
    fn test_byte_views_match_buffer_sizes() {
        let mut buffers = TerrainBuffers::new();
        buffers.push_block(&unit_block(TerrainType::Grass));
        assert_eq!(buffers.positions_bytes().len(), buffers.positions().len() * 4);
        assert_eq!(buffers.normals_bytes().len(), buffers.normals().len() * 4);
        assert_eq!(buffers.terrain_types_bytes().len(), buffers.face_count() * 4);
    }

    #[test]
    fn test_demo_terrain_is_consistent() {
        let buffers = demo_terrain();
        assert!(buffers.validate().is_ok());
        assert_eq!(buffers.face_count() % TRIANGLES_PER_BLOCK, 1);
        let codes = buffers.terrain_types();
        assert!(codes.contains(&TerrainType::Grass.code()));
        assert!(codes.contains(&TerrainType::Dirt.code()));
        assert!(codes.contains(&TerrainType::Stone.code()));
        assert_eq!(codes.last(), Some(&DEBUG_TERRAIN_CODE));
    }

    #[test]
    fn test_terrain_type_codes_round_trip() {
        for t in [TerrainType::Grass, TerrainType::Dirt, TerrainType::Stone] {
            assert_eq!(TerrainType::from_code(t.code()), Some(t));
        }
        assert_eq!(TerrainType::from_code(3), None);
    }
}
