/// Terrain vertex stage. Fetches positions by `gl_VertexIndex` from the same
/// buffer the fragment stage reads and forwards the index as a flat varying.
pub const SOURCE: &str = "
#version 450

layout(set = 0, binding = 2) readonly buffer Positions {
    float positions[];
};

layout(set = 0, binding = 5) uniform Camera {
    mat4 projection_matrix;
} camera;

layout(location = 0) flat out int vertex_id;

void main() {
    // 3 components for each position.
    int position_id = gl_VertexIndex * 3;
    vec3 world_position = vec3(
        positions[position_id + 0],
        positions[position_id + 1],
        positions[position_id + 2]);

    vertex_id = gl_VertexIndex;
    gl_Position = camera.projection_matrix * vec4(world_position, 1.0);
}
";
