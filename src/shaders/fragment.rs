/// Placeholder replaced by `1` or `0` when a variant is resolved.
pub const LIGHTING_TOKEN: &str = "$lighting$";

/// Terrain fragment stage. Same computation as `engine::fragment`.
pub const SOURCE: &str = "
#version 450

layout(set = 0, binding = 0) uniform PointLight {
    vec3 position;
    vec3 intensity;
} light;

layout(set = 0, binding = 1) uniform Ambient {
    vec3 ambient_light;
};

layout(set = 0, binding = 2) readonly buffer Positions {
    float positions[];
};

layout(set = 0, binding = 3) readonly buffer Normals {
    float normals[];
};

layout(set = 0, binding = 4) readonly buffer TerrainTypes {
    uint terrain_types[];
};

layout(location = 0) flat in int vertex_id;

layout(location = 0) out vec4 frag_color;

void main() {
    int face_id = vertex_id / 3;
    uint terrain_type = terrain_types[face_id];

#if $lighting$
    int position_id = vertex_id * 3;
    vec3 world_position = vec3(
        positions[position_id + 0],
        positions[position_id + 1],
        positions[position_id + 2]);

    int normal_id = face_id * 3;
    vec3 normal = vec3(
        normals[normal_id + 0],
        normals[normal_id + 1],
        normals[normal_id + 2]);

    vec3 light_path = light.position - world_position;
    // normal is unit length already, so only light_path needs dividing.
    float brightness = dot(normal, light_path) / length(light_path);
    brightness = clamp(brightness, 0.0, 1.0);
#endif

    vec4 base_color;
    if (terrain_type == 0u) {
        // grass
        base_color = vec4(0.0, 0.5, 0.0, 1.0);
    } else if (terrain_type == 1u) {
        // dirt
        base_color = vec4(0.5, 0.4, 0.2, 1.0);
    } else if (terrain_type == 2u) {
        // stone
        base_color = vec4(0.5, 0.5, 0.5, 1.0);
    } else {
        base_color = vec4(float(terrain_type) / 65535.0, 0.0, 0.0, 1.0);
    }

#if $lighting$
    vec3 lighting = brightness * light.intensity + ambient_light;
    frag_color = vec4(clamp(lighting, 0.0, 1.0), 1.0) * base_color;
#else
    frag_color = base_color;
#endif
}
";
