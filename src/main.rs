use anyhow::Result;
use log::{debug, info};

use terrain_shader::engine::buffer::demo_terrain;
use terrain_shader::{Renderer, ShaderManager, ShadingConfig, TerrainFragmentShader};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();
    info!("Starting terrain shading");

    let config = ShadingConfig::from_env()?;
    info!("Using {:?} variant", config.lighting);

    // Resolve the GLSL variant matching the CPU pass
    let mut shader_manager = match &config.fragment_template {
        Some(path) => ShaderManager::load_fragment_template(path)?,
        None => ShaderManager::new(),
    };
    let fragment_source = shader_manager.fragment_source(config.lighting)?;
    debug!("Resolved fragment source:\n{}", fragment_source);

    #[cfg(feature = "spirv")]
    {
        let spirv = shader_manager.load_fragment_spirv(config.lighting)?;
        info!("Fragment variant compiled to {} bytes of SPIR-V", spirv.len());
        shader_manager.load_vertex_spirv()?;
    }

    // Build the scene and shade every face
    let buffers = demo_terrain();
    let renderer = Renderer::new(
        TerrainFragmentShader::new(config.lighting),
        config.light,
        config.ambient_light,
    );
    let bindings = renderer.bindings(&buffers);
    for (binding, size) in bindings.binding_sizes() {
        debug!("Binding {}: {} bytes", binding, size);
    }
    info!(
        "Shading {} faces with the {:?} variant",
        buffers.face_count(),
        renderer.shader().lighting()
    );
    renderer.save_face_atlas(&buffers, config.tile_size, &config.atlas_path)?;

    Ok(())
}
