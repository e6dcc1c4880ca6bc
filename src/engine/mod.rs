// Engine module exports

pub mod buffer;
pub mod fragment;
pub mod light;
pub mod renderer;
pub mod shader_loader;

// Re-export commonly used types
pub use fragment::TerrainFragmentShader;
pub use renderer::Renderer;
pub use shader_loader::ShaderManager;
