//! Terrain fragment shading.
//!
//! Colors terrain faces by their terrain type and, in the lit variant,
//! modulates that color by a single point light plus an ambient term. The
//! per-fragment computation lives in [`engine::fragment`]; the GLSL sources
//! of the same stage live in [`shaders`].

pub mod config;
pub mod engine;
pub mod shaders;

pub use config::ShadingConfig;
pub use engine::buffer::{Block, TerrainBuffers, TerrainType};
pub use engine::fragment::{FragmentInputs, Lighting, TerrainFragmentShader};
pub use engine::light::PointLight;
pub use engine::renderer::Renderer;
pub use engine::shader_loader::ShaderManager;
