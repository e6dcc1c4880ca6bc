// GLSL sources of the terrain pipeline. The fragment stage is a template and
// must go through `engine::shader_loader::preprocess` before compilation.

pub mod fragment;
pub mod vertex;
