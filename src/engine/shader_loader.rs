use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::engine::fragment::Lighting;
use crate::shaders::{fragment, vertex};

/// Resolves the lighting placeholder of a fragment template.
///
/// Every occurrence of `$lighting$` becomes `1` or `0`, so the template can
/// gate the lighting code with `#if $lighting$`.
pub fn preprocess(template: &str, lighting: Lighting) -> Result<String> {
    if !template.contains(fragment::LIGHTING_TOKEN) {
        bail!("shader template has no {} placeholder", fragment::LIGHTING_TOKEN);
    }

    let value = if lighting.is_enabled() { "1" } else { "0" };
    let resolved = template.replace(fragment::LIGHTING_TOKEN, value);

    if let Some(start) = resolved.find('$') {
        let rest = &resolved[start + 1..];
        let placeholder = match rest.find('$') {
            Some(end) => &resolved[start..start + end + 2],
            None => "$",
        };
        bail!("unresolved placeholder {} in shader template", placeholder);
    }

    Ok(resolved)
}

/// Shader types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderType {
    Vertex,
    Fragment,
}

/// Compiles a resolved GLSL source into SPIR-V
#[cfg(feature = "spirv")]
pub fn compile_spirv(source: &str, shader_type: ShaderType, name: &str) -> Result<Vec<u8>> {
    let mut compiler = shaderc::Compiler::new()
        .ok_or_else(|| anyhow::anyhow!("Failed to create shader compiler"))?;
    let kind = match shader_type {
        ShaderType::Vertex => shaderc::ShaderKind::Vertex,
        ShaderType::Fragment => shaderc::ShaderKind::Fragment,
    };
    let binary = compiler
        .compile_into_spirv(source, kind, name, "main", None)
        .with_context(|| format!("Failed to compile {}", name))?;

    info!("Compiled {} into {} bytes of SPIR-V", name, binary.as_binary_u8().len());
    Ok(binary.as_binary_u8().to_vec())
}

/// Resolves and caches the two terrain fragment variants
pub struct ShaderManager {
    fragment_template: String,
    fragment_variants: HashMap<Lighting, String>,
    #[cfg(feature = "spirv")]
    fragment_spirv: HashMap<Lighting, Vec<u8>>,
}

impl ShaderManager {
    /// Creates a shader manager for the built-in fragment template
    pub fn new() -> Self {
        Self::with_fragment_template(fragment::SOURCE)
    }

    pub fn with_fragment_template(template: impl Into<String>) -> Self {
        Self {
            fragment_template: template.into(),
            fragment_variants: HashMap::new(),
            #[cfg(feature = "spirv")]
            fragment_spirv: HashMap::new(),
        }
    }

    /// Reads a fragment template from a file
    pub fn load_fragment_template<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let template = fs::read_to_string(path)
            .with_context(|| format!("Failed to read shader template {}", path.display()))?;
        info!("Loaded fragment template from {}", path.display());
        Ok(Self::with_fragment_template(template))
    }

    /// Gets the resolved fragment source for a lighting variant
    pub fn fragment_source(&mut self, lighting: Lighting) -> Result<&str> {
        if !self.fragment_variants.contains_key(&lighting) {
            let source = preprocess(&self.fragment_template, lighting)?;
            debug!("Resolved {:?} fragment variant ({} bytes)", lighting, source.len());
            self.fragment_variants.insert(lighting, source);
        }
        Ok(self.fragment_variants[&lighting].as_str())
    }

    /// Gets the vertex source
    pub fn vertex_source(&self) -> &'static str {
        vertex::SOURCE
    }

    /// Compiles a fragment variant to SPIR-V, reusing earlier results
    #[cfg(feature = "spirv")]
    pub fn load_fragment_spirv(&mut self, lighting: Lighting) -> Result<&[u8]> {
        if !self.fragment_spirv.contains_key(&lighting) {
            let name = match lighting {
                Lighting::Enabled => "terrain_lit.frag",
                Lighting::Disabled => "terrain_unlit.frag",
            };
            let source = self.fragment_source(lighting)?.to_owned();
            let binary = compile_spirv(&source, ShaderType::Fragment, name)?;
            self.fragment_spirv.insert(lighting, binary);
        }
        Ok(self.fragment_spirv[&lighting].as_slice())
    }

    /// Compiles the vertex stage to SPIR-V
    #[cfg(feature = "spirv")]
    pub fn load_vertex_spirv(&self) -> Result<Vec<u8>> {
        compile_spirv(self.vertex_source(), ShaderType::Vertex, "terrain.vert")
    }

    /// Number of resolved fragment variants held
    pub fn loaded_variants(&self) -> usize {
        self.fragment_variants.len()
    }

    /// Unloads all resolved variants
    pub fn unload_all(&mut self) {
        self.fragment_variants.clear();
        #[cfg(feature = "spirv")]
        self.fragment_spirv.clear();
    }
}

impl Default for ShaderManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variants_resolve_the_toggle() {
        let lit = preprocess(fragment::SOURCE, Lighting::Enabled).unwrap();
        let unlit = preprocess(fragment::SOURCE, Lighting::Disabled).unwrap();

        assert!(lit.contains("#if 1"));
        assert!(!lit.contains("#if 0"));
        assert!(unlit.contains("#if 0"));
        assert!(!unlit.contains("#if 1"));
        assert!(!lit.contains('$'));
        assert!(!unlit.contains('$'));
    }

    #[test]
    fn test_template_without_toggle_is_rejected() {
        let err = preprocess("void main() {}", Lighting::Enabled).unwrap_err();
        assert!(err.to_string().contains("$lighting$"));
    }

    #[test]
    fn test_leftover_placeholder_is_rejected() {
        let template = "#if $lighting$\n#endif\nfloat fog = $fog$;";
        let err = preprocess(template, Lighting::Disabled).unwrap_err();
        assert!(err.to_string().contains("$fog$"), "{}", err);
    }

    #[test]
    fn test_manager_caches_variants() {
        let mut manager = ShaderManager::new();
        assert_eq!(manager.loaded_variants(), 0);

        let lit = manager.fragment_source(Lighting::Enabled).unwrap().to_owned();
        manager.fragment_source(Lighting::Enabled).unwrap();
        assert_eq!(manager.loaded_variants(), 1);

        let unlit = manager.fragment_source(Lighting::Disabled).unwrap().to_owned();
        assert_eq!(manager.loaded_variants(), 2);
        assert_ne!(lit, unlit);

        manager.unload_all();
        assert_eq!(manager.loaded_variants(), 0);
    }

    #[test]
    fn test_bad_template_surfaces_from_manager() {
        let mut manager = ShaderManager::with_fragment_template("void main() {}");
        assert!(manager.fragment_source(Lighting::Disabled).is_err());
        assert_eq!(manager.loaded_variants(), 0);
    }

    #[test]
    fn test_vertex_source_forwards_vertex_id() {
        let manager = ShaderManager::new();
        assert!(manager.vertex_source().contains("flat out int vertex_id"));
    }

    #[cfg(feature = "spirv")]
    #[test]
    fn test_both_variants_compile() {
        let mut manager = ShaderManager::new();
        for lighting in [Lighting::Enabled, Lighting::Disabled] {
            let spirv = manager.load_fragment_spirv(lighting).unwrap();
            // SPIR-V magic number, little endian
            assert_eq!(&spirv[..4], &[0x03, 0x02, 0x23, 0x07]);
        }
        assert!(!manager.load_vertex_spirv().unwrap().is_empty());
    }
}
