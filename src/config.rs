use anyhow::{bail, Context, Result};
use nalgebra::Vector3;
use std::{env, path::PathBuf};

use crate::engine::fragment::Lighting;
use crate::engine::light::{default_ambient, PointLight};

/// Lighting is compiled in unless configured otherwise.
pub const USE_LIGHTING: bool = true;

pub const DEFAULT_ATLAS_PATH: &str = "terrain_atlas.png";
pub const DEFAULT_TILE_SIZE: u32 = 8;

/// Configuration for one draw of the terrain fragment stage.
#[derive(Debug, Clone)]
pub struct ShadingConfig {
    /// Which shader variant to build.
    pub lighting: Lighting,
    pub light: PointLight,
    pub ambient_light: Vector3<f32>,
    /// Where the face atlas is written.
    pub atlas_path: PathBuf,
    /// Edge length of one face tile in the atlas, in pixels.
    pub tile_size: u32,
    /// Optional fragment template overriding the built-in one.
    pub fragment_template: Option<PathBuf>,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            lighting: Lighting::from(USE_LIGHTING),
            light: PointLight::default(),
            ambient_light: default_ambient(),
            atlas_path: PathBuf::from(DEFAULT_ATLAS_PATH),
            tile_size: DEFAULT_TILE_SIZE,
            fragment_template: None,
        }
    }
}

impl ShadingConfig {
    /// Builds a configuration from `TERRAIN_*` environment variables, falling
    /// back to the defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ShadingConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("TERRAIN_LIGHTING") {
            config.lighting = parse_lighting(&value)?;
        }
        if let Some(value) = lookup("TERRAIN_ATLAS") {
            config.atlas_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("TERRAIN_TILE") {
            let tile_size: u32 = value.trim().parse().with_context(|| {
                format!("TERRAIN_TILE must be a positive integer, got {:?}", value)
            })?;
            if tile_size == 0 {
                bail!("TERRAIN_TILE must be a positive integer, got 0");
            }
            config.tile_size = tile_size;
        }
        config.fragment_template = lookup("TERRAIN_FRAGMENT_TEMPLATE").map(PathBuf::from);

        Ok(config)
    }
}

fn parse_lighting(value: &str) -> Result<Lighting> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Ok(Lighting::Enabled),
        "0" | "off" | "false" | "no" => Ok(Lighting::Disabled),
        other => bail!("TERRAIN_LIGHTING must be on or off, got {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ShadingConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.lighting, Lighting::Enabled);
        assert_eq!(config.atlas_path, PathBuf::from(DEFAULT_ATLAS_PATH));
        assert_eq!(config.tile_size, DEFAULT_TILE_SIZE);
        assert!(config.fragment_template.is_none());
    }

    #[test]
    fn test_lighting_flag_spellings() {
        for value in ["off", "0", "FALSE", " no "] {
            let config =
                ShadingConfig::from_lookup(lookup(&[("TERRAIN_LIGHTING", value)])).unwrap();
            assert_eq!(config.lighting, Lighting::Disabled, "{:?}", value);
        }
        for value in ["on", "1", "True"] {
            let config =
                ShadingConfig::from_lookup(lookup(&[("TERRAIN_LIGHTING", value)])).unwrap();
            assert_eq!(config.lighting, Lighting::Enabled, "{:?}", value);
        }
        assert!(ShadingConfig::from_lookup(lookup(&[("TERRAIN_LIGHTING", "dim")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = ShadingConfig::from_lookup(lookup(&[
            ("TERRAIN_ATLAS", "out/faces.png"),
            ("TERRAIN_TILE", "4"),
            ("TERRAIN_FRAGMENT_TEMPLATE", "terrain.frag"),
        ]))
        .unwrap();
        assert_eq!(config.atlas_path, PathBuf::from("out/faces.png"));
        assert_eq!(config.tile_size, 4);
        assert_eq!(config.fragment_template, Some(PathBuf::from("terrain.frag")));
    }

    #[test]
    fn test_bad_tile_size() {
        assert!(ShadingConfig::from_lookup(lookup(&[("TERRAIN_TILE", "0")])).is_err());
        assert!(ShadingConfig::from_lookup(lookup(&[("TERRAIN_TILE", "big")])).is_err());
    }
}
