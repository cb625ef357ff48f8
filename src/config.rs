use std::{path::PathBuf, str::FromStr};

use glam::Vec3;

use crate::camera::CameraSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub width: u32,
    pub height: u32,
    pub reflect_depth: i32,
    pub background: Vec3,
    pub ambient_color: Vec3,
    pub shadow_ambient: Vec3,
    pub camera: CameraSettings,
    pub texture_dir: PathBuf,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            reflect_depth: 5,
            background: Vec3::ZERO,
            ambient_color: Vec3::splat(0.25),
            shadow_ambient: Vec3::splat(0.1),
            camera: CameraSettings::default(),
            texture_dir: PathBuf::from("asset/texture"),
        }
    }
}

impl RendererConfig {
    /// Defaults overridden by `RAYT_WIDTH`, `RAYT_HEIGHT`, `RAYT_REFLECT_DEPTH`
    /// and `RAYT_TEXTURE_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        override_with(&lookup, "RAYT_WIDTH", &mut config.width);
        override_with(&lookup, "RAYT_HEIGHT", &mut config.height);
        override_with(&lookup, "RAYT_REFLECT_DEPTH", &mut config.reflect_depth);
        if let Some(dir) = lookup("RAYT_TEXTURE_DIR") {
            config.texture_dir = PathBuf::from(dir);
        }
        config
    }
}

fn override_with<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, value: &mut T) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(parsed) => *value = parsed,
        Err(_) => tracing::warn!("ignoring {key}={raw:?}: not a valid value"),
    }
}
