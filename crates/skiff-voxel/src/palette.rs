use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::cell::VoxelType;

/// Per-type RGB used by the mesher for vertex colours. Cosmetic only; never
/// affects geometry.
#[derive(Clone, Debug)]
pub struct Palette {
    colors: [[f32; 3]; 14],
}

impl Default for Palette {
    fn default() -> Self {
        let mut colors = [[0.0; 3]; 14];
        for (i, ty) in VoxelType::ALL.iter().enumerate() {
            colors[i] = default_color(*ty);
        }
        Palette { colors }
    }
}

fn default_color(ty: VoxelType) -> [f32; 3] {
    match ty {
        VoxelType::Air => [0.0, 0.0, 0.0],
        VoxelType::Floor => [0.34, 0.36, 0.40],
        VoxelType::Wall => [0.55, 0.57, 0.61],
        VoxelType::Ceiling => [0.45, 0.46, 0.50],
        VoxelType::Glass => [0.62, 0.76, 0.86],
        VoxelType::MetalGrate => [0.29, 0.31, 0.33],
        VoxelType::DoorFrame => [0.20, 0.22, 0.26],
        VoxelType::DoorPanel => [0.38, 0.42, 0.52],
        VoxelType::LightFixture => [0.95, 0.94, 0.84],
        VoxelType::Screen => [0.10, 0.58, 0.78],
        VoxelType::FanBlade => [0.24, 0.25, 0.28],
        VoxelType::Pipe => [0.56, 0.41, 0.25],
        VoxelType::Vent => [0.41, 0.43, 0.46],
        // Loud fallback so stray values are visible in-world
        VoxelType::Unknown => [1.0, 0.0, 1.0],
    }
}

fn slot(ty: VoxelType) -> usize {
    VoxelType::ALL
        .iter()
        .position(|t| *t == ty)
        .unwrap_or(VoxelType::ALL.len() - 1)
}

impl Palette {
    #[inline]
    pub fn color(&self, ty: VoxelType) -> [f32; 3] {
        self.colors[slot(ty)]
    }

    pub fn set_color(&mut self, ty: VoxelType, rgb: [f32; 3]) {
        self.colors[slot(ty)] = rgb;
    }

    /// Merge configured overrides over the built-in defaults. Unrecognised
    /// type names are logged and skipped.
    pub fn apply_config(&mut self, cfg: &PaletteConfig) {
        let mut entries: Vec<(&String, &[f32; 3])> = cfg.colors.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (name, rgb) in entries {
            match VoxelType::by_name(name) {
                Some(ty) => self.set_color(ty, *rgb),
                None => log::warn!("palette config: unknown voxel type {:?}", name),
            }
        }
    }

    pub fn from_config(cfg: &PaletteConfig) -> Palette {
        let mut p = Palette::default();
        p.apply_config(cfg);
        p
    }
}

// --- Config ---

#[derive(Deserialize, Default, Debug)]
pub struct PaletteConfig {
    #[serde(default)]
    pub colors: HashMap<String, [f32; 3]>,
}

impl PaletteConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: PaletteConfig = toml::from_str(toml_str)?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}
