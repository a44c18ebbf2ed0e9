use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use skiff_voxel::VoxelCoord;
use skiff_world::World;

use crate::chunk_codec::{ChunkData, decode_chunk, encode_chunk};
use crate::error::LayoutError;
use crate::model::{Entity, PrefabInstance, RoomVolume};

pub const LAYOUT_VERSION: u32 = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBounds {
    pub min: VoxelCoord,
    pub max: VoxelCoord,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMetadata {
    /// ISO-8601 timestamps supplied by the host; the library itself never
    /// reads a clock.
    pub created_at: String,
    pub modified_at: String,
}

/// The versioned world document. Chunks are non-empty and sorted by
/// coordinate; rooms and entities key by id.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub version: u32,
    pub name: String,
    pub bounds: LayoutBounds,
    pub chunks: Vec<ChunkData>,
    #[serde(default)]
    pub rooms: BTreeMap<String, RoomVolume>,
    #[serde(default)]
    pub entities: BTreeMap<String, Entity>,
    #[serde(default)]
    pub prefab_instances: Vec<PrefabInstance>,
    #[serde(default)]
    pub metadata: LayoutMetadata,
}

impl Layout {
    pub fn to_json_string(&self) -> Result<String, LayoutError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Version mismatch is fatal to the load; per-chunk problems are not
    /// checked here but in [`apply_layout`].
    pub fn from_json_str(s: &str) -> Result<Layout, LayoutError> {
        let layout: Layout = serde_json::from_str(s)?;
        if layout.version != LAYOUT_VERSION {
            return Err(LayoutError::InvalidLayoutVersion {
                found: layout.version,
            });
        }
        Ok(layout)
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), LayoutError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Layout, LayoutError> {
        let s = fs::read_to_string(path)?;
        Layout::from_json_str(&s)
    }
}

/// Snapshot a world (plus its logical containers) into a layout. The density
/// rule picks sparse or RLE per chunk; empty chunks are omitted.
pub fn save_world(
    world: &World,
    name: impl Into<String>,
    rooms: BTreeMap<String, RoomVolume>,
    entities: BTreeMap<String, Entity>,
    prefab_instances: Vec<PrefabInstance>,
    metadata: LayoutMetadata,
) -> Layout {
    let mut coords: Vec<_> = world
        .chunks()
        .filter(|(_, c)| !c.is_empty())
        .map(|(cc, _)| *cc)
        .collect();
    coords.sort();
    let chunks: Vec<ChunkData> = coords
        .iter()
        .filter_map(|cc| world.get_chunk(*cc))
        .map(encode_chunk)
        .collect();
    let bounds = match world.bounds() {
        Some((min, max)) => LayoutBounds { min, max },
        None => LayoutBounds::default(),
    };
    Layout {
        version: LAYOUT_VERSION,
        name: name.into(),
        bounds,
        chunks,
        rooms,
        entities,
        prefab_instances,
        metadata,
    }
}

/// Outcome of populating a world from a layout. A single bad chunk degrades
/// the load but never aborts it.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub chunks_loaded: usize,
    pub chunks_failed: usize,
    pub errors: Vec<LayoutError>,
}

impl LoadReport {
    #[inline]
    pub fn degraded(&self) -> bool {
        self.chunks_failed > 0
    }
}

/// Decode every chunk into the world under bulk mode. Chunks that fail to
/// decode are logged, counted, and skipped.
pub fn apply_layout(world: &mut World, layout: &Layout) -> LoadReport {
    let mut report = LoadReport::default();
    world.begin_bulk();
    for data in &layout.chunks {
        match decode_chunk(data) {
            Ok(chunk) => {
                let base = chunk.coord.base();
                for (packed, cell) in chunk.cells() {
                    let (lx, ly, lz) = skiff_voxel::unpack_local(packed);
                    world.set_voxel(base.offset(lx as i32, ly as i32, lz as i32), cell);
                }
                report.chunks_loaded += 1;
            }
            Err(e) => {
                log::warn!("skipping chunk ({},{},{}): {}", data.cx, data.cy, data.cz, e);
                report.chunks_failed += 1;
                report.errors.push(e);
            }
        }
    }
    world.end_bulk();
    report
}
