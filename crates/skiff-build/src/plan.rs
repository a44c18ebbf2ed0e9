use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use skiff_layout::EntityOverride;
use skiff_voxel::VoxelCoord;

/// Authoring-side description of a ship deck. Yaw values arrive as raw
/// degrees and are validated during the build, so one bad rotation skips one
/// item instead of failing the parse.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipPlan {
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<RoomPlan>,
    #[serde(default)]
    pub doors: Vec<DoorPlan>,
    #[serde(default)]
    pub entities: Vec<EntityPlan>,
    #[serde(default)]
    pub assets: Vec<AssetPlan>,
}

impl ShipPlan {
    pub fn from_json_str(s: &str) -> Result<ShipPlan, Box<dyn Error>> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<ShipPlan, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }
}

/// A room's `position` is its *centre*; `size` is the interior extent in
/// voxels on each axis.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPlan {
    pub id: String,
    pub name: String,
    pub position: VoxelCoord,
    pub size: VoxelCoord,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorPlan {
    pub id: String,
    pub position: VoxelCoord,
    pub yaw: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityPlan {
    pub id: String,
    /// Kind tag: terminal, switch, sensor, light; anything else records as a
    /// free-form entity.
    pub kind: String,
    pub position: VoxelCoord,
    pub yaw: i32,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPlan {
    /// Instance id; generated from the asset's position in the list when
    /// omitted.
    #[serde(default)]
    pub id: Option<String>,
    pub asset_id: String,
    pub position: VoxelCoord,
    pub yaw: i32,
    #[serde(default)]
    pub height_offset: i32,
    #[serde(default)]
    pub overrides: BTreeMap<String, EntityOverride>,
}
