use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use skiff_voxel::{FacingDir, VoxelCoord, Yaw};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Atmosphere {
    pub has_o2: bool,
    /// Fraction of nominal pressure, in `[0, 1]`.
    pub pressure: f32,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            has_o2: true,
            pressure: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubRegion {
    pub min: VoxelCoord,
    pub max: VoxelCoord,
}

/// Logical interior space: an axis-aligned voxel AABB, optionally refined by
/// sub-regions for L-shaped rooms. Immutable once inserted into a layout.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomVolume {
    pub id: String,
    pub name: String,
    pub min: VoxelCoord,
    pub max: VoxelCoord,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_regions: Vec<SubRegion>,
    #[serde(default)]
    pub atmosphere: Atmosphere,
}

impl RoomVolume {
    /// Corners may arrive in any order; they are normalised so min <= max
    /// holds on every axis.
    pub fn new(id: impl Into<String>, name: impl Into<String>, a: VoxelCoord, b: VoxelCoord) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            min: a.min(b),
            max: a.max(b),
            sub_regions: Vec::new(),
            atmosphere: Atmosphere::default(),
        }
    }

    fn inside(min: VoxelCoord, max: VoxelCoord, v: VoxelCoord) -> bool {
        v.x >= min.x
            && v.x <= max.x
            && v.y >= min.y
            && v.y <= max.y
            && v.z >= min.z
            && v.z <= max.z
    }

    /// Inside the outer AABB AND (no sub-regions OR inside any sub-region).
    pub fn contains(&self, v: VoxelCoord) -> bool {
        if !Self::inside(self.min, self.max, v) {
            return false;
        }
        self.sub_regions.is_empty()
            || self
                .sub_regions
                .iter()
                .any(|r| Self::inside(r.min, r.max, v))
    }
}

/// Closed set of entity kinds. Anything else travels through `Other` so
/// foreign layouts keep their data across a round-trip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EntityKind {
    Door {
        /// Ordered pair of room ids the door connects; empty strings when a
        /// side could not be resolved.
        #[serde(rename = "connectsRooms")]
        connects_rooms: [String; 2],
        /// Opening size in voxels.
        width: i32,
        height: i32,
    },
    Terminal,
    Switch,
    Sensor,
    Light,
    Other {
        name: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        properties: BTreeMap<String, String>,
    },
}

/// Non-voxel first-class object anchored to a voxel coordinate. Entities hold
/// only ids, never references, to rooms or other entities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    #[serde(flatten)]
    pub kind: EntityKind,
    pub pos: VoxelCoord,
    pub yaw: Yaw,
    pub facing: FacingDir,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Entity {
    /// Facing is always derived from yaw via the fixed table.
    pub fn new(id: impl Into<String>, kind: EntityKind, pos: VoxelCoord, yaw: Yaw) -> Self {
        Self {
            id: id.into(),
            kind,
            pos,
            yaw,
            facing: FacingDir::from_yaw(yaw),
            status: None,
        }
    }
}

/// Per-instance overrides of an embedded prefab entity, keyed by the
/// embedded entity's id hint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaw: Option<Yaw>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// Placement of a prefab by id. The reference is weak: resolution fails
/// gracefully when the library no longer holds the prefab.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefabInstance {
    pub id: String,
    pub prefab_id: String,
    pub position: VoxelCoord,
    pub yaw: Yaw,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, EntityOverride>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_contains_respects_sub_regions() {
        let mut room = RoomVolume::new(
            "r1",
            "Cargo Bay",
            VoxelCoord::new(0, 0, 0),
            VoxelCoord::new(10, 10, 10),
        );
        assert!(room.contains(VoxelCoord::new(5, 5, 5)));
        assert!(!room.contains(VoxelCoord::new(11, 5, 5)));

        // An L-shape: two sub-boxes inside the outer AABB
        room.sub_regions = vec![
            SubRegion {
                min: VoxelCoord::new(0, 0, 0),
                max: VoxelCoord::new(4, 10, 10),
            },
            SubRegion {
                min: VoxelCoord::new(0, 0, 0),
                max: VoxelCoord::new(10, 10, 4),
            },
        ];
        assert!(room.contains(VoxelCoord::new(2, 5, 9)));
        assert!(room.contains(VoxelCoord::new(9, 5, 2)));
        assert!(!room.contains(VoxelCoord::new(9, 5, 9)));
    }

    #[test]
    fn room_corners_normalise() {
        let room = RoomVolume::new(
            "r",
            "r",
            VoxelCoord::new(5, 9, -2),
            VoxelCoord::new(-1, 3, 7),
        );
        assert_eq!(room.min, VoxelCoord::new(-1, 3, -2));
        assert_eq!(room.max, VoxelCoord::new(5, 9, 7));
    }

    #[test]
    fn door_entity_json_shape() {
        let e = Entity::new(
            "door_1",
            EntityKind::Door {
                connects_rooms: ["room_a".into(), "room_b".into()],
                width: 48,
                height: 88,
            },
            VoxelCoord::new(8, 0, 0),
            Yaw::Deg90,
        );
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "door");
        assert_eq!(json["connectsRooms"][0], "room_a");
        assert_eq!(json["yaw"], 90);
        assert_eq!(json["facing"]["axis"], "x");
        assert_eq!(json["facing"]["dir"], 1);

        let back: Entity = serde_json::from_value(json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn other_kind_round_trips() {
        let mut props = BTreeMap::new();
        props.insert("valve_size".to_string(), "large".to_string());
        let e = Entity::new(
            "v1",
            EntityKind::Other {
                name: "valve".into(),
                properties: props,
            },
            VoxelCoord::new(1, 2, 3),
            Yaw::Deg0,
        );
        let s = serde_json::to_string(&e).unwrap();
        let back: Entity = serde_json::from_str(&s).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn invalid_yaw_fails_to_parse() {
        let s = r#"{"id":"t","kind":"terminal","pos":{"x":0,"y":0,"z":0},
                    "yaw":45,"facing":{"axis":"z","dir":1}}"#;
        assert!(serde_json::from_str::<Entity>(s).is_err());
    }

    #[test]
    fn atmosphere_defaults() {
        let a = Atmosphere::default();
        assert!(a.has_o2);
        assert_eq!(a.pressure, 1.0);
        let json = serde_json::to_value(a).unwrap();
        assert_eq!(json["hasO2"], true);
    }
}
