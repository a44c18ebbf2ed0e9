//! Deterministic map construction: ship plans into voxels, rooms, doorways
//! and placed assets.
#![forbid(unsafe_code)]

pub mod builder;
pub mod plan;

pub use builder::{BuiltMap, MapBuildConfig, MapBuilder};
pub use plan::{AssetPlan, DoorPlan, EntityPlan, RoomPlan, ShipPlan};
