//! Layout V2: the on-disk world format, plus the room/entity/instance model
//! shared by the map builder and the prefab resolver.
#![forbid(unsafe_code)]

pub mod chunk_codec;
pub mod error;
pub mod layout;
pub mod model;

pub use chunk_codec::{ChunkData, SPARSE_DENSITY_MAX, decode_chunk, encode_chunk};
pub use error::LayoutError;
pub use layout::{LAYOUT_VERSION, Layout, LayoutBounds, LayoutMetadata, LoadReport, apply_layout, save_world};
pub use model::{
    Atmosphere, Entity, EntityKind, EntityOverride, PrefabInstance, RoomVolume, SubRegion,
};
