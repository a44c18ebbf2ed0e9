//! Cell encoding, coordinate math, and the colour palette.
#![forbid(unsafe_code)]

pub mod cell;
pub mod coord;
pub mod face;
pub mod palette;
pub mod rotate;

pub use cell::{Cell, VoxelType};
pub use coord::{
    CHUNK_SIZE, CHUNK_VOLUME, VOXEL_SIZE, VoxelCoord, pack_local, unpack_local, voxel_center,
    voxel_to_chunk, voxel_to_local, voxel_to_world, world_to_voxel,
};
pub use face::Face;
pub use palette::{Palette, PaletteConfig};
pub use rotate::{Axis, FacingDir, RotationError, Yaw, rotate_face_y, rotate_y};
