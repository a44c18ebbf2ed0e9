//! Chunked sparse voxel storage and the world that owns it.
#![forbid(unsafe_code)]

pub mod chunk;
pub mod world;

pub use chunk::{Chunk, ChunkCoord};
pub use world::World;
