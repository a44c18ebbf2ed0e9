use serde::{Deserialize, Serialize};
use skiff_geom::Vec3;

/// Edge length of one voxel in world units (2.5 cm).
pub const VOXEL_SIZE: f32 = 0.025;
/// Cells along each chunk edge.
pub const CHUNK_SIZE: i32 = 16;
/// Cells in a full chunk (16^3).
pub const CHUNK_VOLUME: usize = 4096;

/// Integer voxel coordinate. Negative coordinates are legal everywhere.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct VoxelCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelCoord {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    #[inline]
    pub fn min(self, other: VoxelCoord) -> VoxelCoord {
        VoxelCoord::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    #[inline]
    pub fn max(self, other: VoxelCoord) -> VoxelCoord {
        VoxelCoord::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }
}

impl From<(i32, i32, i32)> for VoxelCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<VoxelCoord> for (i32, i32, i32) {
    fn from(value: VoxelCoord) -> Self {
        (value.x, value.y, value.z)
    }
}

#[inline]
pub fn world_to_voxel(w: Vec3) -> VoxelCoord {
    VoxelCoord::new(
        (w.x / VOXEL_SIZE).floor() as i32,
        (w.y / VOXEL_SIZE).floor() as i32,
        (w.z / VOXEL_SIZE).floor() as i32,
    )
}

/// World position of the voxel's minimum corner.
#[inline]
pub fn voxel_to_world(v: VoxelCoord) -> Vec3 {
    Vec3::new(
        v.x as f32 * VOXEL_SIZE,
        v.y as f32 * VOXEL_SIZE,
        v.z as f32 * VOXEL_SIZE,
    )
}

#[inline]
pub fn voxel_center(v: VoxelCoord) -> Vec3 {
    voxel_to_world(v) + Vec3::new(VOXEL_SIZE * 0.5, VOXEL_SIZE * 0.5, VOXEL_SIZE * 0.5)
}

/// Chunk coordinate owning a voxel. Floor division, so negative voxels land
/// in negative chunks.
#[inline]
pub fn voxel_to_chunk(v: VoxelCoord) -> (i32, i32, i32) {
    (
        v.x.div_euclid(CHUNK_SIZE),
        v.y.div_euclid(CHUNK_SIZE),
        v.z.div_euclid(CHUNK_SIZE),
    )
}

/// Local coordinate within the owning chunk, each component in `[0, 16)`.
/// Euclidean modulo keeps this correct for negative voxel coordinates.
#[inline]
pub fn voxel_to_local(v: VoxelCoord) -> (usize, usize, usize) {
    (
        v.x.rem_euclid(CHUNK_SIZE) as usize,
        v.y.rem_euclid(CHUNK_SIZE) as usize,
        v.z.rem_euclid(CHUNK_SIZE) as usize,
    )
}

/// Packed local index: `x + y*16 + z*256`, in `[0, 4096)`.
#[inline]
pub fn pack_local(lx: usize, ly: usize, lz: usize) -> u16 {
    (lx + ly * CHUNK_SIZE as usize + lz * (CHUNK_SIZE * CHUNK_SIZE) as usize) as u16
}

#[inline]
pub fn unpack_local(packed: u16) -> (usize, usize, usize) {
    let p = packed as usize;
    let s = CHUNK_SIZE as usize;
    (p % s, (p / s) % s, p / (s * s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_voxels_map_to_negative_chunks() {
        // floor(-2 / 16) = -1
        assert_eq!(voxel_to_chunk(VoxelCoord::new(3, -2, 7)), (0, -1, 0));
        assert_eq!(voxel_to_chunk(VoxelCoord::new(-1, 0, 0)), (-1, 0, 0));
        assert_eq!(voxel_to_chunk(VoxelCoord::new(-16, 0, 0)), (-1, 0, 0));
        assert_eq!(voxel_to_chunk(VoxelCoord::new(-17, 0, 0)), (-2, 0, 0));
    }

    #[test]
    fn local_coords_use_euclidean_modulo() {
        assert_eq!(voxel_to_local(VoxelCoord::new(3, -2, 7)), (3, 14, 7));
        assert_eq!(voxel_to_local(VoxelCoord::new(-1, -16, -17)), (15, 0, 15));
        assert_eq!(voxel_to_local(VoxelCoord::new(16, 31, 32)), (0, 15, 0));
    }

    #[test]
    fn world_voxel_roundtrip() {
        let v = VoxelCoord::new(5, -3, 12);
        assert_eq!(world_to_voxel(voxel_center(v)), v);
        // Corner is inclusive: the corner of voxel v maps back to v
        assert_eq!(world_to_voxel(voxel_to_world(v)), v);
    }

    #[test]
    fn pack_unpack_roundtrip() {
        for lz in 0..16 {
            for ly in 0..16 {
                for lx in 0..16 {
                    let p = pack_local(lx, ly, lz);
                    assert!((p as usize) < CHUNK_VOLUME);
                    assert_eq!(unpack_local(p), (lx, ly, lz));
                }
            }
        }
        assert_eq!(pack_local(1, 1, 1), 1 + 16 + 256);
    }
}
