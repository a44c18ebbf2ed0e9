//! The voxel namespace exposed to the scripting runtime: raw-valued get/set
//! plus shape fills and coordinate helpers.
#![forbid(unsafe_code)]

use skiff_geom::Vec3;
use skiff_voxel::{Cell, VoxelCoord, VoxelType, voxel_to_chunk, voxel_to_world, world_to_voxel};
use skiff_world::World;

/// Raw value of an empty cell.
pub const AIR: u16 = 0;
pub use skiff_voxel::{CHUNK_SIZE, VOXEL_SIZE};

/// Script-facing facade over a world. Cells cross this boundary as raw
/// 16-bit values so the scripting runtime stays ignorant of the cell type.
pub struct ScriptWorld<'w> {
    world: &'w mut World,
}

impl<'w> ScriptWorld<'w> {
    pub fn new(world: &'w mut World) -> Self {
        Self { world }
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> u16 {
        self.world.get_voxel(VoxelCoord::new(x, y, z)).raw()
    }

    /// Setting AIR clears the cell.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, raw: u16) {
        self.world
            .set_voxel(VoxelCoord::new(x, y, z), Cell::from_raw(raw));
    }

    /// Solid box fill over the inclusive span between two corners.
    pub fn fill(&mut self, a: (i32, i32, i32), b: (i32, i32, i32), raw: u16) {
        self.world
            .fill_box(a.into(), b.into(), Cell::from_raw(raw));
    }

    /// Hollow box: the six boundary faces of the span only.
    pub fn box_outline(&mut self, a: (i32, i32, i32), b: (i32, i32, i32), raw: u16) {
        let lo = VoxelCoord::from(a).min(b.into());
        let hi = VoxelCoord::from(a).max(b.into());
        let cell = Cell::from_raw(raw);
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    let boundary = x == lo.x
                        || x == hi.x
                        || y == lo.y
                        || y == hi.y
                        || z == lo.z
                        || z == hi.z;
                    if boundary {
                        self.world.set_voxel(VoxelCoord::new(x, y, z), cell);
                    }
                }
            }
        }
    }

    /// Solid sphere by euclidean distance from the centre voxel.
    pub fn sphere(&mut self, cx: i32, cy: i32, cz: i32, radius: i32, raw: u16) {
        if radius < 0 {
            return;
        }
        let cell = Cell::from_raw(raw);
        let r2 = radius * radius;
        for z in -radius..=radius {
            for y in -radius..=radius {
                for x in -radius..=radius {
                    if x * x + y * y + z * z <= r2 {
                        self.world
                            .set_voxel(VoxelCoord::new(cx + x, cy + y, cz + z), cell);
                    }
                }
            }
        }
    }

    /// Scan the inclusive box and substitute every cell whose *type* matches
    /// `from_ty` with the replacement value. Returns the number of
    /// substitutions.
    pub fn replace(
        &mut self,
        a: (i32, i32, i32),
        b: (i32, i32, i32),
        from_ty: u8,
        raw: u16,
    ) -> usize {
        let lo = VoxelCoord::from(a).min(b.into());
        let hi = VoxelCoord::from(a).max(b.into());
        let from = VoxelType::from_u8(from_ty);
        let cell = Cell::from_raw(raw);
        let mut count = 0usize;
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    let pos = VoxelCoord::new(x, y, z);
                    if self.world.get_voxel(pos).ty() == from
                        && self.world.get_voxel(pos) != cell
                    {
                        self.world.set_voxel(pos, cell);
                        count += 1;
                    }
                }
            }
        }
        count
    }

    #[inline]
    pub fn make(&self, ty: u8, variant: u8) -> u16 {
        Cell::new(VoxelType::from_u8(ty), variant).raw()
    }

    #[inline]
    pub fn cell_type(&self, raw: u16) -> u8 {
        (raw & 0xff) as u8
    }

    #[inline]
    pub fn cell_variant(&self, raw: u16) -> u8 {
        (raw >> 8) as u8
    }

    #[inline]
    pub fn world_to_voxel(&self, x: f32, y: f32, z: f32) -> (i32, i32, i32) {
        world_to_voxel(Vec3::new(x, y, z)).into()
    }

    #[inline]
    pub fn voxel_to_world(&self, x: i32, y: i32, z: i32) -> (f32, f32, f32) {
        let w = voxel_to_world(VoxelCoord::new(x, y, z));
        (w.x, w.y, w.z)
    }

    #[inline]
    pub fn voxel_to_chunk(&self, x: i32, y: i32, z: i32) -> (i32, i32, i32) {
        voxel_to_chunk(VoxelCoord::new(x, y, z))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }
}
