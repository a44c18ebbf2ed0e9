use serde::{Deserialize, Serialize};

/// Closed set of material identities. The low byte of a [`Cell`] holds one of
/// these; values outside the set decode to `Unknown` rather than failing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VoxelType {
    Air = 0,
    Floor = 1,
    Wall = 2,
    Ceiling = 3,
    Glass = 4,
    MetalGrate = 5,
    DoorFrame = 6,
    DoorPanel = 7,
    LightFixture = 8,
    Screen = 9,
    FanBlade = 10,
    Pipe = 11,
    Vent = 12,
    Unknown = 255,
}

impl VoxelType {
    pub const ALL: [VoxelType; 14] = [
        VoxelType::Air,
        VoxelType::Floor,
        VoxelType::Wall,
        VoxelType::Ceiling,
        VoxelType::Glass,
        VoxelType::MetalGrate,
        VoxelType::DoorFrame,
        VoxelType::DoorPanel,
        VoxelType::LightFixture,
        VoxelType::Screen,
        VoxelType::FanBlade,
        VoxelType::Pipe,
        VoxelType::Vent,
        VoxelType::Unknown,
    ];

    #[inline]
    pub fn from_u8(v: u8) -> VoxelType {
        match v {
            0 => VoxelType::Air,
            1 => VoxelType::Floor,
            2 => VoxelType::Wall,
            3 => VoxelType::Ceiling,
            4 => VoxelType::Glass,
            5 => VoxelType::MetalGrate,
            6 => VoxelType::DoorFrame,
            7 => VoxelType::DoorPanel,
            8 => VoxelType::LightFixture,
            9 => VoxelType::Screen,
            10 => VoxelType::FanBlade,
            11 => VoxelType::Pipe,
            12 => VoxelType::Vent,
            _ => VoxelType::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VoxelType::Air => "air",
            VoxelType::Floor => "floor",
            VoxelType::Wall => "wall",
            VoxelType::Ceiling => "ceiling",
            VoxelType::Glass => "glass",
            VoxelType::MetalGrate => "metal_grate",
            VoxelType::DoorFrame => "door_frame",
            VoxelType::DoorPanel => "door_panel",
            VoxelType::LightFixture => "light_fixture",
            VoxelType::Screen => "screen",
            VoxelType::FanBlade => "fan_blade",
            VoxelType::Pipe => "pipe",
            VoxelType::Vent => "vent",
            VoxelType::Unknown => "unknown",
        }
    }

    pub fn by_name(name: &str) -> Option<VoxelType> {
        VoxelType::ALL.iter().copied().find(|t| t.name() == name)
    }
}

/// Compact voxel value: low 8 bits material type, high 8 bits palette variant.
/// AIR is all-zero and is never stored in a chunk.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Debug, Serialize, Deserialize)]
pub struct Cell(u16);

impl Cell {
    pub const AIR: Cell = Cell(0);

    #[inline]
    pub fn new(ty: VoxelType, variant: u8) -> Cell {
        Cell((ty as u16) | ((variant as u16) << 8))
    }

    #[inline]
    pub const fn from_raw(raw: u16) -> Cell {
        Cell(raw)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn ty(self) -> VoxelType {
        VoxelType::from_u8((self.0 & 0xff) as u8)
    }

    #[inline]
    pub const fn variant(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn is_air(self) -> bool {
        self.0 & 0xff == 0
    }

    /// Solid cells block movement and straight-line collision queries.
    #[inline]
    pub fn is_solid(self) -> bool {
        !matches!(
            self.ty(),
            VoxelType::Air | VoxelType::Glass | VoxelType::MetalGrate
        )
    }

    /// Transparent cells do not occlude neighbour faces during meshing.
    /// Screens and fan blades count: they are drawn by the animated-asset
    /// path, not the chunk mesh.
    #[inline]
    pub fn is_transparent(self) -> bool {
        matches!(
            self.ty(),
            VoxelType::Air
                | VoxelType::Glass
                | VoxelType::MetalGrate
                | VoxelType::Screen
                | VoxelType::FanBlade
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack() {
        let c = Cell::new(VoxelType::Wall, 7);
        assert_eq!(c.ty(), VoxelType::Wall);
        assert_eq!(c.variant(), 7);
        assert_eq!(c.raw(), 0x0702);
        assert_eq!(Cell::from_raw(c.raw()), c);
    }

    #[test]
    fn air_is_zero() {
        assert_eq!(Cell::AIR.raw(), 0);
        assert!(Cell::AIR.is_air());
        assert!(Cell::new(VoxelType::Air, 0).is_air());
        // A variant on AIR still reads as air by type
        assert!(Cell::new(VoxelType::Air, 3).is_air());
        assert!(!Cell::new(VoxelType::Wall, 0).is_air());
    }

    #[test]
    fn solidity() {
        assert!(!Cell::new(VoxelType::Air, 0).is_solid());
        assert!(!Cell::new(VoxelType::Glass, 0).is_solid());
        assert!(!Cell::new(VoxelType::MetalGrate, 0).is_solid());
        assert!(Cell::new(VoxelType::Wall, 0).is_solid());
        assert!(Cell::new(VoxelType::Screen, 0).is_solid());
        assert!(Cell::new(VoxelType::Unknown, 0).is_solid());
    }

    #[test]
    fn transparency() {
        for ty in [
            VoxelType::Air,
            VoxelType::Glass,
            VoxelType::MetalGrate,
            VoxelType::Screen,
            VoxelType::FanBlade,
        ] {
            assert!(Cell::new(ty, 0).is_transparent(), "{:?}", ty);
        }
        for ty in [
            VoxelType::Floor,
            VoxelType::Wall,
            VoxelType::DoorFrame,
            VoxelType::DoorPanel,
            VoxelType::Unknown,
        ] {
            assert!(!Cell::new(ty, 0).is_transparent(), "{:?}", ty);
        }
    }

    #[test]
    fn unknown_type_roundtrip() {
        let c = Cell::from_raw(0x01fe);
        assert_eq!(c.ty(), VoxelType::Unknown);
        assert_eq!(c.variant(), 1);
    }
}
