use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::VoxelCoord;
use crate::face::Face;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RotationError {
    #[error("invalid yaw {0} (expected 0, 90, 180 or 270)")]
    InvalidRotation(i32),
}

/// Rigid-body rotation about Y, quantised to quarter turns. Serialised as
/// plain integer degrees; anything outside the set is a fatal decode error.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Yaw {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Yaw {
    pub const ALL: [Yaw; 4] = [Yaw::Deg0, Yaw::Deg90, Yaw::Deg180, Yaw::Deg270];

    #[inline]
    pub fn degrees(self) -> i32 {
        match self {
            Yaw::Deg0 => 0,
            Yaw::Deg90 => 90,
            Yaw::Deg180 => 180,
            Yaw::Deg270 => 270,
        }
    }

    pub fn from_degrees(deg: i32) -> Result<Yaw, RotationError> {
        match deg {
            0 => Ok(Yaw::Deg0),
            90 => Ok(Yaw::Deg90),
            180 => Ok(Yaw::Deg180),
            270 => Ok(Yaw::Deg270),
            other => Err(RotationError::InvalidRotation(other)),
        }
    }

    /// `(self + other) mod 360`, used when an instance yaw composes with an
    /// embedded entity yaw.
    #[inline]
    pub fn compose(self, other: Yaw) -> Yaw {
        match Yaw::from_degrees((self.degrees() + other.degrees()) % 360) {
            Ok(y) => y,
            Err(_) => unreachable!(),
        }
    }

    /// The yaw that undoes this one.
    #[inline]
    pub fn inverse(self) -> Yaw {
        match self {
            Yaw::Deg0 => Yaw::Deg0,
            Yaw::Deg90 => Yaw::Deg270,
            Yaw::Deg180 => Yaw::Deg180,
            Yaw::Deg270 => Yaw::Deg90,
        }
    }
}

impl TryFrom<i32> for Yaw {
    type Error = RotationError;
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Yaw::from_degrees(value)
    }
}

impl From<Yaw> for i32 {
    fn from(value: Yaw) -> i32 {
        value.degrees()
    }
}

/// Rotate an integer point about the Y axis:
/// 0°: (x,y,z)  90°: (−z,y,x)  180°: (−x,y,−z)  270°: (z,y,−x).
#[inline]
pub fn rotate_y(p: VoxelCoord, yaw: Yaw) -> VoxelCoord {
    match yaw {
        Yaw::Deg0 => p,
        Yaw::Deg90 => VoxelCoord::new(-p.z, p.y, p.x),
        Yaw::Deg180 => VoxelCoord::new(-p.x, p.y, -p.z),
        Yaw::Deg270 => VoxelCoord::new(p.z, p.y, -p.x),
    }
}

/// Rotate a face direction about the Y axis; the Y faces are fixed points.
#[inline]
pub fn rotate_face_y(face: Face, yaw: Yaw) -> Face {
    let (dx, dy, dz) = face.delta();
    let r = rotate_y(VoxelCoord::new(dx, dy, dz), yaw);
    match (r.x, r.y, r.z) {
        (1, 0, 0) => Face::PosX,
        (-1, 0, 0) => Face::NegX,
        (0, 1, 0) => Face::PosY,
        (0, -1, 0) => Face::NegY,
        (0, 0, 1) => Face::PosZ,
        _ => Face::NegZ,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Axis + sign an entity faces along, derived from its yaw.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacingDir {
    pub axis: Axis,
    pub dir: i8,
}

impl FacingDir {
    /// Fixed table: 0→(z,+1), 90→(x,+1), 180→(z,−1), 270→(x,−1).
    #[inline]
    pub fn from_yaw(yaw: Yaw) -> FacingDir {
        match yaw {
            Yaw::Deg0 => FacingDir {
                axis: Axis::Z,
                dir: 1,
            },
            Yaw::Deg90 => FacingDir {
                axis: Axis::X,
                dir: 1,
            },
            Yaw::Deg180 => FacingDir {
                axis: Axis::Z,
                dir: -1,
            },
            Yaw::Deg270 => FacingDir {
                axis: Axis::X,
                dir: -1,
            },
        }
    }

    #[inline]
    pub fn face(self) -> Face {
        let axis = match self.axis {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        };
        Face::from_axis_dir(axis, self.dir > 0)
    }
}
