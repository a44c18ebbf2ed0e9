//! Voxel traversal: Amanatides-Woo DDA raycasting and integer line walks.
#![forbid(unsafe_code)]

use skiff_geom::Vec3;
use skiff_voxel::{Cell, Face, VOXEL_SIZE, VoxelCoord, world_to_voxel};
use skiff_world::World;

#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    pub voxel: VoxelCoord,
    pub cell: Cell,
    /// Face of the hit voxel the ray entered through.
    pub face: Face,
    /// Parametric distance from the origin, in world units.
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Coordinate of the neighbour outside the hit face, used for placement.
#[inline]
pub fn adjacent_voxel(hit: &RayHit) -> VoxelCoord {
    let (dx, dy, dz) = hit.face.delta();
    hit.voxel.offset(dx, dy, dz)
}

#[inline]
fn sign(v: f32) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

#[inline]
fn delta_or_max(v: f32) -> f32 {
    if v.abs() < 1e-8 {
        f32::MAX
    } else {
        VOXEL_SIZE / v.abs()
    }
}

/// First non-AIR cell along the ray, within `max_dist` world units.
///
/// The solid/pick distinction is the caller's: this stops at *any* non-AIR
/// cell, glass and grates included.
pub fn raycast(world: &World, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<RayHit> {
    raycast_with(origin, dir, max_dist, |v| world.get_voxel(v))
}

/// DDA traversal over a caller-provided sampler, for structure-local grids or
/// edit overlays.
pub fn raycast_with<F>(origin: Vec3, dir: Vec3, max_dist: f32, mut sample: F) -> Option<RayHit>
where
    F: FnMut(VoxelCoord) -> Cell,
{
    let len = dir.length();
    if len < 1e-8 {
        return None;
    }
    let d = dir / len;

    let mut v = world_to_voxel(origin);
    let step = [sign(d.x), sign(d.y), sign(d.z)];
    let tdelta = [delta_or_max(d.x), delta_or_max(d.y), delta_or_max(d.z)];

    let comp = [d.x, d.y, d.z];
    let opos = [origin.x, origin.y, origin.z];
    let vpos = [v.x, v.y, v.z];
    let mut tmax = [f32::MAX; 3];
    for a in 0..3usize {
        if step[a] == 0 {
            continue;
        }
        let frac = opos[a] - vpos[a] as f32 * VOXEL_SIZE;
        tmax[a] = if step[a] > 0 {
            (VOXEL_SIZE - frac) / comp[a].abs()
        } else {
            frac / comp[a].abs()
        };
    }

    // Entry face before the first step: the face whose outward normal most
    // opposes the ray direction.
    let dominant = (0..3usize).max_by(|a, b| comp[*a].abs().total_cmp(&comp[*b].abs()));
    let mut face = match dominant {
        Some(a) => Face::from_axis_dir(a, comp[a] < 0.0),
        None => Face::NegX,
    };

    let mut t = 0.0f32;
    let max_steps = (max_dist / VOXEL_SIZE).ceil() as usize * 3 + 3;
    for _ in 0..max_steps {
        if t > max_dist {
            break;
        }
        let cell = sample(v);
        if !cell.is_air() {
            return Some(RayHit {
                voxel: v,
                cell,
                face,
                distance: t,
                point: origin + d * t,
                normal: face.normal(),
            });
        }
        let axis = if tmax[0] < tmax[1] {
            if tmax[0] < tmax[2] { 0 } else { 2 }
        } else if tmax[1] < tmax[2] {
            1
        } else {
            2
        };
        t = tmax[axis];
        tmax[axis] += tdelta[axis];
        match axis {
            0 => v.x += step[0],
            1 => v.y += step[1],
            _ => v.z += step[2],
        }
        face = Face::from_axis_dir(axis, step[axis] < 0);
    }
    None
}

/// Pure 3D Bresenham: every integer voxel on the segment `[start, end]`,
/// endpoints included. Used by the LINE brush.
pub fn line_voxels(start: VoxelCoord, end: VoxelCoord) -> Vec<VoxelCoord> {
    let dx = (end.x - start.x).abs();
    let dy = (end.y - start.y).abs();
    let dz = (end.z - start.z).abs();
    let sx = if end.x >= start.x { 1 } else { -1 };
    let sy = if end.y >= start.y { 1 } else { -1 };
    let sz = if end.z >= start.z { 1 } else { -1 };

    let mut out = Vec::with_capacity((dx.max(dy).max(dz) + 1) as usize);
    let (mut x, mut y, mut z) = (start.x, start.y, start.z);
    out.push(start);

    if dx >= dy && dx >= dz {
        let mut p1 = 2 * dy - dx;
        let mut p2 = 2 * dz - dx;
        while x != end.x {
            x += sx;
            if p1 >= 0 {
                y += sy;
                p1 -= 2 * dx;
            }
            if p2 >= 0 {
                z += sz;
                p2 -= 2 * dx;
            }
            p1 += 2 * dy;
            p2 += 2 * dz;
            out.push(VoxelCoord::new(x, y, z));
        }
    } else if dy >= dx && dy >= dz {
        let mut p1 = 2 * dx - dy;
        let mut p2 = 2 * dz - dy;
        while y != end.y {
            y += sy;
            if p1 >= 0 {
                x += sx;
                p1 -= 2 * dy;
            }
            if p2 >= 0 {
                z += sz;
                p2 -= 2 * dy;
            }
            p1 += 2 * dx;
            p2 += 2 * dz;
            out.push(VoxelCoord::new(x, y, z));
        }
    } else {
        let mut p1 = 2 * dy - dz;
        let mut p2 = 2 * dx - dz;
        while z != end.z {
            z += sz;
            if p1 >= 0 {
                y += sy;
                p1 -= 2 * dz;
            }
            if p2 >= 0 {
                x += sx;
                p2 -= 2 * dz;
            }
            p1 += 2 * dy;
            p2 += 2 * dx;
            out.push(VoxelCoord::new(x, y, z));
        }
    }
    out
}
