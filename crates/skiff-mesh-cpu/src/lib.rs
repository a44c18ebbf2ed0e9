//! CPU meshing: per-chunk greedy face merge into indexed triangle buffers.
#![forbid(unsafe_code)]

use skiff_geom::Vec3;
use skiff_voxel::{CHUNK_SIZE, Palette, VOXEL_SIZE, VoxelType};
use skiff_world::{Chunk, ChunkCoord, World};

pub mod cache;

pub use cache::{
    MESH_MAGIC, MESH_VERSION, MeshCacheError, decode_mesh, encode_mesh, read_mesh_file,
    write_mesh_file,
};

const S: usize = CHUNK_SIZE as usize;

/// Flat vertex/index buffers in the renderer's layout: positions, normals and
/// colours three floats per vertex, 32-bit indices.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub col: Vec<f32>,
    pub idx: Vec<u32>,
}

impl MeshBuild {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.idx.len() / 6
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Append a quad given its four corners in outside-CCW order for a
    /// positive face. Winding: `(0,1,2),(0,2,3)` on positive faces,
    /// `(0,2,1),(0,3,2)` on negative, so normals face outward without
    /// back-face culling issues.
    fn push_quad(&mut self, corners: &[[f32; 3]; 4], normal: [f32; 3], color: [f32; 3], positive: bool) {
        let base = (self.pos.len() / 3) as u32;
        for c in corners {
            self.pos.extend_from_slice(c);
            self.norm.extend_from_slice(&normal);
            self.col.extend_from_slice(&color);
        }
        if positive {
            self.idx
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        } else {
            self.idx
                .extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
        }
    }
}

/// A meshed chunk, positioned at the chunk's minimum corner in world space.
#[derive(Clone, Debug)]
pub struct ChunkMesh {
    pub coord: ChunkCoord,
    pub origin: Vec3,
    pub build: MeshBuild,
}

/// Greedy-mesh one chunk. Neighbour occupancy is read through the world so
/// faces on chunk seams are culled exactly like interior faces. Returns
/// `None` for an absent or empty chunk.
///
/// Output is deterministic: identical chunk contents and neighbour reads
/// produce byte-identical buffers (fixed axis, direction, slice and
/// row-major scan order).
pub fn mesh_chunk(world: &World, coord: ChunkCoord, palette: &Palette) -> Option<ChunkMesh> {
    let chunk = world.get_chunk(coord)?;
    if chunk.is_empty() {
        return None;
    }
    let mut build = MeshBuild::default();
    for axis in 0..3usize {
        let u = (axis + 1) % 3;
        let v = (axis + 2) % 3;
        for dir in [-1i32, 1] {
            for s in 0..S as i32 {
                let mut mask: [[Option<VoxelType>; S]; S] = [[None; S]; S];
                build_mask(world, chunk, axis, u, v, dir, s, &mut mask);
                merge_mask(&mut mask, |i, j, w, h, ty| {
                    emit_quad(&mut build, palette, axis, u, v, dir, s, i, j, w, h, ty);
                });
            }
        }
    }
    Some(ChunkMesh {
        coord,
        origin: Vec3::new(
            coord.cx as f32 * CHUNK_SIZE as f32 * VOXEL_SIZE,
            coord.cy as f32 * CHUNK_SIZE as f32 * VOXEL_SIZE,
            coord.cz as f32 * CHUNK_SIZE as f32 * VOXEL_SIZE,
        ),
        build,
    })
}

/// A face is visible iff the owner cell is non-transparent and its outward
/// neighbour (possibly in an adjacent chunk) is transparent.
fn build_mask(
    world: &World,
    chunk: &Chunk,
    axis: usize,
    u: usize,
    v: usize,
    dir: i32,
    s: i32,
    mask: &mut [[Option<VoxelType>; S]; S],
) {
    for j in 0..S as i32 {
        for i in 0..S as i32 {
            let mut p = [0i32; 3];
            p[axis] = s;
            p[u] = i;
            p[v] = j;
            let c = chunk.get(p[0] as usize, p[1] as usize, p[2] as usize);
            if c.is_transparent() {
                continue;
            }
            let mut q = p;
            q[axis] += dir;
            let n = world.get_voxel_for_meshing(chunk, q[0], q[1], q[2]);
            if n.is_transparent() {
                mask[j as usize][i as usize] = Some(c.ty());
            }
        }
    }
}

/// Row-major greedy merge: extend width while the row continues equal, then
/// height while every covered column continues equal; clear merged cells.
fn merge_mask(
    mask: &mut [[Option<VoxelType>; S]; S],
    mut emit: impl FnMut(usize, usize, usize, usize, VoxelType),
) {
    for j in 0..S {
        let mut i = 0;
        while i < S {
            let Some(ty) = mask[j][i] else {
                i += 1;
                continue;
            };
            let mut w = 1;
            while i + w < S && mask[j][i + w] == Some(ty) {
                w += 1;
            }
            let mut h = 1;
            'grow: while j + h < S {
                for k in i..i + w {
                    if mask[j + h][k] != Some(ty) {
                        break 'grow;
                    }
                }
                h += 1;
            }
            emit(i, j, w, h, ty);
            for row in mask.iter_mut().take(j + h).skip(j) {
                for cell in row.iter_mut().take(i + w).skip(i) {
                    *cell = None;
                }
            }
            i += w;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_quad(
    build: &mut MeshBuild,
    palette: &Palette,
    axis: usize,
    u: usize,
    v: usize,
    dir: i32,
    s: i32,
    i: usize,
    j: usize,
    w: usize,
    h: usize,
    ty: VoxelType,
) {
    // Face plane: at s for the negative direction, s+1 for the positive
    let plane = (s + if dir > 0 { 1 } else { 0 }) as f32;
    let corner = |du: usize, dv: usize| -> [f32; 3] {
        let mut p = [0f32; 3];
        p[axis] = plane;
        p[u] = (i + du) as f32;
        p[v] = (j + dv) as f32;
        [p[0] * VOXEL_SIZE, p[1] * VOXEL_SIZE, p[2] * VOXEL_SIZE]
    };
    let corners = [corner(0, 0), corner(w, 0), corner(w, h), corner(0, h)];
    let mut normal = [0f32; 3];
    normal[axis] = dir as f32;
    build.push_quad(&corners, normal, palette.color(ty), dir > 0);
}
