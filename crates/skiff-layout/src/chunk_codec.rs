//! Per-chunk on-disk encodings: sparse index/value pairs for thin chunks,
//! run-length over the type byte for dense ones.

use serde::{Deserialize, Serialize};

use skiff_voxel::{CHUNK_SIZE, CHUNK_VOLUME, Cell, VoxelType, unpack_local};
use skiff_world::{Chunk, ChunkCoord};

use crate::error::LayoutError;

/// Chunks below this occupancy serialise sparse; at or above it, RLE.
/// The loader accepts either format for any chunk.
pub const SPARSE_DENSITY_MAX: f32 = 0.2;

/// One serialised chunk. Values are wide integers so a malformed document
/// (negative indices, oversized types) fails per chunk in [`decode_chunk`]
/// instead of aborting the whole JSON parse.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkData {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
    pub format: String,
    /// `[[packedIndex, cellValue], ...]` in the sparse format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voxels: Option<Vec<(i64, i64)>>,
    /// `[type, count, type, count, ...]` over the full 4096-cell scan in the
    /// RLE format. AIR runs are encoded like any other.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rle: Option<Vec<i64>>,
}

impl ChunkData {
    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        ChunkCoord::new(self.cx, self.cy, self.cz)
    }
}

/// Scan order for the RLE arm: x fastest, then z, then y.
#[inline]
fn scan_coords(n: usize) -> (usize, usize, usize) {
    let s = CHUNK_SIZE as usize;
    (n % s, n / (s * s), (n / s) % s)
}

pub fn encode_chunk(chunk: &Chunk) -> ChunkData {
    let coord = chunk.coord;
    if chunk.density() < SPARSE_DENSITY_MAX {
        let mut pairs: Vec<(i64, i64)> = chunk
            .cells()
            .map(|(p, c)| (p as i64, c.raw() as i64))
            .collect();
        pairs.sort_unstable();
        ChunkData {
            cx: coord.cx,
            cy: coord.cy,
            cz: coord.cz,
            format: "sparse".to_string(),
            voxels: Some(pairs),
            rle: None,
        }
    } else {
        let mut rle: Vec<i64> = Vec::new();
        let mut run_ty: i64 = -1;
        let mut run_len: i64 = 0;
        for n in 0..CHUNK_VOLUME {
            let (x, y, z) = scan_coords(n);
            let ty = chunk.get(x, y, z).ty() as i64;
            if ty == run_ty {
                run_len += 1;
            } else {
                if run_len > 0 {
                    rle.push(run_ty);
                    rle.push(run_len);
                }
                run_ty = ty;
                run_len = 1;
            }
        }
        if run_len > 0 {
            rle.push(run_ty);
            rle.push(run_len);
        }
        ChunkData {
            cx: coord.cx,
            cy: coord.cy,
            cz: coord.cz,
            format: "rle".to_string(),
            voxels: None,
            rle: Some(rle),
        }
    }
}

fn malformed(data: &ChunkData, reason: impl Into<String>) -> LayoutError {
    LayoutError::MalformedChunkData {
        cx: data.cx,
        cy: data.cy,
        cz: data.cz,
        reason: reason.into(),
    }
}

pub fn decode_chunk(data: &ChunkData) -> Result<Chunk, LayoutError> {
    let mut chunk = Chunk::new(data.coord());
    match data.format.as_str() {
        "sparse" => {
            let pairs = data
                .voxels
                .as_ref()
                .ok_or_else(|| malformed(data, "sparse chunk without voxels"))?;
            for (idx, raw) in pairs {
                if *idx < 0 || *idx >= CHUNK_VOLUME as i64 {
                    return Err(malformed(data, format!("voxel index {} out of range", idx)));
                }
                if *raw < 0 || *raw > u16::MAX as i64 {
                    return Err(malformed(data, format!("cell value {} out of range", raw)));
                }
                let cell = Cell::from_raw(*raw as u16);
                if cell.is_air() {
                    continue;
                }
                let (lx, ly, lz) = unpack_local(*idx as u16);
                chunk.set(lx, ly, lz, cell);
            }
            Ok(chunk)
        }
        "rle" => {
            let rle = data
                .rle
                .as_ref()
                .ok_or_else(|| malformed(data, "rle chunk without runs"))?;
            if rle.len() % 2 != 0 {
                return Err(malformed(data, "odd rle length"));
            }
            let mut n: usize = 0;
            for pair in rle.chunks_exact(2) {
                let (ty, count) = (pair[0], pair[1]);
                if !(0..=u8::MAX as i64).contains(&ty) {
                    return Err(malformed(data, format!("rle type {} out of range", ty)));
                }
                if count < 0 || n as i64 + count > CHUNK_VOLUME as i64 {
                    return Err(malformed(data, "rle runs exceed chunk volume"));
                }
                let ty = VoxelType::from_u8(ty as u8);
                for _ in 0..count {
                    if ty != VoxelType::Air {
                        let (x, y, z) = scan_coords(n);
                        chunk.set(x, y, z, Cell::new(ty, 0));
                    }
                    n += 1;
                }
            }
            if n != CHUNK_VOLUME {
                return Err(malformed(
                    data,
                    format!("rle runs cover {} cells (expected {})", n, CHUNK_VOLUME),
                ));
            }
            Ok(chunk)
        }
        other => Err(malformed(data, format!("unknown format {:?}", other))),
    }
}
