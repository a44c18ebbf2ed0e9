//! Binary mesh cache format ("VMSH"), little-endian throughout.
//!
//! ```text
//! offset 0   : 4 bytes magic "VMSH"
//! offset 4   : u32 version = 1
//! offset 8   : u32 vertexCount
//! offset 12  : u32 indexCount
//! then       : f32[vertexCount*3] positions
//!              f32[vertexCount*3] normals
//!              f32[vertexCount*3] colors (0..1)
//!              u32[indexCount]    indices
//! ```

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::MeshBuild;

pub const MESH_MAGIC: [u8; 4] = *b"VMSH";
pub const MESH_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum MeshCacheError {
    #[error("invalid mesh header magic")]
    InvalidMeshHeader,
    #[error("unsupported mesh version {0}")]
    UnsupportedVersion(u32),
    #[error("mesh payload truncated or inconsistent")]
    Truncated,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn encode_mesh(build: &MeshBuild) -> Vec<u8> {
    let vertex_count = build.vertex_count() as u32;
    let index_count = build.idx.len() as u32;
    let mut out = Vec::with_capacity(16 + build.pos.len() * 12 + build.idx.len() * 4);
    out.extend_from_slice(&MESH_MAGIC);
    out.extend_from_slice(&MESH_VERSION.to_le_bytes());
    out.extend_from_slice(&vertex_count.to_le_bytes());
    out.extend_from_slice(&index_count.to_le_bytes());
    for v in &build.pos {
        out.extend_from_slice(&v.to_le_bytes());
    }
    for v in &build.norm {
        out.extend_from_slice(&v.to_le_bytes());
    }
    for v in &build.col {
        out.extend_from_slice(&v.to_le_bytes());
    }
    for v in &build.idx {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

struct Reader<'a> {
    bytes: &'a [u8],
    at: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], MeshCacheError> {
        if self.at + n > self.bytes.len() {
            return Err(MeshCacheError::Truncated);
        }
        let s = &self.bytes[self.at..self.at + n];
        self.at += n;
        Ok(s)
    }

    fn u32(&mut self) -> Result<u32, MeshCacheError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn f32_vec(&mut self, count: usize) -> Result<Vec<f32>, MeshCacheError> {
        let b = self.take(count * 4)?;
        Ok(b.chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }
}

pub fn decode_mesh(bytes: &[u8]) -> Result<MeshBuild, MeshCacheError> {
    let mut r = Reader { bytes, at: 0 };
    if r.take(4)? != MESH_MAGIC {
        return Err(MeshCacheError::InvalidMeshHeader);
    }
    let version = r.u32()?;
    if version != MESH_VERSION {
        return Err(MeshCacheError::UnsupportedVersion(version));
    }
    let vertex_count = r.u32()? as usize;
    let index_count = r.u32()? as usize;
    let pos = r.f32_vec(vertex_count * 3)?;
    let norm = r.f32_vec(vertex_count * 3)?;
    let col = r.f32_vec(vertex_count * 3)?;
    let idx_bytes = r.take(index_count * 4)?;
    let idx: Vec<u32> = idx_bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    if r.at != bytes.len() {
        return Err(MeshCacheError::Truncated);
    }
    if idx.iter().any(|i| *i as usize >= vertex_count) {
        return Err(MeshCacheError::Truncated);
    }
    Ok(MeshBuild {
        pos,
        norm,
        col,
        idx,
    })
}

pub fn write_mesh_file(path: impl AsRef<Path>, build: &MeshBuild) -> Result<(), MeshCacheError> {
    fs::write(path, encode_mesh(build))?;
    Ok(())
}

pub fn read_mesh_file(path: impl AsRef<Path>) -> Result<MeshBuild, MeshCacheError> {
    let bytes = fs::read(path)?;
    decode_mesh(&bytes)
}
