use hashbrown::{HashMap, HashSet};

use skiff_voxel::{CHUNK_SIZE, Cell, VoxelCoord, voxel_to_local};

use crate::chunk::{Chunk, ChunkCoord};

/// Owner of all chunks. Single-threaded; callers that want off-thread meshing
/// snapshot chunks via `Chunk::clone`.
///
/// Change notification is a drained queue of chunk coordinates rather than
/// listener callbacks: every mutation outside bulk mode enqueues the owning
/// chunk (first) and any face neighbours touched by an edge write.
#[derive(Default)]
pub struct World {
    chunks: HashMap<ChunkCoord, Chunk>,
    changes: Vec<ChunkCoord>,
    queued: HashSet<ChunkCoord>,
    bulk: bool,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// AIR when the owning chunk is absent; reads never fail.
    #[inline]
    pub fn get_voxel(&self, v: VoxelCoord) -> Cell {
        let cc = ChunkCoord::of_voxel(v);
        match self.chunks.get(&cc) {
            Some(chunk) => {
                let (lx, ly, lz) = voxel_to_local(v);
                chunk.get(lx, ly, lz)
            }
            None => Cell::AIR,
        }
    }

    /// Writes never fail: the owning chunk is created on demand. Overwriting
    /// a cell with its current value (AIR included) is a no-op and emits no
    /// event. An edge write marks existing face neighbours dirty so their
    /// meshes stay seamless.
    pub fn set_voxel(&mut self, v: VoxelCoord, cell: Cell) {
        let cc = ChunkCoord::of_voxel(v);
        let (lx, ly, lz) = voxel_to_local(v);
        if cell.is_air() && !self.chunks.contains_key(&cc) {
            return;
        }
        {
            let chunk = self.chunks.entry(cc).or_insert_with(|| Chunk::new(cc));
            let before = chunk.get(lx, ly, lz);
            // A variant byte on an AIR type is still AIR
            if before == cell || (before.is_air() && cell.is_air()) {
                return;
            }
            chunk.set(lx, ly, lz, cell);
            chunk.dirty = true;
        }
        if !self.bulk {
            self.enqueue(cc);
        }
        let locals = [lx as i32, ly as i32, lz as i32];
        for axis in 0..3 {
            let d = if locals[axis] == 0 {
                -1
            } else if locals[axis] == CHUNK_SIZE - 1 {
                1
            } else {
                continue;
            };
            let mut n = cc;
            match axis {
                0 => n.cx += d,
                1 => n.cy += d,
                _ => n.cz += d,
            }
            if let Some(neighbor) = self.chunks.get_mut(&n) {
                neighbor.dirty = true;
                if !self.bulk {
                    self.enqueue(n);
                }
            }
        }
    }

    /// Naive per-voxel fill over the inclusive box `[min, max]` (corners may
    /// be given in any order).
    pub fn fill_box(&mut self, a: VoxelCoord, b: VoxelCoord, cell: Cell) {
        let lo = a.min(b);
        let hi = a.max(b);
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    self.set_voxel(VoxelCoord::new(x, y, z), cell);
                }
            }
        }
    }

    /// Suppress per-voxel change events until `end_bulk`. The only mechanism
    /// for avoiding O(voxels) notification cost during map construction.
    pub fn begin_bulk(&mut self) {
        self.bulk = true;
    }

    /// Marks every non-empty chunk dirty and emits one event per such chunk.
    /// Order across chunks is unspecified.
    pub fn end_bulk(&mut self) {
        self.bulk = false;
        let coords: Vec<ChunkCoord> = self
            .chunks
            .iter()
            .filter(|(_, c)| !c.is_empty())
            .map(|(cc, _)| *cc)
            .collect();
        for cc in coords {
            if let Some(chunk) = self.chunks.get_mut(&cc) {
                chunk.dirty = true;
            }
            self.enqueue(cc);
        }
    }

    #[inline]
    pub fn in_bulk(&self) -> bool {
        self.bulk
    }

    /// Take all pending change events, oldest first. Each chunk appears at
    /// most once per drain window.
    pub fn drain_changes(&mut self) -> Vec<ChunkCoord> {
        self.queued.clear();
        std::mem::take(&mut self.changes)
    }

    fn enqueue(&mut self, cc: ChunkCoord) {
        if self.queued.insert(cc) {
            self.changes.push(cc);
        }
    }

    /// Removes empty chunks and returns how many were dropped.
    pub fn prune_empty_chunks(&mut self) -> usize {
        let before = self.chunks.len();
        self.chunks.retain(|_, c| !c.is_empty());
        before - self.chunks.len()
    }

    /// Union AABB in voxel coordinates across non-empty chunks, inclusive on
    /// both ends. `None` when the world holds no cells.
    pub fn bounds(&self) -> Option<(VoxelCoord, VoxelCoord)> {
        let mut out: Option<(VoxelCoord, VoxelCoord)> = None;
        for (cc, chunk) in &self.chunks {
            if chunk.is_empty() {
                continue;
            }
            let lo = cc.base();
            let hi = lo.offset(CHUNK_SIZE - 1, CHUNK_SIZE - 1, CHUNK_SIZE - 1);
            out = Some(match out {
                Some((omin, omax)) => (omin.min(lo), omax.max(hi)),
                None => (lo, hi),
            });
        }
        out
    }

    /// The mesher's cross-chunk peek: local coordinates inside the chunk read
    /// locally; anything else translates to world coordinates.
    #[inline]
    pub fn get_voxel_for_meshing(&self, chunk: &Chunk, lx: i32, ly: i32, lz: i32) -> Cell {
        let in_bounds = |l: i32| (0..CHUNK_SIZE).contains(&l);
        if in_bounds(lx) && in_bounds(ly) && in_bounds(lz) {
            chunk.get(lx as usize, ly as usize, lz as usize)
        } else {
            self.get_voxel(chunk.coord.base().offset(lx, ly, lz))
        }
    }

    #[inline]
    pub fn get_chunk(&self, cc: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&cc)
    }

    pub fn clear_dirty(&mut self, cc: ChunkCoord) {
        if let Some(chunk) = self.chunks.get_mut(&cc) {
            chunk.dirty = false;
        }
    }

    pub fn dirty_chunks(&self) -> Vec<ChunkCoord> {
        self.chunks
            .iter()
            .filter(|(_, c)| c.dirty)
            .map(|(cc, _)| *cc)
            .collect()
    }

    pub fn chunks(&self) -> impl Iterator<Item = (&ChunkCoord, &Chunk)> {
        self.chunks.iter()
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn total_voxels(&self) -> usize {
        self.chunks.values().map(|c| c.voxel_count()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.values().all(|c| c.is_empty())
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.changes.clear();
        self.queued.clear();
    }
}
