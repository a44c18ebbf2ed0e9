//! Frame-loop plumbing: bounded remesh batching and the renderer-side mesh
//! handle table.
#![forbid(unsafe_code)]

use std::collections::VecDeque;

use skiff_mesh_cpu::{ChunkMesh, mesh_chunk};
use skiff_voxel::Palette;
use skiff_world::{ChunkCoord, World};

/// Chunks remeshed per update tick unless configured otherwise.
pub const DEFAULT_REMESH_BUDGET: usize = 4;

/// Amortises remeshing after large edits: drains the world's change queue
/// and remeshes at most `budget` chunks per `update`, leaving the rest
/// queued for following ticks.
pub struct RemeshScheduler {
    budget: usize,
    queue: VecDeque<ChunkCoord>,
    queued: hashbrown::HashSet<ChunkCoord>,
}

impl Default for RemeshScheduler {
    fn default() -> Self {
        Self::with_budget(DEFAULT_REMESH_BUDGET)
    }
}

impl RemeshScheduler {
    pub fn with_budget(budget: usize) -> Self {
        Self {
            budget: budget.max(1),
            queue: VecDeque::new(),
            queued: hashbrown::HashSet::new(),
        }
    }

    #[inline]
    pub fn budget(&self) -> usize {
        self.budget
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn enqueue(&mut self, coord: ChunkCoord) {
        if self.queued.insert(coord) {
            self.queue.push_back(coord);
        }
    }

    /// Pull pending changes from the world and remesh up to `budget` chunks.
    /// An entry with `None` means the chunk is now empty or absent: the
    /// renderer drops its mesh.
    pub fn update(
        &mut self,
        world: &mut World,
        palette: &Palette,
    ) -> Vec<(ChunkCoord, Option<ChunkMesh>)> {
        for coord in world.drain_changes() {
            self.enqueue(coord);
        }
        let mut out = Vec::new();
        for _ in 0..self.budget {
            let Some(coord) = self.queue.pop_front() else {
                break;
            };
            self.queued.remove(&coord);
            out.push((coord, mesh_chunk(world, coord, palette)));
            world.clear_dirty(coord);
        }
        out
    }
}

/// Opaque renderer handle for an uploaded chunk mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Side table from chunk coordinate to renderer mesh handle. Keeps chunks
/// pure data: the renderer owns mesh lifetimes, the world never points at
/// meshes.
#[derive(Default)]
pub struct MeshTable {
    inner: hashbrown::HashMap<ChunkCoord, MeshHandle>,
}

impl MeshTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous handle, which the renderer should dispose.
    pub fn insert(&mut self, coord: ChunkCoord, handle: MeshHandle) -> Option<MeshHandle> {
        self.inner.insert(coord, handle)
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<MeshHandle> {
        self.inner.remove(&coord)
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<MeshHandle> {
        self.inner.get(&coord).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn handles(&self) -> impl Iterator<Item = (&ChunkCoord, &MeshHandle)> {
        self.inner.iter()
    }
}
