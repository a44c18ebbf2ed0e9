use serde::{Deserialize, Serialize};

use skiff_voxel::{CHUNK_SIZE, CHUNK_VOLUME, Cell, VoxelCoord, pack_local, voxel_to_chunk};

/// Sparse chunks promote to a flat array once a fifth of the volume is
/// occupied, mirroring the serialisation density split.
const DENSE_PROMOTE: usize = CHUNK_VOLUME / 5;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    #[inline]
    pub fn of_voxel(v: VoxelCoord) -> Self {
        let (cx, cy, cz) = voxel_to_chunk(v);
        Self { cx, cy, cz }
    }

    /// Voxel coordinate of this chunk's minimum corner.
    #[inline]
    pub fn base(self) -> VoxelCoord {
        VoxelCoord::new(
            self.cx * CHUNK_SIZE,
            self.cy * CHUNK_SIZE,
            self.cz * CHUNK_SIZE,
        )
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

#[derive(Clone, Debug)]
enum CellStore {
    Sparse(hashbrown::HashMap<u16, Cell>),
    Dense(Box<[Cell; CHUNK_VOLUME]>),
}

/// A 16x16x16 cube of cells addressed by packed local index. Only non-AIR
/// cells occupy storage; an empty chunk is semantically all-AIR.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub coord: ChunkCoord,
    store: CellStore,
    count: usize,
    pub dirty: bool,
}

impl Chunk {
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            store: CellStore::Sparse(hashbrown::HashMap::new()),
            count: 0,
            dirty: false,
        }
    }

    #[inline]
    pub fn get(&self, lx: usize, ly: usize, lz: usize) -> Cell {
        debug_assert!(lx < 16 && ly < 16 && lz < 16);
        let p = pack_local(lx, ly, lz);
        match &self.store {
            CellStore::Sparse(m) => m.get(&p).copied().unwrap_or(Cell::AIR),
            CellStore::Dense(cells) => cells[p as usize],
        }
    }

    /// Setting AIR removes the entry; anything else inserts or overwrites.
    pub fn set(&mut self, lx: usize, ly: usize, lz: usize, cell: Cell) {
        debug_assert!(lx < 16 && ly < 16 && lz < 16);
        let p = pack_local(lx, ly, lz);
        if cell.is_air() {
            let removed = match &mut self.store {
                CellStore::Sparse(m) => m.remove(&p).is_some(),
                CellStore::Dense(cells) => {
                    let had = !cells[p as usize].is_air();
                    cells[p as usize] = Cell::AIR;
                    had
                }
            };
            if removed {
                self.count -= 1;
            }
            return;
        }
        let inserted = match &mut self.store {
            CellStore::Sparse(m) => m.insert(p, cell).is_none(),
            CellStore::Dense(cells) => {
                let was_air = cells[p as usize].is_air();
                cells[p as usize] = cell;
                was_air
            }
        };
        if inserted {
            self.count += 1;
            if self.count >= DENSE_PROMOTE {
                self.promote();
            }
        }
    }

    fn promote(&mut self) {
        if let CellStore::Sparse(m) = &self.store {
            let mut cells = Box::new([Cell::AIR; CHUNK_VOLUME]);
            for (p, c) in m.iter() {
                cells[*p as usize] = *c;
            }
            self.store = CellStore::Dense(cells);
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn voxel_count(&self) -> usize {
        self.count
    }

    /// Occupied fraction of the chunk volume, used by the serializer's
    /// sparse-vs-RLE split.
    #[inline]
    pub fn density(&self) -> f32 {
        self.count as f32 / CHUNK_VOLUME as f32
    }

    /// Fill a local box, clamped to the chunk bounds. Coordinates may exceed
    /// the chunk on any side; only the intersection is written.
    pub fn fill_box(&mut self, min: (i32, i32, i32), max: (i32, i32, i32), cell: Cell) {
        let x0 = min.0.max(0);
        let y0 = min.1.max(0);
        let z0 = min.2.max(0);
        let x1 = max.0.min(CHUNK_SIZE - 1);
        let y1 = max.1.min(CHUNK_SIZE - 1);
        let z1 = max.2.min(CHUNK_SIZE - 1);
        for z in z0..=z1 {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    self.set(x as usize, y as usize, z as usize, cell);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.store = CellStore::Sparse(hashbrown::HashMap::new());
        self.count = 0;
    }

    /// Iterate non-AIR cells as `(packed_index, cell)`. Order is unspecified.
    pub fn cells(&self) -> CellIter<'_> {
        match &self.store {
            CellStore::Sparse(m) => CellIter::Sparse(m.iter()),
            CellStore::Dense(cells) => CellIter::Dense {
                cells: &**cells,
                next: 0,
            },
        }
    }

    /// Cell-for-cell equality independent of the backing store.
    pub fn same_cells(&self, other: &Chunk) -> bool {
        if self.count != other.count {
            return false;
        }
        self.cells().all(|(p, c)| {
            let (lx, ly, lz) = skiff_voxel::unpack_local(p);
            other.get(lx, ly, lz) == c
        })
    }
}

pub enum CellIter<'a> {
    Sparse(hashbrown::hash_map::Iter<'a, u16, Cell>),
    Dense {
        cells: &'a [Cell; CHUNK_VOLUME],
        next: usize,
    },
}

impl Iterator for CellIter<'_> {
    type Item = (u16, Cell);

    fn next(&mut self) -> Option<(u16, Cell)> {
        match self {
            CellIter::Sparse(it) => it.next().map(|(p, c)| (*p, *c)),
            CellIter::Dense { cells, next } => {
                while *next < CHUNK_VOLUME {
                    let i = *next;
                    *next += 1;
                    if !cells[i].is_air() {
                        return Some((i as u16, cells[i]));
                    }
                }
                None
            }
        }
    }
}
