//! Reusable voxel templates, and their expansion into world writes under
//! quantised rotation.
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use skiff_layout::EntityKind;
use skiff_voxel::{Cell, Face, RotationError, VoxelCoord, Yaw};
use thiserror::Error;

pub mod resolver;

pub use resolver::{AnimatedChild, PrefabResolver, Resolved, ResolvedConnector};

#[derive(Debug, Error)]
pub enum PrefabError {
    #[error("unknown prefab {0:?}")]
    UnknownPrefab(String),
    #[error(transparent)]
    Rotation(#[from] RotationError),
}

/// An entity embedded in a template, expressed in the template's local frame.
/// `id_hint` keys per-instance overrides and suffixes the generated world
/// entity id.
#[derive(Clone, Debug)]
pub struct PrefabEntity {
    pub id_hint: String,
    pub kind: EntityKind,
    pub local: VoxelCoord,
    pub yaw: Yaw,
    pub status: Option<String>,
}

/// Attachment point on a template surface: local position plus the outward
/// face it mates along, tagged for matching (power, corridor, duct, ...).
#[derive(Clone, Debug)]
pub struct Connector {
    pub local: VoxelCoord,
    pub direction: Face,
    pub tag: String,
}

/// A reusable voxel template. Cell coordinates are anchor-relative; identity
/// is immutable and instances reference it by id only.
#[derive(Clone, Debug, Default)]
pub struct Prefab {
    pub id: String,
    pub name: String,
    pub category: String,
    pub anchor: VoxelCoord,
    cells: BTreeMap<VoxelCoord, Cell>,
    pub entities: Vec<PrefabEntity>,
    pub connectors: Vec<Connector>,
    pub metadata: BTreeMap<String, String>,
}

impl Prefab {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    /// AIR cells are kept: a template may carve as well as build.
    pub fn set_cell(&mut self, local: VoxelCoord, cell: Cell) {
        self.cells.insert(local, cell);
    }

    pub fn remove_cell(&mut self, local: VoxelCoord) {
        self.cells.remove(&local);
    }

    pub fn get_cell(&self, local: VoxelCoord) -> Option<Cell> {
        self.cells.get(&local).copied()
    }

    /// Deterministic (coordinate-ordered) iteration over template cells.
    pub fn cells(&self) -> impl Iterator<Item = (VoxelCoord, Cell)> + '_ {
        self.cells.iter().map(|(p, c)| (*p, *c))
    }

    #[inline]
    pub fn voxel_count(&self) -> usize {
        self.cells.len()
    }

    /// Anchor-relative AABB over template cells, inclusive. `None` for an
    /// empty template.
    pub fn bounds(&self) -> Option<(VoxelCoord, VoxelCoord)> {
        let mut it = self.cells.keys();
        let first = *it.next()?;
        let mut lo = first;
        let mut hi = first;
        for p in it {
            lo = lo.min(*p);
            hi = hi.max(*p);
        }
        Some((lo, hi))
    }
}

/// Exclusive owner of prefabs. Instances hold ids; edits propagate to
/// instances by re-resolution.
#[derive(Default, Debug)]
pub struct PrefabLibrary {
    prefabs: BTreeMap<String, Prefab>,
}

impl PrefabLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prefab: Prefab) {
        self.prefabs.insert(prefab.id.clone(), prefab);
    }

    pub fn get(&self, id: &str) -> Option<&Prefab> {
        self.prefabs.get(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Prefab> {
        self.prefabs.remove(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.prefabs.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }
}
