use skiff_layout::{Entity, EntityKind, PrefabInstance};
use skiff_voxel::{Cell, Face, VoxelCoord, VoxelType, rotate_face_y, rotate_y};
use skiff_world::World;

use crate::{PrefabError, PrefabLibrary};

/// A resolved cell the renderer animates separately (fan blades, door
/// panels, screens). The mesher already treats these types as transparent;
/// the resolver only records the handoff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatedChild {
    pub pos: VoxelCoord,
    pub cell: Cell,
}

/// A template connector carried into world space: position and mating face
/// rotated by the instance yaw, tag preserved for matching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConnector {
    pub pos: VoxelCoord,
    pub direction: Face,
    pub tag: String,
}

/// Expansion of one instance: world cell writes plus world-space entities
/// and connectors.
#[derive(Clone, Debug, Default)]
pub struct Resolved {
    pub voxels: Vec<(VoxelCoord, Cell)>,
    pub entities: Vec<Entity>,
    pub animated: Vec<AnimatedChild>,
    pub connectors: Vec<ResolvedConnector>,
}

fn is_animated(cell: Cell) -> bool {
    matches!(
        cell.ty(),
        VoxelType::Screen | VoxelType::FanBlade | VoxelType::DoorPanel
    )
}

/// Expands templates against a library. Stateless; borrow it wherever
/// instances need placing.
pub struct PrefabResolver<'a> {
    library: &'a PrefabLibrary,
}

impl<'a> PrefabResolver<'a> {
    pub fn new(library: &'a PrefabLibrary) -> Self {
        Self { library }
    }

    /// Expand one instance. An instance whose prefab the library no longer
    /// holds fails with [`PrefabError::UnknownPrefab`]; the lenient bulk
    /// paths ([`resolve_all`](Self::resolve_all)) log and skip instead.
    pub fn resolve(&self, instance: &PrefabInstance) -> Result<Resolved, PrefabError> {
        let prefab = self
            .library
            .get(&instance.prefab_id)
            .ok_or_else(|| PrefabError::UnknownPrefab(instance.prefab_id.clone()))?;

        let mut out = Resolved::default();
        for (local, cell) in prefab.cells() {
            let world = add(instance.position, rotate_y(local, instance.yaw));
            if is_animated(cell) {
                out.animated.push(AnimatedChild { pos: world, cell });
            }
            out.voxels.push((world, cell));
        }

        for pe in &prefab.entities {
            let pos = add(instance.position, rotate_y(pe.local, instance.yaw));
            let mut yaw = pe.yaw.compose(instance.yaw);
            let mut kind = pe.kind.clone();
            let mut status = pe.status.clone();
            if let Some(over) = instance.overrides.get(&pe.id_hint) {
                if let Some(y) = over.yaw {
                    yaw = y;
                }
                if over.status.is_some() {
                    status = over.status.clone();
                }
                if !over.properties.is_empty() {
                    if let EntityKind::Other { properties, .. } = &mut kind {
                        for (k, v) in &over.properties {
                            properties.insert(k.clone(), v.clone());
                        }
                    }
                }
            }
            let mut entity = Entity::new(format!("{}_{}", instance.id, pe.id_hint), kind, pos, yaw);
            entity.status = status;
            out.entities.push(entity);
        }

        for connector in &prefab.connectors {
            out.connectors.push(ResolvedConnector {
                pos: add(instance.position, rotate_y(connector.local, instance.yaw)),
                direction: rotate_face_y(connector.direction, instance.yaw),
                tag: connector.tag.clone(),
            });
        }
        Ok(out)
    }

    /// Lenient bulk expansion: failed instances are logged and skipped, the
    /// rest resolve.
    pub fn resolve_all(&self, instances: &[PrefabInstance]) -> Vec<Resolved> {
        instances
            .iter()
            .filter_map(|inst| match self.resolve(inst) {
                Ok(resolved) => Some(resolved),
                Err(e) => {
                    log::warn!("instance {:?}: {}; skipping", inst.id, e);
                    None
                }
            })
            .collect()
    }

    /// Resolve and write each instance through `set_voxel`. Callers wrap in
    /// the world's bulk region when placing many instances.
    pub fn apply_to_world(&self, world: &mut World, instances: &[PrefabInstance]) -> Vec<Resolved> {
        let resolved = self.resolve_all(instances);
        for r in &resolved {
            for (pos, cell) in &r.voxels {
                world.set_voxel(*pos, *cell);
            }
        }
        resolved
    }

    /// World positions where the instance would overwrite an existing
    /// non-AIR cell. With `ignore_air`, the template's own carve (AIR) cells
    /// are not counted.
    pub fn check_collision(
        &self,
        world: &World,
        instance: &PrefabInstance,
        ignore_air: bool,
    ) -> Result<Vec<VoxelCoord>, PrefabError> {
        let resolved = self.resolve(instance)?;
        Ok(resolved
            .voxels
            .iter()
            .filter(|(_, cell)| !(ignore_air && cell.is_air()))
            .filter(|(pos, _)| !world.get_voxel(*pos).is_air())
            .map(|(pos, _)| *pos)
            .collect())
    }

    /// World-space AABB of the rotated template, inclusive: rotate the eight
    /// corners and take componentwise min/max. `Ok(None)` for a template
    /// with no cells.
    pub fn instance_bounds(
        &self,
        instance: &PrefabInstance,
    ) -> Result<Option<(VoxelCoord, VoxelCoord)>, PrefabError> {
        let prefab = self
            .library
            .get(&instance.prefab_id)
            .ok_or_else(|| PrefabError::UnknownPrefab(instance.prefab_id.clone()))?;
        let Some((lo, hi)) = prefab.bounds() else {
            return Ok(None);
        };
        let mut out: Option<(VoxelCoord, VoxelCoord)> = None;
        for corner in [
            VoxelCoord::new(lo.x, lo.y, lo.z),
            VoxelCoord::new(hi.x, lo.y, lo.z),
            VoxelCoord::new(lo.x, hi.y, lo.z),
            VoxelCoord::new(lo.x, lo.y, hi.z),
            VoxelCoord::new(hi.x, hi.y, lo.z),
            VoxelCoord::new(hi.x, lo.y, hi.z),
            VoxelCoord::new(lo.x, hi.y, hi.z),
            VoxelCoord::new(hi.x, hi.y, hi.z),
        ] {
            let w = add(instance.position, rotate_y(corner, instance.yaw));
            out = Some(match out {
                Some((omin, omax)) => (omin.min(w), omax.max(w)),
                None => (w, w),
            });
        }
        Ok(out)
    }

    /// Voxel writes only, for ghost rendering while placing.
    pub fn preview(&self, instance: &PrefabInstance) -> Result<Vec<(VoxelCoord, Cell)>, PrefabError> {
        Ok(self.resolve(instance)?.voxels)
    }
}

#[inline]
fn add(a: VoxelCoord, b: VoxelCoord) -> VoxelCoord {
    VoxelCoord::new(a.x + b.x, a.y + b.y, a.z + b.z)
}
