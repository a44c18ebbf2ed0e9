use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use skiff_layout::{Entity, EntityKind, PrefabInstance, RoomVolume};
use skiff_prefab::{AnimatedChild, PrefabError, PrefabLibrary, PrefabResolver};
use skiff_voxel::{Cell, VoxelCoord, VoxelType, Yaw};
use skiff_world::World;

use crate::plan::{AssetPlan, DoorPlan, EntityPlan, RoomPlan, ShipPlan};

/// Build dimensions in voxels. Defaults: 8-voxel (20 cm) shell thickness,
/// 48x88 doorway openings.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapBuildConfig {
    pub wall_thickness: i32,
    pub door_width: i32,
    pub door_height: i32,
    pub light_strip_width: i32,
    pub light_strip_max_len: i32,
}

impl Default for MapBuildConfig {
    fn default() -> Self {
        Self {
            wall_thickness: 8,
            door_width: 48,
            door_height: 88,
            light_strip_width: 3,
            light_strip_max_len: 10,
        }
    }
}

impl MapBuildConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

/// Everything a build produces besides the voxels themselves.
#[derive(Debug, Default)]
pub struct BuiltMap {
    pub rooms: BTreeMap<String, RoomVolume>,
    pub entities: BTreeMap<String, Entity>,
    pub prefab_instances: Vec<PrefabInstance>,
    pub animated: Vec<AnimatedChild>,
    pub skipped_assets: usize,
    pub skipped_entities: usize,
}

/// Deterministic construction of a ship plan into a world. Two builds of the
/// same plan and config produce identical chunk contents.
pub struct MapBuilder {
    config: MapBuildConfig,
}

impl MapBuilder {
    pub fn new(config: MapBuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapBuildConfig {
        &self.config
    }

    /// The whole build runs inside the world's bulk region; listeners see one
    /// event per touched chunk when it completes.
    pub fn build(
        &self,
        world: &mut World,
        library: &PrefabLibrary,
        plan: &ShipPlan,
    ) -> BuiltMap {
        let mut out = BuiltMap::default();
        world.begin_bulk();
        for room in &plan.rooms {
            self.build_room(world, room, &mut out);
        }
        for door in &plan.doors {
            self.cut_doorway(world, &plan.rooms, door, &mut out);
        }
        for entity in &plan.entities {
            self.record_entity(entity, &mut out);
        }
        let resolver = PrefabResolver::new(library);
        for (index, asset) in plan.assets.iter().enumerate() {
            self.place_asset(world, &resolver, index, asset, &mut out);
        }
        world.end_bulk();
        out
    }

    fn build_room(&self, world: &mut World, room: &RoomPlan, out: &mut BuiltMap) {
        let t = self.config.wall_thickness;
        let size = room.size;
        let base = VoxelCoord::new(
            room.position.x - size.x / 2,
            room.position.y - size.y / 2,
            room.position.z - size.z / 2,
        );

        let floor = Cell::new(VoxelType::Floor, 0);
        let ceiling = Cell::new(VoxelType::Ceiling, 0);
        let wall = Cell::new(VoxelType::Wall, 0);

        // Footprint covers the wall ring so shell corners are closed
        let fx0 = base.x - t;
        let fx1 = base.x + size.x + t - 1;
        let fz0 = base.z - t;
        let fz1 = base.z + size.z + t - 1;

        // Floor slab below the interior, ceiling slab above it
        world.fill_box(
            VoxelCoord::new(fx0, base.y - t, fz0),
            VoxelCoord::new(fx1, base.y - 1, fz1),
            floor,
        );
        world.fill_box(
            VoxelCoord::new(fx0, base.y + size.y, fz0),
            VoxelCoord::new(fx1, base.y + size.y + t - 1, fz1),
            ceiling,
        );

        // Four wall panels around the interior
        let wy0 = base.y;
        let wy1 = base.y + size.y - 1;
        world.fill_box(
            VoxelCoord::new(fx0, wy0, fz0),
            VoxelCoord::new(base.x - 1, wy1, fz1),
            wall,
        );
        world.fill_box(
            VoxelCoord::new(base.x + size.x, wy0, fz0),
            VoxelCoord::new(fx1, wy1, fz1),
            wall,
        );
        world.fill_box(
            VoxelCoord::new(base.x, wy0, fz0),
            VoxelCoord::new(base.x + size.x - 1, wy1, base.z - 1),
            wall,
        );
        world.fill_box(
            VoxelCoord::new(base.x, wy0, base.z + size.z),
            VoxelCoord::new(base.x + size.x - 1, wy1, fz1),
            wall,
        );

        // Light fixture strip on the centre of the ceiling
        let len = self.config.light_strip_max_len.min(size.x / 2);
        let width = self.config.light_strip_width;
        if len > 0 && width > 0 {
            let lx0 = base.x + size.x / 2 - len / 2;
            let lz0 = base.z + size.z / 2 - width / 2;
            world.fill_box(
                VoxelCoord::new(lx0, base.y + size.y - 1, lz0),
                VoxelCoord::new(lx0 + len - 1, base.y + size.y - 1, lz0 + width - 1),
                Cell::new(VoxelType::LightFixture, 0),
            );
        }

        let volume = RoomVolume::new(
            room.id.clone(),
            room.name.clone(),
            base,
            base.offset(size.x - 1, size.y - 1, size.z - 1),
        );
        out.rooms.insert(room.id.clone(), volume);
    }

    fn cut_doorway(
        &self,
        world: &mut World,
        rooms: &[RoomPlan],
        door: &DoorPlan,
        out: &mut BuiltMap,
    ) {
        let yaw = match Yaw::from_degrees(door.yaw) {
            Ok(y) => y,
            Err(e) => {
                log::warn!("door {:?}: {}; skipping", door.id, e);
                out.skipped_entities += 1;
                return;
            }
        };
        let w = self.config.door_width;
        let h = self.config.door_height;
        let cut = 2 * self.config.wall_thickness + 1;
        let p = door.position;
        // 90/270 face along X (the opening spans Z); 0/180 face along Z
        let x_facing = matches!(yaw, Yaw::Deg90 | Yaw::Deg270);

        // Opening rectangle centred on the door position
        let a0 = -w / 2;
        let a1 = a0 + w - 1;
        let y0 = p.y - h / 2;
        let y1 = y0 + h - 1;

        if x_facing {
            world.fill_box(
                VoxelCoord::new(p.x - cut, y0, p.z + a0),
                VoxelCoord::new(p.x + cut, y1, p.z + a1),
                Cell::AIR,
            );
        } else {
            world.fill_box(
                VoxelCoord::new(p.x + a0, y0, p.z - cut),
                VoxelCoord::new(p.x + a1, y1, p.z + cut),
                Cell::AIR,
            );
        }

        // Three-sided frame (top and both sides) around the opening, thin
        // relative to the opening and shallower than the cut
        let ft = (w / 16).max(1);
        let fd = (self.config.wall_thickness / 2).max(1);
        let frame = Cell::new(VoxelType::DoorFrame, 0);
        if x_facing {
            let (dx0, dx1) = (p.x - fd, p.x + fd);
            world.fill_box(
                VoxelCoord::new(dx0, y0, p.z + a0 - ft),
                VoxelCoord::new(dx1, y1, p.z + a0 - 1),
                frame,
            );
            world.fill_box(
                VoxelCoord::new(dx0, y0, p.z + a1 + 1),
                VoxelCoord::new(dx1, y1, p.z + a1 + ft),
                frame,
            );
            world.fill_box(
                VoxelCoord::new(dx0, y1 + 1, p.z + a0 - ft),
                VoxelCoord::new(dx1, y1 + ft, p.z + a1 + ft),
                frame,
            );
        } else {
            let (dz0, dz1) = (p.z - fd, p.z + fd);
            world.fill_box(
                VoxelCoord::new(p.x + a0 - ft, y0, dz0),
                VoxelCoord::new(p.x + a0 - 1, y1, dz1),
                frame,
            );
            world.fill_box(
                VoxelCoord::new(p.x + a1 + 1, y0, dz0),
                VoxelCoord::new(p.x + a1 + ft, y1, dz1),
                frame,
            );
            world.fill_box(
                VoxelCoord::new(p.x + a0 - ft, y1 + 1, dz0),
                VoxelCoord::new(p.x + a1 + ft, y1 + ft, dz1),
                frame,
            );
        }

        let connects = self.connects_rooms(rooms, p, x_facing);
        let entity = Entity::new(
            door.id.clone(),
            EntityKind::Door {
                connects_rooms: connects,
                width: w,
                height: h,
            },
            p,
            yaw,
        );
        out.entities.insert(door.id.clone(), entity);
    }

    /// Scan rooms in plan order for wall bands coincident with the door
    /// plane. Fewer than two matches leave empty strings; not an error.
    fn connects_rooms(
        &self,
        rooms: &[RoomPlan],
        p: VoxelCoord,
        x_facing: bool,
    ) -> [String; 2] {
        let t = self.config.wall_thickness;
        let mut found: Vec<&str> = Vec::new();
        for room in rooms {
            let size = room.size;
            let base = VoxelCoord::new(
                room.position.x - size.x / 2,
                room.position.y - size.y / 2,
                room.position.z - size.z / 2,
            );
            let in_y = p.y >= base.y - t && p.y <= base.y + size.y + t - 1;
            if !in_y {
                continue;
            }
            let matched = if x_facing {
                let in_z = p.z >= base.z - t && p.z <= base.z + size.z + t - 1;
                let west = p.x >= base.x - t && p.x <= base.x - 1;
                let east = p.x >= base.x + size.x && p.x <= base.x + size.x + t - 1;
                in_z && (west || east)
            } else {
                let in_x = p.x >= base.x - t && p.x <= base.x + size.x + t - 1;
                let north = p.z >= base.z - t && p.z <= base.z - 1;
                let south = p.z >= base.z + size.z && p.z <= base.z + size.z + t - 1;
                in_x && (north || south)
            };
            if matched {
                found.push(&room.id);
                if found.len() == 2 {
                    break;
                }
            }
        }
        [
            found.first().map(|s| s.to_string()).unwrap_or_default(),
            found.get(1).map(|s| s.to_string()).unwrap_or_default(),
        ]
    }

    fn record_entity(&self, plan: &EntityPlan, out: &mut BuiltMap) {
        let yaw = match Yaw::from_degrees(plan.yaw) {
            Ok(y) => y,
            Err(e) => {
                log::warn!("entity {:?}: {}; skipping", plan.id, e);
                out.skipped_entities += 1;
                return;
            }
        };
        let kind = match plan.kind.as_str() {
            "terminal" => EntityKind::Terminal,
            "switch" => EntityKind::Switch,
            "sensor" => EntityKind::Sensor,
            "light" => EntityKind::Light,
            other => EntityKind::Other {
                name: other.to_string(),
                properties: plan.properties.clone(),
            },
        };
        let mut entity = Entity::new(plan.id.clone(), kind, plan.position, yaw);
        entity.status = plan.status.clone();
        out.entities.insert(plan.id.clone(), entity);
    }

    fn place_asset(
        &self,
        world: &mut World,
        resolver: &PrefabResolver<'_>,
        index: usize,
        asset: &AssetPlan,
        out: &mut BuiltMap,
    ) {
        let result = Yaw::from_degrees(asset.yaw)
            .map_err(PrefabError::from)
            .and_then(|yaw| {
                let id = asset
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("asset_{}", index));
                let instance = PrefabInstance {
                    id,
                    prefab_id: asset.asset_id.clone(),
                    position: asset.position.offset(0, asset.height_offset, 0),
                    yaw,
                    overrides: asset.overrides.clone(),
                };
                resolver
                    .resolve(&instance)
                    .map(|resolved| (instance, resolved))
            });
        match result {
            Ok((instance, resolved)) => {
                for (pos, cell) in &resolved.voxels {
                    world.set_voxel(*pos, *cell);
                }
                for entity in resolved.entities {
                    out.entities.insert(entity.id.clone(), entity);
                }
                out.animated.extend(resolved.animated);
                out.prefab_instances.push(instance);
            }
            Err(e) => {
                log::warn!("asset {:?}: {}; skipping", asset.asset_id, e);
                out.skipped_assets += 1;
            }
        }
    }
}

