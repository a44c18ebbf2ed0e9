//! End-to-end: plan -> build -> layout JSON -> fresh world -> mesh -> VMSH.

use skiff_build::{DoorPlan, MapBuildConfig, MapBuilder, RoomPlan, ShipPlan};
use skiff_layout::{Layout, LayoutMetadata, apply_layout, save_world};
use skiff_mesh_cpu::{decode_mesh, encode_mesh, mesh_chunk};
use skiff_prefab::PrefabLibrary;
use skiff_voxel::{Palette, VoxelCoord};
use skiff_world::World;

fn demo_plan() -> ShipPlan {
    ShipPlan {
        name: "demo deck".into(),
        rooms: vec![
            RoomPlan {
                id: "bridge".into(),
                name: "Bridge".into(),
                position: VoxelCoord::new(0, 0, 0),
                size: VoxelCoord::new(24, 16, 24),
            },
            RoomPlan {
                id: "hold".into(),
                name: "Cargo hold".into(),
                position: VoxelCoord::new(32, 0, 0),
                size: VoxelCoord::new(24, 16, 24),
            },
        ],
        doors: vec![DoorPlan {
            id: "hatch".into(),
            position: VoxelCoord::new(15, 0, 0),
            yaw: 90,
        }],
        ..ShipPlan::default()
    }
}

#[test]
fn plan_to_mesh_roundtrip() {
    let config = MapBuildConfig {
        wall_thickness: 4,
        door_width: 8,
        door_height: 12,
        light_strip_width: 3,
        light_strip_max_len: 10,
    };

    let mut world = World::new();
    let built = MapBuilder::new(config).build(&mut world, &PrefabLibrary::new(), &demo_plan());
    assert_eq!(built.rooms.len(), 2);
    assert_eq!(built.entities.len(), 1);

    let layout = save_world(
        &world,
        "demo deck",
        built.rooms,
        built.entities,
        built.prefab_instances,
        LayoutMetadata {
            created_at: "2024-11-02T09:00:00Z".into(),
            modified_at: "2024-11-02T09:00:00Z".into(),
        },
    );
    let json = layout.to_json_string().unwrap();

    // Fresh world from the document
    let parsed = Layout::from_json_str(&json).unwrap();
    let mut restored = World::new();
    let report = apply_layout(&mut restored, &parsed);
    assert!(!report.degraded());
    assert_eq!(restored.total_voxels(), world.total_voxels());

    // Every non-empty chunk meshes deterministically in both worlds, and
    // survives the binary cache format byte-for-byte
    let palette = Palette::default();
    let mut meshed = 0usize;
    for (cc, chunk) in world.chunks() {
        if chunk.is_empty() {
            continue;
        }
        let a = mesh_chunk(&world, *cc, &palette).unwrap();
        let b = mesh_chunk(&restored, *cc, &palette).unwrap();
        let bytes = encode_mesh(&a.build);
        assert_eq!(bytes, encode_mesh(&b.build));
        assert_eq!(decode_mesh(&bytes).unwrap(), a.build);
        meshed += 1;
    }
    assert!(meshed > 0);
}
