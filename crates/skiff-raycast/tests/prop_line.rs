use proptest::prelude::*;
use skiff_raycast::line_voxels;
use skiff_voxel::VoxelCoord;

fn coord() -> impl Strategy<Value = VoxelCoord> {
    (-64i32..64, -64i32..64, -64i32..64).prop_map(|(x, y, z)| VoxelCoord::new(x, y, z))
}

proptest! {
    // A segment visits exactly (driving-axis length + 1) voxels, endpoints
    // included, and every step moves each axis by at most one
    #[test]
    fn line_walk_shape(a in coord(), b in coord()) {
        let pts = line_voxels(a, b);
        let dx = (b.x - a.x).abs();
        let dy = (b.y - a.y).abs();
        let dz = (b.z - a.z).abs();
        prop_assert_eq!(pts.len() as i32, dx.max(dy).max(dz) + 1);
        prop_assert_eq!(*pts.first().unwrap(), a);
        prop_assert_eq!(*pts.last().unwrap(), b);
        for pair in pts.windows(2) {
            prop_assert!((pair[1].x - pair[0].x).abs() <= 1);
            prop_assert!((pair[1].y - pair[0].y).abs() <= 1);
            prop_assert!((pair[1].z - pair[0].z).abs() <= 1);
        }
    }

    // Voxels on the walk never leave the segment's bounding box
    #[test]
    fn line_stays_in_bounds(a in coord(), b in coord()) {
        let lo = a.min(b);
        let hi = a.max(b);
        for p in line_voxels(a, b) {
            prop_assert!(p.x >= lo.x && p.x <= hi.x);
            prop_assert!(p.y >= lo.y && p.y <= hi.y);
            prop_assert!(p.z >= lo.z && p.z <= hi.z);
        }
    }
}
