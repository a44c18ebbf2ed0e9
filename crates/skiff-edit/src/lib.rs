//! Editor brushes over the world, recorded as undoable cell changes.
#![forbid(unsafe_code)]

use std::collections::{HashMap, HashSet, VecDeque};

use skiff_raycast::line_voxels;
use skiff_voxel::{Cell, VoxelCoord};
use skiff_world::World;

/// Hard cap on flood fill so a fill in an open volume always terminates.
pub const MAX_FILL: usize = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushMode {
    Single,
    Line,
    Box,
    Fill,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellChange {
    pub pos: VoxelCoord,
    pub before: Cell,
    pub after: Cell,
}

/// One undoable operation: plain data, no closures. Undo restores `before`
/// values in reverse order; redo reapplies `after` in order.
#[derive(Clone, Debug, Default)]
pub struct EditAction {
    pub changes: Vec<CellChange>,
}

#[derive(Default)]
struct Stroke {
    changes: Vec<CellChange>,
    index: HashMap<VoxelCoord, usize>,
}

impl Stroke {
    /// Coalesce repeated writes to one coordinate: keep the first `before`,
    /// update to the latest `after`.
    fn record(&mut self, world: &mut World, pos: VoxelCoord, cell: Cell) -> bool {
        let before = world.get_voxel(pos);
        if before == cell {
            return false;
        }
        world.set_voxel(pos, cell);
        match self.index.get(&pos) {
            Some(i) => self.changes[*i].after = cell,
            None => {
                self.index.insert(pos, self.changes.len());
                self.changes.push(CellChange {
                    pos,
                    before,
                    after: cell,
                });
            }
        }
        true
    }
}

/// Undo/redo stacks plus an optional in-flight stroke. One-shot brush
/// operations commit a whole action; interactive strokes accumulate writes
/// until ended or cancelled.
#[derive(Default)]
pub struct EditHistory {
    undo: Vec<EditAction>,
    redo: Vec<EditAction>,
    stroke: Option<Stroke>,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn commit(&mut self, stroke: Stroke) -> usize {
        let count = stroke.changes.len();
        if count > 0 {
            self.undo.push(EditAction {
                changes: stroke.changes,
            });
            self.redo.clear();
        }
        count
    }

    /// Apply at one voxel (the hit-adjacent voxel when placing, the hit
    /// voxel when erasing). Returns the number of cells changed.
    pub fn apply_single(&mut self, world: &mut World, pos: VoxelCoord, cell: Cell) -> usize {
        let mut stroke = Stroke::default();
        stroke.record(world, pos, cell);
        self.commit(stroke)
    }

    /// Bresenham line between the stroke anchor and end point.
    pub fn apply_line(
        &mut self,
        world: &mut World,
        start: VoxelCoord,
        end: VoxelCoord,
        cell: Cell,
    ) -> usize {
        let mut stroke = Stroke::default();
        for pos in line_voxels(start, end) {
            stroke.record(world, pos, cell);
        }
        self.commit(stroke)
    }

    /// Fill the axis-aligned span between two corners, any order.
    pub fn apply_box(
        &mut self,
        world: &mut World,
        a: VoxelCoord,
        b: VoxelCoord,
        cell: Cell,
    ) -> usize {
        let lo = a.min(b);
        let hi = a.max(b);
        let mut stroke = Stroke::default();
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    stroke.record(world, VoxelCoord::new(x, y, z), cell);
                }
            }
        }
        self.commit(stroke)
    }

    /// Flood fill by 6-neighbour connectivity into cells whose *type* equals
    /// the seed's type, bounded by [`MAX_FILL`] cells.
    pub fn apply_fill(&mut self, world: &mut World, seed: VoxelCoord, cell: Cell) -> usize {
        let seed_ty = world.get_voxel(seed).ty();
        if cell.ty() == seed_ty {
            return 0;
        }
        let mut stroke = Stroke::default();
        let mut queue = VecDeque::new();
        let mut seen = HashSet::new();
        queue.push_back(seed);
        seen.insert(seed);
        let mut filled = 0usize;
        while let Some(pos) = queue.pop_front() {
            if filled >= MAX_FILL {
                break;
            }
            stroke.record(world, pos, cell);
            filled += 1;
            for (dx, dy, dz) in [
                (-1, 0, 0),
                (1, 0, 0),
                (0, -1, 0),
                (0, 1, 0),
                (0, 0, -1),
                (0, 0, 1),
            ] {
                let n = pos.offset(dx, dy, dz);
                if world.get_voxel(n).ty() == seed_ty && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        self.commit(stroke)
    }

    pub fn begin_stroke(&mut self) {
        self.stroke = Some(Stroke::default());
    }

    pub fn stroke_active(&self) -> bool {
        self.stroke.is_some()
    }

    /// Write within the current stroke; no-op when no stroke is active.
    pub fn stroke_write(&mut self, world: &mut World, pos: VoxelCoord, cell: Cell) -> bool {
        match &mut self.stroke {
            Some(stroke) => stroke.record(world, pos, cell),
            None => false,
        }
    }

    /// Commit the stroke as one undoable action; returns cells changed.
    pub fn end_stroke(&mut self) -> usize {
        match self.stroke.take() {
            Some(stroke) => self.commit(stroke),
            None => 0,
        }
    }

    /// Revert every change recorded so far in this stroke and discard it.
    pub fn cancel_stroke(&mut self, world: &mut World) {
        if let Some(stroke) = self.stroke.take() {
            for change in stroke.changes.iter().rev() {
                world.set_voxel(change.pos, change.before);
            }
        }
    }

    pub fn undo(&mut self, world: &mut World) -> bool {
        match self.undo.pop() {
            Some(action) => {
                for change in action.changes.iter().rev() {
                    world.set_voxel(change.pos, change.before);
                }
                self.redo.push(action);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self, world: &mut World) -> bool {
        match self.redo.pop() {
            Some(action) => {
                for change in &action.changes {
                    world.set_voxel(change.pos, change.after);
                }
                self.undo.push(action);
                true
            }
            None => false,
        }
    }

    /// Route a completed drag to the brush for its mode. Single and Fill act
    /// at the end voxel.
    pub fn apply(
        &mut self,
        world: &mut World,
        mode: BrushMode,
        start: VoxelCoord,
        end: VoxelCoord,
        cell: Cell,
    ) -> usize {
        match mode {
            BrushMode::Single => self.apply_single(world, end, cell),
            BrushMode::Line => self.apply_line(world, start, end, cell),
            BrushMode::Box => self.apply_box(world, start, end, cell),
            BrushMode::Fill => self.apply_fill(world, end, cell),
        }
    }

    #[inline]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    #[inline]
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_voxel::VoxelType;

    fn wall() -> Cell {
        Cell::new(VoxelType::Wall, 0)
    }

    fn glass() -> Cell {
        Cell::new(VoxelType::Glass, 0)
    }

    #[test]
    fn single_apply_and_undo_redo() {
        let mut world = World::new();
        let mut history = EditHistory::new();
        let pos = VoxelCoord::new(1, 2, 3);

        assert_eq!(history.apply_single(&mut world, pos, wall()), 1);
        assert_eq!(world.get_voxel(pos), wall());

        assert!(history.undo(&mut world));
        assert_eq!(world.get_voxel(pos), Cell::AIR);
        assert!(history.redo(&mut world));
        assert_eq!(world.get_voxel(pos), wall());

        // Nothing left to redo
        assert!(!history.redo(&mut world));
    }

    #[test]
    fn noop_writes_record_nothing() {
        let mut world = World::new();
        let mut history = EditHistory::new();
        assert_eq!(
            history.apply_single(&mut world, VoxelCoord::new(0, 0, 0), Cell::AIR),
            0
        );
        assert_eq!(history.undo_depth(), 0);
    }

    #[test]
    fn line_brush_covers_the_segment() {
        let mut world = World::new();
        let mut history = EditHistory::new();
        let n = history.apply_line(
            &mut world,
            VoxelCoord::new(0, 0, 0),
            VoxelCoord::new(4, 0, 0),
            wall(),
        );
        assert_eq!(n, 5);
        for x in 0..=4 {
            assert_eq!(world.get_voxel(VoxelCoord::new(x, 0, 0)), wall());
        }
        history.undo(&mut world);
        assert_eq!(world.total_voxels(), 0);
    }

    #[test]
    fn box_brush_spans_any_corner_order() {
        let mut world = World::new();
        let mut history = EditHistory::new();
        let n = history.apply_box(
            &mut world,
            VoxelCoord::new(2, 1, 2),
            VoxelCoord::new(0, 0, 0),
            glass(),
        );
        assert_eq!(n, 3 * 2 * 3);
        assert_eq!(world.get_voxel(VoxelCoord::new(1, 1, 1)), glass());
    }

    #[test]
    fn fill_replaces_connected_matching_types_only() {
        let mut world = World::new();
        // A 3x1x3 glass pad with a wall cell splitting one corner off
        for z in 0..3 {
            for x in 0..3 {
                world.set_voxel(VoxelCoord::new(x, 0, z), glass());
            }
        }
        world.set_voxel(VoxelCoord::new(1, 0, 2), wall());
        world.set_voxel(VoxelCoord::new(2, 0, 1), wall());

        let mut history = EditHistory::new();
        let n = history.apply_fill(&mut world, VoxelCoord::new(0, 0, 0), wall());
        // (2,0,2) is cut off diagonally: 6-neighbour connectivity only
        assert_eq!(n, 6);
        assert_eq!(world.get_voxel(VoxelCoord::new(0, 0, 2)), wall());
        assert_eq!(world.get_voxel(VoxelCoord::new(2, 0, 2)), glass());
    }

    #[test]
    fn fill_terminates_at_the_cap_in_open_space() {
        let mut world = World::new();
        let mut history = EditHistory::new();
        // Seed in an unbounded AIR volume: the cap is the only stop
        let n = history.apply_fill(&mut world, VoxelCoord::new(0, 0, 0), wall());
        assert_eq!(n, MAX_FILL);
        assert_eq!(world.total_voxels(), MAX_FILL);
        // And the whole thing unwinds as one action
        assert!(history.undo(&mut world));
        assert_eq!(world.total_voxels(), 0);
    }

    #[test]
    fn stroke_coalesces_and_cancels() {
        let mut world = World::new();
        world.set_voxel(VoxelCoord::new(0, 0, 0), glass());

        let mut history = EditHistory::new();
        history.begin_stroke();
        history.stroke_write(&mut world, VoxelCoord::new(0, 0, 0), wall());
        history.stroke_write(&mut world, VoxelCoord::new(1, 0, 0), wall());
        // Second write to the same coordinate within the stroke
        history.stroke_write(&mut world, VoxelCoord::new(0, 0, 0), Cell::new(VoxelType::Pipe, 0));
        history.cancel_stroke(&mut world);

        // Everything restored to pre-stroke state
        assert_eq!(world.get_voxel(VoxelCoord::new(0, 0, 0)), glass());
        assert_eq!(world.get_voxel(VoxelCoord::new(1, 0, 0)), Cell::AIR);
        assert_eq!(history.undo_depth(), 0);
    }

    #[test]
    fn stroke_commits_one_action() {
        let mut world = World::new();
        let mut history = EditHistory::new();
        history.begin_stroke();
        for x in 0..3 {
            history.stroke_write(&mut world, VoxelCoord::new(x, 0, 0), wall());
        }
        assert_eq!(history.end_stroke(), 3);
        assert_eq!(history.undo_depth(), 1);
        history.undo(&mut world);
        assert_eq!(world.total_voxels(), 0);
    }

    #[test]
    fn new_action_clears_redo() {
        let mut world = World::new();
        let mut history = EditHistory::new();
        history.apply_single(&mut world, VoxelCoord::new(0, 0, 0), wall());
        history.undo(&mut world);
        assert_eq!(history.redo_depth(), 1);
        history.apply_single(&mut world, VoxelCoord::new(1, 0, 0), wall());
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn mode_dispatch_routes_to_the_right_brush() {
        let mut world = World::new();
        let mut history = EditHistory::new();
        let a = VoxelCoord::new(0, 0, 0);
        let b = VoxelCoord::new(2, 0, 0);
        assert_eq!(history.apply(&mut world, BrushMode::Line, a, b, wall()), 3);
        assert_eq!(history.apply(&mut world, BrushMode::Single, a, b, glass()), 1);
        assert_eq!(world.get_voxel(b), glass());
    }

    #[test]
    fn overwrite_undo_restores_previous_cell() {
        let mut world = World::new();
        let pos = VoxelCoord::new(5, 5, 5);
        world.set_voxel(pos, glass());
        let mut history = EditHistory::new();
        history.apply_single(&mut world, pos, wall());
        history.undo(&mut world);
        assert_eq!(world.get_voxel(pos), glass());
    }
}
