//! A uniform grid over the unit torus for approximate proximity queries.
//!
//! The square is cut into `resolution × resolution` cells of side `cell_size` (the last row and
//! column may be narrower when `cell_size` does not divide 1). Each cell holds the elements last
//! added at a position inside it. [`SpatialIndex::neighbors`] returns everything in the 3×3 block
//! of cells around a position, wrapping across the edges, so any element within `cell_size` of the
//! query point is guaranteed to be returned. Elements further away may be returned too; callers
//! that need an exact radius filter by distance themselves.
//!
//! Elements are identities (small `Copy` handles), not the objects they refer to. The index does
//! not know where an element is; the caller passes the same position to [`SpatialIndex::remove`]
//! that it last passed to [`SpatialIndex::add`]. Getting that wrong is a bug in the caller and
//! panics.
use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexSet;

use crate::position::Position;

/// Neighbor offsets in traversal order: the column to the left, the center column, then the
/// column to the right, each from top to bottom.
const NEIGHBOR_OFFSETS: [(i64, i64); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellCoordinate {
    column: i64,
    row: i64,
}

pub struct SpatialIndex<T> {
    cells: Vec<IndexSet<T>>,
    cell_size: f64,
    resolution: usize,
    len: usize,
}

impl<T> SpatialIndex<T>
where
    T: Copy + Eq + Hash + Debug,
{
    /// Creates an empty index with cells of side `cell_size`.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < cell_size <= 1`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(cell_size: f64) -> Self {
        assert!(
            cell_size > 0.0 && cell_size <= 1.0,
            "cell size must be in (0, 1], got {cell_size}"
        );
        let resolution = (1.0 / cell_size).ceil() as usize;
        let cells = (0..resolution * resolution)
            .map(|_| IndexSet::new())
            .collect();
        SpatialIndex {
            cells,
            cell_size,
            resolution,
            len: 0,
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// The number of cells along each axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// The number of elements in the index.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The cell containing `position`, numbered row by row from the origin.
    pub fn cell_id(&self, position: Position) -> usize {
        self.cell_id_from_coordinate(self.cell_coordinate(position))
    }

    /// The elements in cell `cell_id`, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `cell_id` is not less than `resolution²`.
    pub fn cell(&self, cell_id: usize) -> impl Iterator<Item = T> + '_ {
        self.cells[cell_id].iter().copied()
    }

    /// Whether `element` is in the cell containing `position`.
    pub fn contains(&self, element: T, position: Position) -> bool {
        self.cells[self.cell_id(position)].contains(&element)
    }

    /// Adds `element` to the cell containing `position`.
    ///
    /// # Panics
    ///
    /// Panics if `element` is already in that cell. An element must be removed before it is
    /// added again.
    pub fn add(&mut self, element: T, position: Position) {
        let cell_id = self.cell_id(position);
        let inserted = self.cells[cell_id].insert(element);
        assert!(
            inserted,
            "{element:?} is already in cell {cell_id} (position {position})"
        );
        self.len += 1;
    }

    /// Removes `element` from the cell containing `position`.
    ///
    /// # Panics
    ///
    /// Panics if `element` is not in that cell, which means `position` is not the position the
    /// element was last added at.
    pub fn remove(&mut self, element: T, position: Position) {
        let cell_id = self.cell_id(position);
        let removed = self.cells[cell_id].shift_remove(&element);
        assert!(
            removed,
            "{element:?} is not in cell {cell_id} (position {position})"
        );
        self.len -= 1;
    }

    /// Returns the contents of the 3×3 block of cells centered on the cell containing
    /// `position`, including that cell itself.
    pub fn neighbors(&self, position: Position) -> Vec<T> {
        let mut neighbors = Vec::new();
        self.neighbors_into(position, &mut neighbors);
        neighbors
    }

    /// Like [`SpatialIndex::neighbors`], but clears and fills `neighbors` so a buffer can be
    /// reused across queries.
    ///
    /// Cells come in the order of `NEIGHBOR_OFFSETS` and the elements of each cell in insertion
    /// order. On grids narrower than three cells the block overlaps itself and a cell's elements
    /// appear once for every offset that lands on it.
    pub fn neighbors_into(&self, position: Position, neighbors: &mut Vec<T>) {
        neighbors.clear();
        let center = self.cell_coordinate(position);

        for (d_column, d_row) in NEIGHBOR_OFFSETS {
            let cell_id = self.cell_id_from_coordinate(self.adjacent(center, d_column, d_row));
            neighbors.extend(self.cells[cell_id].iter().copied());
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_coordinate(&self, position: Position) -> CellCoordinate {
        let resolution = self.resolution as i64;
        CellCoordinate {
            column: ((position.x / self.cell_size).floor() as i64).rem_euclid(resolution),
            row: ((position.y / self.cell_size).floor() as i64).rem_euclid(resolution),
        }
    }

    fn adjacent(&self, coordinate: CellCoordinate, d_column: i64, d_row: i64) -> CellCoordinate {
        let resolution = self.resolution as i64;
        CellCoordinate {
            column: (coordinate.column + d_column).rem_euclid(resolution),
            row: (coordinate.row + d_row).rem_euclid(resolution),
        }
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn cell_id_from_coordinate(&self, coordinate: CellCoordinate) -> usize {
        coordinate.row as usize * self.resolution + coordinate.column as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn resolution_rounds_up() {
        assert_eq!(SpatialIndex::<u32>::new(0.4).resolution(), 3);
        assert_eq!(SpatialIndex::<u32>::new(0.25).resolution(), 4);
        assert_eq!(SpatialIndex::<u32>::new(1.0).resolution(), 1);
    }

    #[test]
    fn cell_id_from_position() {
        let index = SpatialIndex::<u32>::new(0.4);
        assert_eq!(index.cell_id(at(0.3, 0.1)), 0);
        assert_eq!(index.cell_id(at(0.9, 0.1)), 2);
        assert_eq!(index.cell_id(at(0.5, 0.5)), 4);
        assert_eq!(index.cell_id(at(0.6, 0.9)), 7);
        assert_eq!(index.cell_id(at(0.9, 0.9)), 8);
    }

    #[test]
    fn out_of_range_positions_fold_into_the_grid() {
        let index = SpatialIndex::<u32>::new(0.4);
        assert_eq!(index.cell_id(at(1.3, 0.1)), 0);
        assert_eq!(index.cell_id(at(-0.1, 0.1)), 2);
        assert_eq!(index.cell_id(at(0.1, 1.7)), 3);
    }

    #[test]
    fn add_remove() {
        let mut index = SpatialIndex::new(0.1);
        index.add(1, at(0.45, 0.47));
        index.add(2, at(0.47, 0.45));
        assert_eq!(index.len(), 2);
        assert_eq!(index.neighbors(at(0.46, 0.46)).len(), 2);

        index.remove(2, at(0.47, 0.45));
        assert_eq!(index.neighbors(at(0.46, 0.46)), vec![1]);

        index.remove(1, at(0.45, 0.47));
        assert!(index.neighbors(at(0.46, 0.46)).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn get_neighbors() {
        let mut index = SpatialIndex::new(0.1);
        //       0.3  0.4  0.5  0.6
        //        |    | 1  |    |
        // 0.3 ---+----+----+----+---
        //        |  2 |  3 |  4 |
        // 0.4 ---+----+----+----+---
        //      5 | 6,7| (8)| 9  | 10
        // 0.5 ---+----+----+----+---
        //        | 11 | 12 | 13 |
        // 0.6 ---+----+----+----+---
        //        |    | 14 |    |
        index.add(1, at(0.45, 0.25));
        index.add(2, at(0.35, 0.35));
        index.add(3, at(0.45, 0.35));
        index.add(4, at(0.55, 0.35));
        index.add(5, at(0.25, 0.45));
        index.add(6, at(0.35, 0.45));
        index.add(7, at(0.35, 0.45));
        index.add(8, at(0.45, 0.45));
        index.add(9, at(0.55, 0.45));
        index.add(10, at(0.65, 0.45));
        index.add(11, at(0.35, 0.55));
        index.add(12, at(0.45, 0.55));
        index.add(13, at(0.55, 0.55));
        index.add(14, at(0.45, 0.65));

        let neighbors = index.neighbors(at(0.47, 0.47));
        for excluded in [1, 5, 10, 14] {
            assert!(!neighbors.contains(&excluded), "{excluded} should be excluded");
        }
        for included in [2, 3, 4, 6, 7, 8, 9, 11, 12, 13] {
            assert!(neighbors.contains(&included), "{included} should be included");
        }
        assert_eq!(neighbors.len(), 10);
    }

    #[test]
    fn neighbors_wrap_across_the_seam() {
        let mut index = SpatialIndex::new(0.1);
        // Around the corner cell (0, 0): the wrapped block covers columns and rows {9, 0, 1}.
        index.add(1, at(0.95, 0.95));
        index.add(2, at(0.05, 0.95));
        index.add(3, at(0.15, 0.95));
        index.add(4, at(0.95, 0.05));
        index.add(5, at(0.05, 0.05));
        index.add(6, at(0.15, 0.15));
        index.add(7, at(0.95, 0.15));
        // One cell further out in each direction.
        index.add(8, at(0.85, 0.05));
        index.add(9, at(0.25, 0.05));
        index.add(10, at(0.05, 0.85));
        index.add(11, at(0.05, 0.25));

        let mut neighbors = index.neighbors(at(0.02, 0.03));
        neighbors.sort_unstable();
        assert_eq!(neighbors, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn neighbors_come_in_traversal_order() {
        let mut index = SpatialIndex::new(0.1);
        index.add(20, at(0.55, 0.55));
        index.add(10, at(0.45, 0.45));
        index.add(11, at(0.44, 0.44));
        index.add(30, at(0.35, 0.35));
        index.add(40, at(0.45, 0.35));

        // Left column, then center column (top, center), then right column.
        assert_eq!(index.neighbors(at(0.45, 0.45)), vec![30, 40, 10, 11, 20]);
    }

    #[test]
    fn removal_keeps_insertion_order() {
        let mut index = SpatialIndex::new(0.5);
        for element in 0..4 {
            index.add(element, at(0.1, 0.1));
        }
        index.remove(1, at(0.2, 0.2));
        assert_eq!(index.cell(0).collect::<Vec<_>>(), vec![0, 2, 3]);
    }

    #[test]
    fn small_grids_repeat_overlapping_cells() {
        let mut index = SpatialIndex::new(0.5);
        index.add(1, at(0.1, 0.1));
        index.add(2, at(0.9, 0.1));
        // On a 2×2 grid, columns -1 and 1 are the same column, as are rows -1 and 1.
        assert_eq!(index.neighbors(at(0.1, 0.1)), vec![2, 1, 2]);
        index.add(3, at(0.1, 0.9));
        assert_eq!(index.neighbors(at(0.1, 0.1)), vec![2, 3, 1, 3, 2]);

        let mut single = SpatialIndex::new(1.0);
        single.add('c', at(0.5, 0.5));
        assert_eq!(single.neighbors(at(0.0, 0.0)), vec!['c'; 9]);
    }

    #[test]
    fn contains_checks_the_cell_for_a_position() {
        let mut index = SpatialIndex::new(0.1);
        index.add(7, at(0.12, 0.12));
        assert!(index.contains(7, at(0.18, 0.11)));
        assert!(!index.contains(7, at(0.22, 0.12)));
    }

    #[test]
    #[should_panic(expected = "is already in cell")]
    fn adding_twice_panics() {
        let mut index = SpatialIndex::new(0.1);
        index.add(1, at(0.5, 0.5));
        index.add(1, at(0.51, 0.51));
    }

    #[test]
    #[should_panic(expected = "is not in cell")]
    fn removing_from_a_stale_position_panics() {
        let mut index = SpatialIndex::new(0.1);
        index.add(1, at(0.5, 0.5));
        index.remove(1, at(0.7, 0.5));
    }

    #[test]
    #[should_panic(expected = "cell size must be in (0, 1]")]
    fn zero_cell_size_panics() {
        let _ = SpatialIndex::<u32>::new(0.0);
    }
}
