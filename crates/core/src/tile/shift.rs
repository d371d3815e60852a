//! Tile-grid geometry for shifted views
//!
//! A shifted view of a tile borrows pixels from its neighbors. Given a shift
//! in tile units, [`tile_index_range`] lists every neighbor offset whose
//! pixels may land in the view.

use crate::error::{Error, Result};
use crate::raster::{Raster, RasterElement};
use std::collections::HashMap;

/// Largest shift magnitude, in tiles, accepted on either axis.
///
/// Bounds the grid at `(2 * MAX_SHIFT + 1)^2` offsets at most.
pub const MAX_SHIFT: f64 = 1024.0;

/// 2^63, the first magnitude that no longer fits in an `i64`
const I64_RANGE: f64 = 9_223_372_036_854_775_808.0;

/// A shift expressed in whole tiles, e.g. `(1.5, -0.3)` is one and a half
/// tiles along the columns and 0.3 tiles back along the rows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShiftVector {
    /// Shift along the column axis
    pub col: f64,
    /// Shift along the row axis
    pub row: f64,
}

impl ShiftVector {
    pub fn new(col: f64, row: f64) -> Self {
        Self { col, row }
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [("col_shift", self.col), ("row_shift", self.row)] {
            if !value.is_finite() {
                return Err(Error::InvalidParameter {
                    name,
                    value: value.to_string(),
                    reason: "shift must be finite".to_string(),
                });
            }
            if value.abs() > MAX_SHIFT {
                return Err(Error::InvalidParameter {
                    name,
                    value: value.to_string(),
                    reason: format!("shift exceeds {MAX_SHIFT} tiles"),
                });
            }
        }
        Ok(())
    }
}

/// Offset of a tile in the grid, relative to the origin tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileIndex {
    pub col: i64,
    pub row: i64,
}

impl TileIndex {
    /// The tile being shifted
    pub const ORIGIN: Self = Self { col: 0, row: 0 };

    pub const fn new(col: i64, row: i64) -> Self {
        Self { col, row }
    }
}

/// Row-major grid of tile offsets.
///
/// The outer sequence is indexed by row offset, the inner one by column
/// offset. Both walk away from the origin in the direction of the shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileIndexGrid {
    rows: Vec<Vec<TileIndex>>,
}

impl TileIndexGrid {
    /// Rows of the grid, outer index is the row offset
    pub fn rows(&self) -> &[Vec<TileIndex>] {
        &self.rows
    }

    /// Grid shape as (number of row offsets, number of column offsets)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.rows.first().map_or(0, Vec::len))
    }

    /// Total number of tiles in the grid
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Never true for grids built by [`tile_index_range`]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all offsets in row-major order
    pub fn iter(&self) -> impl Iterator<Item = TileIndex> + '_ {
        self.rows.iter().flatten().copied()
    }

    pub fn contains(&self, index: TileIndex) -> bool {
        self.iter().any(|i| i == index)
    }

    /// Column offsets, in travel order
    pub fn column_offsets(&self) -> Vec<i64> {
        self.rows
            .first()
            .map(|row| row.iter().map(|i| i.col).collect())
            .unwrap_or_default()
    }

    /// Row offsets, in travel order
    pub fn row_offsets(&self) -> Vec<i64> {
        self.rows
            .iter()
            .filter_map(|row| row.first().map(|i| i.row))
            .collect()
    }
}

impl<'a> IntoIterator for &'a TileIndexGrid {
    type Item = TileIndex;
    type IntoIter = std::iter::Copied<std::iter::Flatten<std::slice::Iter<'a, Vec<TileIndex>>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter().flatten().copied()
    }
}

/// Symmetric ceiling: round the magnitude up and keep the sign.
///
/// `1.3 -> 2`, `-1.3 -> -2`, `2.0 -> 2`, `0.0 -> 0`. Fails with
/// `InvalidParameter` when `x` is not finite or its ceiling does not fit in
/// an `i64`.
pub fn symmetric_ceil(x: f64) -> Result<i64> {
    let magnitude = x.abs().ceil();
    if !(magnitude < I64_RANGE) {
        return Err(Error::InvalidParameter {
            name: "shift",
            value: x.to_string(),
            reason: "does not fit a tile index".to_string(),
        });
    }
    let magnitude = magnitude as i64;
    Ok(if x < 0.0 { -magnitude } else { magnitude })
}

/// Every integer from `from` to `to`, both included, in travel order.
pub fn inclusive_range(from: i64, to: i64) -> Vec<i64> {
    if from <= to {
        (from..=to).collect()
    } else {
        (to..=from).rev().collect()
    }
}

/// Compute the tile offsets needed to render a tile shifted by `shift`.
///
/// Each axis spans `0..=symmetric_ceil(shift)` walking toward the bound, and
/// the grid is the Cartesian product of the two spans with rows outermost.
/// The origin `(0, 0)` is always the first entry.
///
/// # Example
/// ```
/// use tilecat_core::tile::{tile_index_range, ShiftVector};
///
/// let grid = tile_index_range(ShiftVector::new(-1.2, 0.0)).unwrap();
/// assert_eq!(grid.column_offsets(), vec![0, -1, -2]);
/// assert_eq!(grid.row_offsets(), vec![0]);
/// ```
pub fn tile_index_range(shift: ShiftVector) -> Result<TileIndexGrid> {
    shift.validate()?;

    let col_span = inclusive_range(0, symmetric_ceil(shift.col)?);
    let row_span = inclusive_range(0, symmetric_ceil(shift.row)?);

    let rows = row_span
        .iter()
        .map(|&row| {
            col_span
                .iter()
                .map(|&col| TileIndex::new(col, row))
                .collect()
        })
        .collect();

    Ok(TileIndexGrid { rows })
}

/// Render `tile` shifted by `shift`, borrowing pixels from `neighbors`.
///
/// Stitching the neighbor windows together is not implemented; after
/// validating its inputs this always returns
/// [`Error::UnimplementedGeometry`] so that callers never receive a
/// partially stitched tile.
pub fn shift_tile<T: RasterElement>(
    tile: &Raster<T>,
    shift: ShiftVector,
    neighbors: &HashMap<TileIndex, Raster<T>>,
) -> Result<Raster<T>> {
    let grid = tile_index_range(shift)?;

    for index in grid.iter().filter(|&i| i != TileIndex::ORIGIN) {
        if let Some(neighbor) = neighbors.get(&index) {
            if neighbor.spatial_shape() != tile.spatial_shape() {
                return Err(Error::InvalidParameter {
                    name: "neighbors",
                    value: format!("({}, {})", index.col, index.row),
                    reason: format!(
                        "neighbor shape {:?} differs from tile shape {:?}",
                        neighbor.spatial_shape(),
                        tile.spatial_shape()
                    ),
                });
            }
        }
    }

    Err(Error::UnimplementedGeometry("stitching of shifted tile views"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(col: f64, row: f64) -> TileIndexGrid {
        tile_index_range(ShiftVector::new(col, row)).unwrap()
    }

    #[test]
    fn test_symmetric_ceil() {
        assert_eq!(symmetric_ceil(1.3).unwrap(), 2);
        assert_eq!(symmetric_ceil(-1.3).unwrap(), -2);
        assert_eq!(symmetric_ceil(2.0).unwrap(), 2);
        assert_eq!(symmetric_ceil(-1.0).unwrap(), -1);
        assert_eq!(symmetric_ceil(0.0).unwrap(), 0);
        assert_eq!(symmetric_ceil(-0.0).unwrap(), 0);
        assert_eq!(symmetric_ceil(0.01).unwrap(), 1);
    }

    #[test]
    fn test_symmetric_ceil_rejects_unrepresentable() {
        assert!(symmetric_ceil(1e300).is_err());
        assert!(symmetric_ceil(-1e19).is_err());
        assert!(symmetric_ceil(f64::NAN).is_err());
        assert_eq!(symmetric_ceil(-4.0e18).unwrap(), -4_000_000_000_000_000_000);
    }

    #[test]
    fn test_inclusive_range_direction() {
        assert_eq!(inclusive_range(0, 2), vec![0, 1, 2]);
        assert_eq!(inclusive_range(0, -2), vec![0, -1, -2]);
        assert_eq!(inclusive_range(0, 0), vec![0]);
    }

    #[test]
    fn test_zero_shift_is_origin_only() {
        let g = grid(0.0, 0.0);
        assert_eq!(g.iter().collect::<Vec<_>>(), vec![TileIndex::ORIGIN]);
        assert_eq!(g.shape(), (1, 1));
    }

    #[test]
    fn test_fractional_positive_column_shift() {
        let g = grid(1.5, 0.0);
        assert_eq!(
            g.iter().collect::<Vec<_>>(),
            vec![TileIndex::new(0, 0), TileIndex::new(1, 0), TileIndex::new(2, 0)]
        );
    }

    #[test]
    fn test_fractional_negative_column_shift() {
        let g = grid(-1.2, 0.0);
        assert_eq!(g.column_offsets(), vec![0, -1, -2]);
        assert_eq!(g.row_offsets(), vec![0]);
    }

    #[test]
    fn test_integral_shift_on_both_axes() {
        let g = grid(2.0, -1.0);
        assert_eq!(g.shape(), (2, 3));
        assert_eq!(
            g.rows(),
            &[
                vec![TileIndex::new(0, 0), TileIndex::new(1, 0), TileIndex::new(2, 0)],
                vec![TileIndex::new(0, -1), TileIndex::new(1, -1), TileIndex::new(2, -1)],
            ]
        );
    }

    #[test]
    fn test_grid_always_contains_origin() {
        for &(c, r) in &[(0.3, -0.3), (-4.5, 2.2), (7.0, 0.0), (0.0, -0.0001)] {
            let g = grid(c, r);
            assert!(g.contains(TileIndex::ORIGIN));
            assert_eq!(g.iter().next(), Some(TileIndex::ORIGIN));
        }
    }

    #[test]
    fn test_row_major_ordering() {
        let g = grid(1.0, 1.0);
        let order: Vec<_> = (&g).into_iter().collect();
        assert_eq!(
            order,
            vec![
                TileIndex::new(0, 0),
                TileIndex::new(1, 0),
                TileIndex::new(0, 1),
                TileIndex::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_huge_finite_shift_rejected() {
        assert!(matches!(
            tile_index_range(ShiftVector::new(1e300, 0.0)),
            Err(Error::InvalidParameter { name: "col_shift", .. })
        ));
        assert!(matches!(
            tile_index_range(ShiftVector::new(0.0, -1e10)),
            Err(Error::InvalidParameter { name: "row_shift", .. })
        ));
        assert!(tile_index_range(ShiftVector::new(MAX_SHIFT + 0.5, 0.0)).is_err());
    }

    #[test]
    fn test_shift_at_limit_accepted() {
        let g = grid(-MAX_SHIFT, 0.0);
        assert_eq!(g.shape(), (1, MAX_SHIFT as usize + 1));
        assert_eq!(g.column_offsets().last(), Some(&-(MAX_SHIFT as i64)));
    }

    #[test]
    fn test_non_finite_shift_rejected() {
        assert!(matches!(
            tile_index_range(ShiftVector::new(f64::NAN, 0.0)),
            Err(Error::InvalidParameter { name: "col_shift", .. })
        ));
        assert!(tile_index_range(ShiftVector::new(0.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn test_shift_tile_is_explicitly_unimplemented() {
        let tile: Raster<u8> = Raster::new(4, 4, 3);
        let mut neighbors = HashMap::new();
        neighbors.insert(TileIndex::new(1, 0), Raster::new(4, 4, 3));

        let result = shift_tile(&tile, ShiftVector::new(0.5, 0.0), &neighbors);
        assert!(matches!(result, Err(Error::UnimplementedGeometry(_))));
    }

    #[test]
    fn test_shift_tile_checks_neighbor_shape_first() {
        let tile: Raster<u8> = Raster::new(4, 4, 3);
        let mut neighbors = HashMap::new();
        neighbors.insert(TileIndex::new(1, 0), Raster::new(2, 4, 3));

        let result = shift_tile(&tile, ShiftVector::new(0.5, 0.0), &neighbors);
        assert!(matches!(
            result,
            Err(Error::InvalidParameter { name: "neighbors", .. })
        ));
    }
}
