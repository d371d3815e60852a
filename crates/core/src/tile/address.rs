//! Slippy-map tile addresses
//!
//! Tile directories name files `{zoom}_{x}_{y}.{ext}`, e.g.
//! `15_15972_11340.png`. Neighbor lookup for a shifted view resolves a
//! [`TileIndex`] offset against such an address.

use super::shift::TileIndex;
use crate::error::{Error, Result};
use std::fmt;

/// Deepest zoom level whose grid side still fits in an `i64`
const MAX_ZOOM: u32 = 62;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileAddress {
    pub zoom: u32,
    /// Column in the zoom level's grid
    pub x: i64,
    /// Row in the zoom level's grid
    pub y: i64,
}

impl TileAddress {
    pub fn new(zoom: u32, x: i64, y: i64) -> Result<Self> {
        let address = Self { zoom, x, y };
        if zoom > MAX_ZOOM {
            return Err(invalid(&address.to_string(), "zoom level too deep"));
        }
        if !address.in_grid() {
            return Err(invalid(&address.to_string(), "tile lies outside its zoom level"));
        }
        Ok(address)
    }

    /// Parse a tile file name such as `15_15972_11340.png`.
    ///
    /// Any extension is accepted; the stem must be three `_`-separated
    /// integers.
    pub fn parse(file_name: &str) -> Result<Self> {
        let stem = file_name
            .rsplit_once('.')
            .map_or(file_name, |(stem, _)| stem);

        let parts: Vec<&str> = stem.split('_').collect();
        let [zoom, x, y] = parts.as_slice() else {
            return Err(invalid(file_name, "expected `{zoom}_{x}_{y}`"));
        };

        let zoom = zoom
            .parse::<u32>()
            .map_err(|e| invalid(file_name, &format!("zoom: {e}")))?;
        let x = x
            .parse::<i64>()
            .map_err(|e| invalid(file_name, &format!("x: {e}")))?;
        let y = y
            .parse::<i64>()
            .map_err(|e| invalid(file_name, &format!("y: {e}")))?;

        Self::new(zoom, x, y)
    }

    /// File name for this tile with the given extension (without the dot)
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self, extension)
    }

    /// Number of tiles along each axis at this zoom level
    pub fn tiles_per_axis(&self) -> i64 {
        1i64 << self.zoom
    }

    /// Address of the tile at `offset` from this one, or `None` when the
    /// neighbor falls off the edge of the zoom level's grid.
    pub fn offset(&self, offset: TileIndex) -> Option<TileAddress> {
        let neighbor = TileAddress {
            zoom: self.zoom,
            x: self.x.checked_add(offset.col)?,
            y: self.y.checked_add(offset.row)?,
        };
        neighbor.in_grid().then_some(neighbor)
    }

    fn in_grid(&self) -> bool {
        let side = self.tiles_per_axis();
        (0..side).contains(&self.x) && (0..side).contains(&self.y)
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.zoom, self.x, self.y)
    }
}

fn invalid(value: &str, reason: &str) -> Error {
    Error::InvalidParameter {
        name: "tile",
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tile_file_name() {
        let t = TileAddress::parse("15_15972_11340.png").unwrap();
        assert_eq!(t, TileAddress { zoom: 15, x: 15972, y: 11340 });
        assert_eq!(t.file_name("png"), "15_15972_11340.png");
        assert_eq!(TileAddress::parse("3_1_2").unwrap().x, 1);
    }

    #[test]
    fn parse_rejects_malformed_names() {
        assert!(TileAddress::parse("15_15972.png").is_err());
        assert!(TileAddress::parse("a_1_2.png").is_err());
        assert!(TileAddress::parse("1_2_3_4.png").is_err());
        // zoom 2 has a 4x4 grid
        assert!(TileAddress::parse("2_4_0.png").is_err());
    }

    #[test]
    fn neighbor_offsets() {
        let t = TileAddress::parse("4_5_5.png").unwrap();
        assert_eq!(
            t.offset(TileIndex::new(-2, 1)),
            Some(TileAddress { zoom: 4, x: 3, y: 6 })
        );
        assert_eq!(t.offset(TileIndex::ORIGIN), Some(t));
    }

    #[test]
    fn neighbors_off_the_grid_are_none() {
        let corner = TileAddress::parse("1_0_1.png").unwrap();
        assert_eq!(corner.offset(TileIndex::new(-1, 0)), None);
        assert_eq!(corner.offset(TileIndex::new(0, 1)), None);
        assert!(corner.offset(TileIndex::new(1, -1)).is_some());
    }
}
