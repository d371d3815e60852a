//! Tile-grid geometry
//!
//! Integer addressing of neighbor tiles under fractional shifts, and
//! parsing of `{zoom}_{x}_{y}` tile names.

mod address;
mod shift;

pub use address::TileAddress;
pub use shift::{
    inclusive_range, shift_tile, symmetric_ceil, tile_index_range, ShiftVector, TileIndex,
    TileIndexGrid, MAX_SHIFT,
};
