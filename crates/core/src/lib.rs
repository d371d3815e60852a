//! # tilecat Core
//!
//! Core types and I/O for tilecat, a toolkit for categorical map tiles.
//!
//! This crate provides:
//! - `Raster<T>`: band-interleaved raster grid with axes (row, col, band)
//! - PNG raster I/O, from paths or in-memory buffers
//! - Tile-grid geometry for addressing neighbor tiles under a shift

pub mod error;
pub mod io;
pub mod raster;
pub mod tile;

pub use error::{Error, Result};
pub use raster::{Raster, RasterElement};
pub use tile::{tile_index_range, ShiftVector, TileAddress, TileIndex, TileIndexGrid};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{Raster, RasterElement};
    pub use crate::tile::{tile_index_range, ShiftVector, TileIndex, TileIndexGrid};
}
