//! Raster data structures and operations

mod element;
mod grid;

pub use element::RasterElement;
pub use grid::Raster;

/// Number of bands in an RGBA raster
pub const RGBA_BANDS: usize = 4;

/// Number of bands in an RGB raster
pub const RGB_BANDS: usize = 3;
