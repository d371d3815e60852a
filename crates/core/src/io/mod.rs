//! I/O operations for reading and writing raster tiles

mod png;

pub use png::{read_band, read_png, read_png_from_buffer, write_png, write_png_to_buffer};
