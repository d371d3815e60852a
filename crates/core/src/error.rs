//! Error types for tilecat

use thiserror::Error;

/// Main error type for tilecat operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Image(String),

    #[error("Invalid raster dimensions: {rows}x{cols}x{bands}")]
    InvalidDimensions {
        rows: usize,
        cols: usize,
        bands: usize,
    },

    #[error("Index out of bounds: ({row}, {col}, {band}) in raster of shape ({rows}, {cols}, {bands})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        band: usize,
        rows: usize,
        cols: usize,
        bands: usize,
    },

    #[error("Band {band} out of range for raster with {bands} band(s)")]
    BandOutOfRange { band: usize, bands: usize },

    #[error("Raster {index} has shape ({}, {}), expected ({}, {})", actual.0, actual.1, expected.0, expected.1)]
    DimensionMismatch {
        /// Position of the offending raster in the input sequence
        index: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Color assignment has {colors} color(s) but raster has {channels} channel(s)")]
    ChannelCountMismatch { colors: usize, channels: usize },

    #[error("Raster has {bands} band(s), an alpha channel requires exactly 4")]
    MissingAlphaChannel { bands: usize },

    #[error("Not implemented: {0}")]
    UnimplementedGeometry(&'static str),

    #[error("Cannot encode a raster with {0} band(s) as an image")]
    UnsupportedBandCount(usize),

    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

/// Result type alias for tilecat operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_mismatch_message_names_both_shapes() {
        let err = Error::DimensionMismatch {
            index: 2,
            expected: (256, 256),
            actual: (128, 256),
        };
        assert_eq!(
            err.to_string(),
            "Raster 2 has shape (128, 256), expected (256, 256)"
        );
    }
}
