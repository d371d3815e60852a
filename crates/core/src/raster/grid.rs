//! Main Raster type

use crate::error::{Error, Result};
use crate::raster::{RasterElement, RGBA_BANDS};
use ndarray::{s, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};
use std::ops::Range;

/// A multi-band raster grid.
///
/// `Raster<T>` stores values of type `T` in a 3D array with axes
/// (row, col, band). A single-category tile has one band, a stacked
/// categorical tile has one band per category and a composited tile has
/// four (R, G, B, A).
///
/// # Example
///
/// ```ignore
/// use tilecat_core::Raster;
///
/// // A 256x256 tile with four category bands
/// let mut raster: Raster<f64> = Raster::new(256, 256, 4);
///
/// raster.set(10, 20, 3, 0.75)?;
/// let value = raster.get(10, 20, 3)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T: RasterElement> {
    /// Raster data stored in row-major order (row, col, band)
    data: Array3<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize, bands: usize) -> Self {
        Self {
            data: Array3::zeros((rows, cols, bands)),
        }
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, bands: usize, value: T) -> Self {
        Self {
            data: Array3::from_elem((rows, cols, bands), value),
        }
    }

    /// Create a raster from band-interleaved data
    /// (`data[(row * cols + col) * bands + band]`)
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize, bands: usize) -> Result<Self> {
        if data.len() != rows * cols * bands {
            return Err(Error::InvalidDimensions { rows, cols, bands });
        }

        let array = Array3::from_shape_vec((rows, cols, bands), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self { data: array })
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array3<T>) -> Self {
        Self { data }
    }

    /// Create a single-band raster from a 2D array
    pub fn from_band(band: Array2<T>) -> Self {
        Self {
            data: band.insert_axis(Axis(2)),
        }
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    /// Number of bands
    pub fn bands(&self) -> usize {
        self.data.dim().2
    }

    /// Dimensions as (rows, cols, bands)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Spatial dimensions as (rows, cols)
    pub fn spatial_shape(&self) -> (usize, usize) {
        let (rows, cols, _) = self.data.dim();
        (rows, cols)
    }

    /// Total number of values across all bands
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the last band can be read as an alpha channel
    pub fn has_alpha(&self) -> bool {
        self.bands() == RGBA_BANDS
    }

    // Data access

    /// Get value at (row, col, band)
    pub fn get(&self, row: usize, col: usize, band: usize) -> Result<T> {
        self.data
            .get((row, col, band))
            .copied()
            .ok_or_else(|| self.out_of_bounds(row, col, band))
    }

    /// Set value at (row, col, band)
    pub fn set(&mut self, row: usize, col: usize, band: usize, value: T) -> Result<()> {
        let err = self.out_of_bounds(row, col, band);
        match self.data.get_mut((row, col, band)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(err),
        }
    }

    /// All band values of the pixel at (row, col)
    pub fn pixel(&self, row: usize, col: usize) -> Result<ArrayView1<'_, T>> {
        if row >= self.rows() || col >= self.cols() {
            return Err(self.out_of_bounds(row, col, 0));
        }
        Ok(self.data.slice(s![row, col, ..]))
    }

    /// View of a single band
    pub fn band(&self, band: usize) -> Result<ArrayView2<'_, T>> {
        self.check_band(band)?;
        Ok(self.data.index_axis(Axis(2), band))
    }

    /// Copy a single band into a new one-band raster
    pub fn band_raster(&self, band: usize) -> Result<Raster<T>> {
        Ok(Raster::from_band(self.band(band)?.to_owned()))
    }

    /// Copy a contiguous range of bands into a new raster
    pub fn select_bands(&self, bands: Range<usize>) -> Result<Raster<T>> {
        if bands.start > bands.end {
            return Err(Error::InvalidParameter {
                name: "bands",
                value: format!("{}..{}", bands.start, bands.end),
                reason: "range start exceeds end".to_string(),
            });
        }
        if bands.end > self.bands() {
            return Err(Error::BandOutOfRange {
                band: bands.end.saturating_sub(1),
                bands: self.bands(),
            });
        }
        Ok(Raster::from_array(
            self.data.slice(s![.., .., bands]).to_owned(),
        ))
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayView3<'_, T> {
        self.data.view()
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array3<T> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array3<T> {
        &mut self.data
    }

    /// Consume the raster and return the underlying array
    pub fn into_array(self) -> Array3<T> {
        self.data
    }

    fn check_band(&self, band: usize) -> Result<()> {
        if band >= self.bands() {
            return Err(Error::BandOutOfRange {
                band,
                bands: self.bands(),
            });
        }
        Ok(())
    }

    fn out_of_bounds(&self, row: usize, col: usize, band: usize) -> Error {
        let (rows, cols, bands) = self.shape();
        Error::IndexOutOfBounds {
            row,
            col,
            band,
            rows,
            cols,
            bands,
        }
    }
}

impl Raster<u8> {
    /// Rescale 8-bit samples into unit intensities (`v / 255`)
    pub fn to_unit(&self) -> Raster<f64> {
        Raster::from_array(self.data.mapv(|v| v as f64 / 255.0))
    }
}

impl Raster<f64> {
    /// Rescale unit intensities into 8-bit samples.
    ///
    /// Values are rounded and saturate at 0 and 255; NaN maps to 0.
    pub fn to_u8(&self) -> Raster<u8> {
        Raster::from_array(
            self.data
                .mapv(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8),
        )
    }

    /// Clamp every value into [0, 1]
    pub fn clamp_unit(&self) -> Raster<f64> {
        Raster::from_array(self.data.mapv(|v| v.clamp(0.0, 1.0)))
    }
}
