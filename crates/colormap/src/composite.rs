//! Stacking and alpha compositing of categorical rasters.
//!
//! All compositing works on unit intensities (`Raster<f64>` with values in
//! [0, 1]) and straight (non-premultiplied) RGBA. Values are never clamped
//! here; use [`Raster::clamp_unit`] or [`Raster::to_u8`] at the storage
//! boundary.

use crate::color::{Color, ColorAssignment, CompositeOrder};
use ndarray::{concatenate, Array3, ArrayView2, Axis, Zip};
use tilecat_core::raster::{RGBA_BANDS, RGB_BANDS};
use tilecat_core::{Error, Raster, RasterElement, Result};

/// Stack rasters along the band axis, in the given order.
///
/// Every input must share the spatial shape of the first. Single-band
/// inputs contribute one band each, so stacking N category tiles yields
/// an N-band categorical raster.
pub fn stack<T: RasterElement>(rasters: &[Raster<T>]) -> Result<Raster<T>> {
    let first = rasters.first().ok_or(Error::EmptyInput("no rasters to stack"))?;
    let expected = first.spatial_shape();

    for (index, raster) in rasters.iter().enumerate().skip(1) {
        if raster.spatial_shape() != expected {
            return Err(Error::DimensionMismatch {
                index,
                expected,
                actual: raster.spatial_shape(),
            });
        }
    }

    let views: Vec<_> = rasters.iter().map(|r| r.view()).collect();
    let data = concatenate(Axis(2), &views).map_err(|e| Error::Other(e.to_string()))?;

    Ok(Raster::from_array(data))
}

/// Pick one band out of each input and stack the picks.
///
/// Per-category tiles usually arrive as RGB images with the category in a
/// single band; `(raster, band)` selects it.
pub fn stack_bands<T: RasterElement>(picks: &[(&Raster<T>, usize)]) -> Result<Raster<T>> {
    let bands = picks
        .iter()
        .map(|(raster, band)| raster.band_raster(*band))
        .collect::<Result<Vec<_>>>()?;
    stack(&bands)
}

/// The RGBA layer a single category contributes.
///
/// RGB is the category intensity times its color and alpha is the intensity
/// itself.
pub fn category_layer(raster: &Raster<f64>, channel: usize, color: Color) -> Result<Raster<f64>> {
    let band = raster.band(channel)?;
    Ok(Raster::from_array(paint(band, color)))
}

fn paint(band: ArrayView2<'_, f64>, color: Color) -> Array3<f64> {
    let (rows, cols) = band.dim();
    let mut layer = Array3::zeros((rows, cols, RGBA_BANDS));

    Zip::from(layer.lanes_mut(Axis(2)))
        .and(&band)
        .for_each(|mut px, &v| {
            px[0] = v * color.r;
            px[1] = v * color.g;
            px[2] = v * color.b;
            px[3] = v;
        });

    layer
}

/// Porter-Duff "over" on a single straight-alpha pixel.
#[inline]
fn blend_over(src: [f64; 4], dst: [f64; 4]) -> [f64; 4] {
    let src_a = src[3];
    let dst_a = dst[3];
    let out_a = src_a + dst_a * (1.0 - src_a);

    if out_a <= 0.0 {
        return [0.0; 4];
    }

    let blend = |s: f64, d: f64| (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;

    [
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        out_a,
    ]
}

fn require_alpha(raster: &Raster<f64>) -> Result<()> {
    if !raster.has_alpha() {
        return Err(Error::MissingAlphaChannel {
            bands: raster.bands(),
        });
    }
    Ok(())
}

/// Composite `top` over `bottom`. Both must be RGBA rasters of equal shape.
///
/// The pair is treated as the input sequence `[top, bottom]`: on a shape
/// mismatch the error names `bottom` as raster 1, with `top`'s shape as
/// the expected one.
pub fn over(top: &Raster<f64>, bottom: &Raster<f64>) -> Result<Raster<f64>> {
    require_alpha(top)?;
    require_alpha(bottom)?;
    if top.spatial_shape() != bottom.spatial_shape() {
        return Err(Error::DimensionMismatch {
            index: 1,
            expected: top.spatial_shape(),
            actual: bottom.spatial_shape(),
        });
    }

    let mut out = bottom.clone().into_array();
    Zip::from(out.lanes_mut(Axis(2)))
        .and(top.data().lanes(Axis(2)))
        .for_each(|mut dst, src| {
            let blended = blend_over(
                [src[0], src[1], src[2], src[3]],
                [dst[0], dst[1], dst[2], dst[3]],
            );
            for (d, b) in dst.iter_mut().zip(blended) {
                *d = b;
            }
        });

    Ok(Raster::from_array(out))
}

/// Composite an N-band categorical raster into a straight-alpha RGBA raster.
///
/// Each band `c` is painted with `colors[c]` (see [`category_layer`]) and
/// layered onto a fully transparent canvas with the "over" operator, in the
/// sequence given by `order`. The last layer composited is on top.
///
/// The resulting alpha at a pixel is `1 - Π(1 - v_c)`.
pub fn composite_to_rgba(
    raster: &Raster<f64>,
    colors: &ColorAssignment,
    order: CompositeOrder,
) -> Result<Raster<f64>> {
    let (rows, cols, bands) = raster.shape();
    if colors.len() != bands {
        return Err(Error::ChannelCountMismatch {
            colors: colors.len(),
            channels: bands,
        });
    }

    let sequence: Vec<(usize, Color)> = order
        .channel_sequence(bands)
        .into_iter()
        .map(|c| (c, colors.as_slice()[c]))
        .collect();

    let mut out = Array3::zeros((rows, cols, RGBA_BANDS));
    Zip::from(out.lanes_mut(Axis(2)))
        .and(raster.data().lanes(Axis(2)))
        .for_each(|mut px, categories| {
            let mut acc = [0.0; 4];
            for &(c, color) in &sequence {
                let v = categories[c];
                acc = blend_over([v * color.r, v * color.g, v * color.b, v], acc);
            }
            for (p, a) in px.iter_mut().zip(acc) {
                *p = a;
            }
        });

    Ok(Raster::from_array(out))
}

/// Flatten an RGBA raster onto an opaque background, returning RGB.
pub fn add_opaque_background(rgba: &Raster<f64>, background: Color) -> Result<Raster<f64>> {
    require_alpha(rgba)?;

    let (rows, cols, _) = rgba.shape();
    let bg = background.to_array();
    let mut out = Array3::zeros((rows, cols, RGB_BANDS));

    Zip::from(out.lanes_mut(Axis(2)))
        .and(rgba.data().lanes(Axis(2)))
        .for_each(|mut px, src| {
            let a = src[3];
            for band in 0..RGB_BANDS {
                px[band] = src[band] * a + bg[band] * (1.0 - a);
            }
        });

    Ok(Raster::from_array(out))
}

/// Discard the alpha band without blending.
///
/// Unlike [`add_opaque_background`] this keeps the straight colors of
/// partially transparent pixels as they are.
pub fn drop_alpha(rgba: &Raster<f64>) -> Result<Raster<f64>> {
    require_alpha(rgba)?;
    rgba.select_bands(0..RGB_BANDS)
}

/// Composite a categorical raster and flatten it onto black.
///
/// `reverse` selects [`CompositeOrder::Reverse`] over
/// [`CompositeOrder::Forward`].
pub fn to_display(
    raster: &Raster<f64>,
    colors: &ColorAssignment,
    reverse: bool,
) -> Result<Raster<f64>> {
    let rgba = composite_to_rgba(raster, colors, CompositeOrder::from_reverse(reverse))?;
    add_opaque_background(&rgba, Color::BLACK)
}
