//! # tilecat Colormap
//!
//! Category colors and alpha compositing for categorical rasters.
//!
//! A categorical raster has one band per category, each holding the
//! category's presence in [0, 1]. [`composite_to_rgba`] paints every
//! category with its color and stacks the layers with the "over" operator;
//! [`to_display`] additionally flattens the result onto black.
//!
//! ## Usage
//!
//! ```ignore
//! use tilecat_colormap::{stack, to_display, ColorAssignment};
//!
//! let categories = stack(&[water, greenery, roads, buildings])?;
//! let rgb = to_display(&categories, &ColorAssignment::standard(), false)?;
//! ```

mod color;
mod composite;

pub use color::{Color, ColorAssignment, CompositeOrder};
pub use composite::{
    add_opaque_background, category_layer, composite_to_rgba, drop_alpha, over, stack,
    stack_bands, to_display,
};
