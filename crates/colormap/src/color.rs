//! Category colors and compositing order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tilecat_core::{Error, Result};

/// RGB color with components in [0, 1].
///
/// Serialized as a `[r, g, b]` triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const RED: Self = Self::new(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0);

    /// Components as an array, in R, G, B order
    pub fn to_array(self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
}

impl TryFrom<[f64; 3]> for Color {
    type Error = String;

    fn try_from([r, g, b]: [f64; 3]) -> std::result::Result<Self, Self::Error> {
        if [r, g, b].iter().all(|c| (0.0..=1.0).contains(c)) {
            Ok(Self { r, g, b })
        } else {
            Err(format!("color components must lie in [0, 1], got [{r}, {g}, {b}]"))
        }
    }
}

impl From<Color> for [f64; 3] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parse `"r,g,b"`, e.g. `"0,0,1"` for blue.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidParameter {
            name: "color",
            value: s.to_string(),
            reason,
        };

        let components = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| invalid(e.to_string()))?;

        let triple: [f64; 3] = components
            .try_into()
            .map_err(|v: Vec<f64>| invalid(format!("expected 3 components, got {}", v.len())))?;

        Color::try_from(triple).map_err(invalid)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// One color per category band, in band order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorAssignment(Vec<Color>);

impl ColorAssignment {
    pub fn new(colors: Vec<Color>) -> Self {
        Self(colors)
    }

    /// Four-category default for water, greenery, roads and buildings:
    /// blue, green, white, red.
    pub fn standard() -> Self {
        Self(vec![Color::BLUE, Color::GREEN, Color::WHITE, Color::RED])
    }

    /// Parse a list of `"r,g,b"` strings.
    pub fn parse_list<S: AsRef<str>>(items: &[S]) -> Result<Self> {
        items
            .iter()
            .map(|s| s.as_ref().parse::<Color>())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, channel: usize) -> Option<Color> {
        self.0.get(channel).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Color> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Color] {
        &self.0
    }
}

impl Default for ColorAssignment {
    fn default() -> Self {
        Self::standard()
    }
}

impl FromIterator<Color> for ColorAssignment {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Order in which category bands are composited.
///
/// The last composited layer ends up on top, so the order decides which
/// category occludes which (e.g. buildings over roads).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeOrder {
    /// Band 0 is composited first and sits at the bottom
    #[default]
    Forward,
    /// Band 0 is composited last and sits on top
    Reverse,
}

impl CompositeOrder {
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse {
            Self::Reverse
        } else {
            Self::Forward
        }
    }

    /// Band indices of an `n`-band raster in processing order
    pub fn channel_sequence(self, n: usize) -> Vec<usize> {
        match self {
            Self::Forward => (0..n).collect(),
            Self::Reverse => (0..n).rev().collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
        }
    }
}

impl FromStr for CompositeOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "forward" => Ok(Self::Forward),
            "reverse" => Ok(Self::Reverse),
            _ => Err(Error::InvalidParameter {
                name: "order",
                value: s.to_string(),
                reason: "expected `forward` or `reverse`".to_string(),
            }),
        }
    }
}

impl fmt::Display for CompositeOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
