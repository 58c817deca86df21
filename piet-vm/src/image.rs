use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;

use isa::color::Rgb;
use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::parser;
use crate::parser::ParseError;
use crate::pointer::Codel;

type Result<T> = std::result::Result<T, ImageError>;

/// Anything that can be addressed by [codel](Codel) coordinates and answers
/// with a raw color. Width and height are measured in codels.
pub trait PixelSource {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// The raw color of the given codel, or `None` if the codel lies outside
    /// the image.
    fn color_at(&self, codel: Codel) -> Option<Rgb>;

    fn contains(&self, codel: Codel) -> bool {
        let within = |coordinate: i32, bound: usize| {
            usize::try_from(coordinate).is_ok_and(|coordinate| coordinate < bound)
        };
        within(codel.x, self.width()) && within(codel.y, self.height())
    }
}

/// A rectangular grid of raw colors, one per pixel, stored row by row.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBitmap")]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

/// The unvalidated, deserialized form of a [`Bitmap`].
#[derive(Debug, Deserialize)]
struct RawBitmap {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

/// A [`Bitmap`] viewed at a coarser resolution: every codel is a square of
/// `codel_size` × `codel_size` pixels. The color of a codel is the color of its
/// top-left pixel.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCodelImage")]
pub struct CodelImage {
    bitmap: Bitmap,
    codel_size: usize,
}

/// The unvalidated, deserialized form of a [`CodelImage`].
#[derive(Debug, Deserialize)]
struct RawCodelImage {
    bitmap: Bitmap,
    codel_size: usize,
}

#[non_exhaustive]
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ImageError {
    #[error("program image must have at least one pixel")]
    Empty,

    #[error("program image of {width}×{height} pixels is too large")]
    TooLarge { width: usize, height: usize },

    #[error("expected {expected} pixels for a {width}×{height} image, but got {actual}")]
    PixelCountMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("row {row} has {actual} pixels, but the first row has {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("codel size must be positive")]
    ZeroCodelSize,

    #[error("codel size {codel_size} does not divide image dimensions {width}×{height}")]
    CodelSizeMismatch {
        codel_size: usize,
        width: usize,
        height: usize,
    },

    #[error("failed to parse program image:\n{0}")]
    Parse(String),
}

impl Bitmap {
    pub fn new(width: usize, height: usize, pixels: Vec<Rgb>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ImageError::Empty);
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(ImageError::TooLarge { width, height });
        }
        let expected = width
            .checked_mul(height)
            .ok_or(ImageError::TooLarge { width, height })?;
        if pixels.len() != expected {
            let actual = pixels.len();
            return Err(ImageError::PixelCountMismatch { width, height, expected, actual });
        }

        Ok(Self { width, height, pixels })
    }

    /// Build a bitmap from rows of raw colors. All rows must have the same
    /// length.
    pub fn from_rows<R, P>(rows: R) -> Result<Self>
    where
        R: IntoIterator<Item = P>,
        P: IntoIterator<Item = Rgb>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().collect_vec())
            .collect_vec();
        let Some(first_row) = rows.first() else {
            return Err(ImageError::Empty);
        };

        let expected = first_row.len();
        if let Some((row, ragged)) = rows.iter().find_position(|row| row.len() != expected) {
            let actual = ragged.len();
            return Err(ImageError::RaggedRows { row, expected, actual });
        }

        let height = rows.len();
        let pixels = rows.into_iter().flatten().collect();
        Self::new(expected, height, pixels)
    }

    /// Parse a bitmap from its textual form: one line per row, each row a
    /// whitespace-separated list of `RRGGBB` or `#RRGGBB` colors. Comments
    /// start with `//`.
    ///
    /// ```
    /// # use piet_vm::prelude::*;
    /// let bitmap = Bitmap::from_code(
    ///     "FF0000 FF0000 // two red pixels
    ///      000000 FFFF00",
    /// )
    /// .unwrap();
    /// assert_eq!(2, bitmap.width());
    /// assert_eq!(2, bitmap.height());
    /// ```
    pub fn from_code(code: &str) -> std::result::Result<Self, ParseError<'_>> {
        let rows = parser::parse(code)?;
        let width = rows.first().map_or(0, Vec::len);
        let height = rows.len();
        let pixels = rows.into_iter().flatten().collect();

        // the parser guarantees a non-empty, rectangular grid within coordinate range
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// The raw color at pixel coordinate `(x, y)`, or `None` if the coordinate
    /// lies outside the bitmap.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Rgb]> {
        self.pixels.chunks(self.width)
    }
}

impl PixelSource for Bitmap {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn color_at(&self, codel: Codel) -> Option<Rgb> {
        let x = usize::try_from(codel.x).ok()?;
        let y = usize::try_from(codel.y).ok()?;
        self.pixel(x, y)
    }
}

impl TryFrom<RawBitmap> for Bitmap {
    type Error = ImageError;

    fn try_from(raw: RawBitmap) -> Result<Self> {
        Self::new(raw.width, raw.height, raw.pixels)
    }
}

impl FromStr for Bitmap {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s).map_err(|err| ImageError::Parse(err.to_string()))
    }
}

impl Display for Bitmap {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for row in self.rows() {
            let row = row.iter().map(|rgb| format!("{:06X}", rgb.0)).join(" ");
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

impl CodelImage {
    pub fn new(bitmap: Bitmap, codel_size: usize) -> Result<Self> {
        if codel_size == 0 {
            return Err(ImageError::ZeroCodelSize);
        }
        let width = bitmap.width();
        let height = bitmap.height();
        if width % codel_size != 0 || height % codel_size != 0 {
            return Err(ImageError::CodelSizeMismatch { codel_size, width, height });
        }

        Ok(Self { bitmap, codel_size })
    }

    pub fn codel_size(&self) -> usize {
        self.codel_size
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn into_bitmap(self) -> Bitmap {
        self.bitmap
    }
}

impl From<Bitmap> for CodelImage {
    /// One pixel per codel.
    fn from(bitmap: Bitmap) -> Self {
        Self { bitmap, codel_size: 1 }
    }
}

impl PixelSource for CodelImage {
    fn width(&self) -> usize {
        self.bitmap.width() / self.codel_size
    }

    fn height(&self) -> usize {
        self.bitmap.height() / self.codel_size
    }

    fn color_at(&self, codel: Codel) -> Option<Rgb> {
        if !self.contains(codel) {
            return None;
        }
        let x = usize::try_from(codel.x).ok()? * self.codel_size;
        let y = usize::try_from(codel.y).ok()? * self.codel_size;
        self.bitmap.pixel(x, y)
    }
}

impl TryFrom<RawCodelImage> for CodelImage {
    type Error = ImageError;

    fn try_from(raw: RawCodelImage) -> Result<Self> {
        Self::new(raw.bitmap, raw.codel_size)
    }
}

impl FromStr for CodelImage {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self> {
        Bitmap::from_str(s).map(Self::from)
    }
}
