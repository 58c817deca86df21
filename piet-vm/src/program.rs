use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use isa::color::Color;
use isa::color::ColorClassifier;
use isa::color::Rgb;
use isa::color::StandardPalette;

use crate::image::Bitmap;
use crate::image::CodelImage;
use crate::image::ImageError;
use crate::image::PixelSource;
use crate::parser::ParseError;
use crate::pointer::Codel;

/// A Piet program: an image together with the rules used to read colors off
/// it.
///
/// The program is immutable. Everything that changes during execution lives
/// in the [`VirtualMachine`](crate::vm::VirtualMachine).
#[derive(Debug, Clone)]
pub struct Program<S = CodelImage, K = StandardPalette> {
    id: ProgramId,
    image: S,
    classifier: K,
}

/// Identifies a program for the purpose of caching. Every call to
/// [`Program::new`] hands out a fresh id; clones share their original's id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(u64);

static NEXT_PROGRAM_ID: AtomicU64 = AtomicU64::new(0);

impl<S, K> Program<S, K>
where
    S: PixelSource,
    K: ColorClassifier,
{
    pub fn new(image: S, classifier: K) -> Self {
        let id = ProgramId(NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed));
        Self { id, image, classifier }
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn image(&self) -> &S {
        &self.image
    }

    pub fn classifier(&self) -> &K {
        &self.classifier
    }

    pub fn width(&self) -> usize {
        self.image.width()
    }

    pub fn height(&self) -> usize {
        self.image.height()
    }

    pub fn contains(&self, codel: Codel) -> bool {
        self.image.contains(codel)
    }

    pub fn raw_color_at(&self, codel: Codel) -> Option<Rgb> {
        self.image.color_at(codel)
    }

    /// The semantic color of the given codel, or `None` if the codel lies
    /// outside the image.
    pub fn color_at(&self, codel: Codel) -> Option<Color> {
        self.raw_color_at(codel)
            .map(|raw| self.classifier.classify(raw))
    }

    /// A codel is blocked if it lies outside the image or is black.
    pub fn is_blocked(&self, codel: Codel) -> bool {
        self.color_at(codel).is_none_or(Color::is_black)
    }

    pub fn is_white(&self, codel: Codel) -> bool {
        self.color_at(codel).is_some_and(Color::is_white)
    }

    /// The index of the instruction encoded by moving from codel `from` to
    /// codel `to`, if both are chromatic.
    pub fn instruction_index(&self, from: Codel, to: Codel) -> Option<u8> {
        let from = self.color_at(from)?;
        let to = self.color_at(to)?;
        self.classifier.instruction_index(from, to)
    }
}

impl<S: PartialEq, K: PartialEq> PartialEq for Program<S, K> {
    /// Programs are equal if their images and classifiers are, regardless of
    /// their ids.
    fn eq(&self, other: &Self) -> bool {
        self.image == other.image && self.classifier == other.classifier
    }
}

impl<S: Eq, K: Eq> Eq for Program<S, K> {}

impl Program {
    /// Parse a program from its textual form, using one pixel per codel and the
    /// standard palette. See [`Bitmap::from_code`] for the format.
    ///
    /// ```
    /// # use piet_vm::prelude::*;
    /// let program = Program::from_code("FF0000 FF0000 FFFF00").unwrap();
    /// assert_eq!(3, program.width());
    /// ```
    pub fn from_code(code: &str) -> Result<Self, ParseError<'_>> {
        let bitmap = Bitmap::from_code(code)?;
        Ok(Self::new(CodelImage::from(bitmap), StandardPalette::default()))
    }

    /// Build a program from rows of raw colors, using one pixel per codel and
    /// the standard palette.
    pub fn from_rows<R, P>(rows: R) -> Result<Self, ImageError>
    where
        R: IntoIterator<Item = P>,
        P: IntoIterator<Item = Rgb>,
    {
        let bitmap = Bitmap::from_rows(rows)?;
        Ok(Self::new(CodelImage::from(bitmap), StandardPalette::default()))
    }
}
