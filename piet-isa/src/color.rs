use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::str::FromStr;

use arbitrary::Arbitrary;
use serde::Deserialize;
use serde::Serialize;
use strum::EnumCount;
use strum::EnumIter;
use thiserror::Error;

/// A raw, 24-bit color value of the form `0xRRGGBB`.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    Arbitrary,
)]
#[serde(transparent)]
pub struct Rgb(pub u32);

/// The hue cycle. Stepping forward goes red → yellow → green → cyan → blue
/// → magenta → red.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    EnumCount,
    EnumIter,
    Serialize,
    Deserialize,
    Arbitrary,
)]
pub enum Hue {
    Red,
    Yellow,
    Green,
    Cyan,
    Blue,
    Magenta,
}

/// The lightness cycle. Stepping forward goes light → normal → dark → light.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    EnumCount,
    EnumIter,
    Serialize,
    Deserialize,
    Arbitrary,
)]
pub enum Lightness {
    Light,
    Normal,
    Dark,
}

/// The semantic category of a codel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Arbitrary)]
pub enum Color {
    /// Blocks the instruction pointer.
    Black,

    /// Lets the instruction pointer slide across without executing anything.
    White,

    Chromatic { hue: Hue, lightness: Lightness },
}

/// How to classify raw colors that are not part of the palette.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Arbitrary)]
pub enum UnknownColorPolicy {
    #[default]
    White,
    Black,
}

#[non_exhaustive]
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ParseRgbError {
    #[error("color `{0}` must have exactly 6 hexadecimal digits")]
    WrongLength(String),

    #[error("color `{0}` contains a non-hexadecimal digit")]
    InvalidDigit(String),
}

/// Maps raw colors to [semantic colors](Color), and pairs of semantic colors
/// to instruction indices.
pub trait ColorClassifier {
    fn classify(&self, raw: Rgb) -> Color;

    /// The index of the instruction encoded by the transition from color
    /// `from` to color `to`, or `None` if either color is black or white.
    ///
    /// The index is `3 · hue_steps + lightness_steps`, where both step counts
    /// are measured forward along their respective cycle. Hence, the index is
    /// always smaller than 18, and 0 if and only if the colors are equal.
    fn instruction_index(&self, from: Color, to: Color) -> Option<u8> {
        let Color::Chromatic { hue: from_hue, lightness: from_lightness } = from else {
            return None;
        };
        let Color::Chromatic { hue: to_hue, lightness: to_lightness } = to else {
            return None;
        };
        let hue_steps = from_hue.steps_to(to_hue);
        let lightness_steps = from_lightness.steps_to(to_lightness);
        Some(hue_steps * Lightness::COUNT as u8 + lightness_steps)
    }
}

/// The 18 chromatic colors of the language, as raw values. Indexed by lightness, then
/// hue.
const CHROMATIC_PALETTE: [[u32; Hue::COUNT]; Lightness::COUNT] = [
    [0xFF_C0C0, 0xFF_FFC0, 0xC0_FFC0, 0xC0_FFFF, 0xC0_C0FF, 0xFF_C0FF],
    [0xFF_0000, 0xFF_FF00, 0x00_FF00, 0x00_FFFF, 0x00_00FF, 0xFF_00FF],
    [0xC0_0000, 0xC0_C000, 0x00_C000, 0x00_C0C0, 0x00_00C0, 0xC0_00C0],
];

const WHITE: u32 = 0xFF_FFFF;
const BLACK: u32 = 0x00_0000;

/// The palette defined by the language: 6 hues in 3 lightnesses each, plus
/// black and white.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Arbitrary)]
pub struct StandardPalette {
    pub unknown_colors: UnknownColorPolicy,
}

impl StandardPalette {
    pub fn new(unknown_colors: UnknownColorPolicy) -> Self {
        Self { unknown_colors }
    }
}

impl ColorClassifier for StandardPalette {
    fn classify(&self, raw: Rgb) -> Color {
        match raw.0 {
            WHITE => return Color::White,
            BLACK => return Color::Black,
            _ => (),
        }

        for (lightness, row) in CHROMATIC_PALETTE.iter().enumerate() {
            if let Some(hue) = row.iter().position(|&value| value == raw.0) {
                let hue = Hue::from_cycle_position(hue);
                let lightness = Lightness::from_cycle_position(lightness);
                return Color::Chromatic { hue, lightness };
            }
        }

        match self.unknown_colors {
            UnknownColorPolicy::White => Color::White,
            UnknownColorPolicy::Black => Color::Black,
        }
    }
}

impl Hue {
    const CYCLE: [Hue; Hue::COUNT] = [
        Hue::Red,
        Hue::Yellow,
        Hue::Green,
        Hue::Cyan,
        Hue::Blue,
        Hue::Magenta,
    ];

    fn cycle_position(self) -> u8 {
        self as u8
    }

    fn from_cycle_position(position: usize) -> Self {
        Self::CYCLE[position % Hue::COUNT]
    }

    /// The number of forward steps along the hue cycle to get from `self` to
    /// `other`.
    pub fn steps_to(self, other: Self) -> u8 {
        let count = Hue::COUNT as u8;
        (other.cycle_position() + count - self.cycle_position()) % count
    }

    pub const fn name(self) -> &'static str {
        match self {
            Hue::Red => "red",
            Hue::Yellow => "yellow",
            Hue::Green => "green",
            Hue::Cyan => "cyan",
            Hue::Blue => "blue",
            Hue::Magenta => "magenta",
        }
    }
}

impl Lightness {
    const CYCLE: [Lightness; Lightness::COUNT] =
        [Lightness::Light, Lightness::Normal, Lightness::Dark];

    fn cycle_position(self) -> u8 {
        self as u8
    }

    fn from_cycle_position(position: usize) -> Self {
        Self::CYCLE[position % Lightness::COUNT]
    }

    /// The number of forward steps along the lightness cycle to get from
    /// `self` to `other`.
    pub fn steps_to(self, other: Self) -> u8 {
        let count = Lightness::COUNT as u8;
        (other.cycle_position() + count - self.cycle_position()) % count
    }

    pub const fn name(self) -> &'static str {
        match self {
            Lightness::Light => "light",
            Lightness::Normal => "normal",
            Lightness::Dark => "dark",
        }
    }
}

impl Color {
    pub fn is_black(self) -> bool {
        self == Color::Black
    }

    pub fn is_white(self) -> bool {
        self == Color::White
    }

    pub fn is_chromatic(self) -> bool {
        matches!(self, Color::Chromatic { .. })
    }

    /// The canonical raw value of this color in the [`StandardPalette`].
    pub fn to_rgb(self) -> Rgb {
        match self {
            Color::Black => Rgb(BLACK),
            Color::White => Rgb(WHITE),
            Color::Chromatic { hue, lightness } => {
                let row = CHROMATIC_PALETTE[usize::from(lightness.cycle_position())];
                Rgb(row[usize::from(hue.cycle_position())])
            }
        }
    }
}

impl Rgb {
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl From<u32> for Rgb {
    fn from(value: u32) -> Self {
        Self(value & 0xFF_FFFF)
    }
}

impl From<Color> for Rgb {
    fn from(color: Color) -> Self {
        color.to_rgb()
    }
}

impl FromStr for Rgb {
    type Err = ParseRgbError;

    /// Parse `RRGGBB` or `#RRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 {
            return Err(ParseRgbError::WrongLength(s.to_string()));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseRgbError::InvalidDigit(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Rgb)
            .map_err(|_| ParseRgbError::InvalidDigit(s.to_string()))
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "#{:06X}", self.0)
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
            Color::Chromatic { hue, lightness: Lightness::Normal } => write!(f, "{}", hue.name()),
            Color::Chromatic { hue, lightness } => {
                write!(f, "{} {}", lightness.name(), hue.name())
            }
        }
    }
}
