use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named colors known to the palette.
///
/// The declaration order is the palette order: it fixes histogram positions
/// and the tie-break order used when classifying a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorName {
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Red,
    Brown,
    White,
    Grey,
    Black,
}

impl ColorName {
    pub const COUNT: usize = 11;

    /// Every color in palette order.
    pub const ALL: [ColorName; ColorName::COUNT] = [
        ColorName::Orange,
        ColorName::Yellow,
        ColorName::Green,
        ColorName::Blue,
        ColorName::Purple,
        ColorName::Pink,
        ColorName::Red,
        ColorName::Brown,
        ColorName::White,
        ColorName::Grey,
        ColorName::Black,
    ];

    /// Histogram position of this color.
    pub fn index(self) -> usize {
        match self {
            ColorName::Orange => 0,
            ColorName::Yellow => 1,
            ColorName::Green => 2,
            ColorName::Blue => 3,
            ColorName::Purple => 4,
            ColorName::Pink => 5,
            ColorName::Red => 6,
            ColorName::Brown => 7,
            ColorName::White => 8,
            ColorName::Grey => 9,
            ColorName::Black => 10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorName::Orange => "orange",
            ColorName::Yellow => "yellow",
            ColorName::Green => "green",
            ColorName::Blue => "blue",
            ColorName::Purple => "purple",
            ColorName::Pink => "pink",
            ColorName::Red => "red",
            ColorName::Brown => "brown",
            ColorName::White => "white",
            ColorName::Grey => "grey",
            ColorName::Black => "black",
        }
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColorName(pub String);

impl fmt::Display for UnknownColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown color name '{}'", self.0)
    }
}

impl std::error::Error for UnknownColorName {}

impl FromStr for ColorName {
    type Err = UnknownColorName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ColorName::ALL
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownColorName(s.to_string()))
    }
}
