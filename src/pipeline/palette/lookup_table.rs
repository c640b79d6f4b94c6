use image::Rgb;
use std::path::Path;

use super::{ColorProbability, Palette};
use crate::error::PaletteError;
use crate::pipeline::types::ColorName;

pub const BINS_PER_CHANNEL: usize = 32;
pub const TABLE_SIZE: usize = BINS_PER_CHANNEL * BINS_PER_CHANNEL * BINS_PER_CHANNEL;

const BIN_WIDTH: usize = 256 / BINS_PER_CHANNEL;
const COLUMNS: usize = 3 + ColorName::COUNT;

/// Palette backed by a pre-trained table of color-name probabilities per
/// quantized RGB bin.
///
/// Each table line reads `r g b p_0 .. p_10`: a representative RGB value of
/// the bin followed by one probability per color in palette order.
pub struct LookupTablePalette {
    table: Vec<[f32; ColorName::COUNT]>,
}

impl LookupTablePalette {
    pub fn load(path: &Path) -> Result<Self, PaletteError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PaletteError::ReadError(e, path.to_path_buf()))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, PaletteError> {
        let mut table: Vec<Option<[f32; ColorName::COUNT]>> = vec![None; TABLE_SIZE];

        for (line_index, raw_line) in contents.lines().enumerate() {
            let line_number = line_index + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != COLUMNS {
                return Err(PaletteError::ParseError {
                    line: line_number,
                    reason: format!("expected {} columns, found {}", COLUMNS, fields.len()),
                });
            }

            let mut channels = [0usize; 3];
            for (channel, field) in channels.iter_mut().zip(&fields[..3]) {
                *channel = parse_channel(field).ok_or_else(|| PaletteError::ParseError {
                    line: line_number,
                    reason: format!("invalid channel value '{}'", field),
                })?;
            }

            let mut probabilities = [0f32; ColorName::COUNT];
            for (probability, field) in probabilities.iter_mut().zip(&fields[3..]) {
                *probability = field
                    .parse::<f32>()
                    .ok()
                    .filter(|p| p.is_finite() && *p >= 0.0)
                    .ok_or_else(|| PaletteError::ParseError {
                        line: line_number,
                        reason: format!("invalid probability '{}'", field),
                    })?;
            }

            let bin = bin_index(channels[0], channels[1], channels[2]);
            if table[bin].replace(probabilities).is_some() {
                return Err(PaletteError::ParseError {
                    line: line_number,
                    reason: format!(
                        "bin ({}, {}, {}) defined twice",
                        channels[0], channels[1], channels[2]
                    ),
                });
            }
        }

        let found = table.iter().filter(|entry| entry.is_some()).count();
        if found != TABLE_SIZE {
            return Err(PaletteError::IncompleteTable {
                found,
                expected: TABLE_SIZE,
            });
        }

        Ok(Self {
            table: table.into_iter().flatten().collect(),
        })
    }
}

fn parse_channel(field: &str) -> Option<usize> {
    let value = field.parse::<f64>().ok()?;
    if !(0.0..=255.0).contains(&value) {
        return None;
    }
    Some(value.floor() as usize)
}

fn bin_index(r: usize, g: usize, b: usize) -> usize {
    r / BIN_WIDTH + BINS_PER_CHANNEL * (g / BIN_WIDTH)
        + BINS_PER_CHANNEL * BINS_PER_CHANNEL * (b / BIN_WIDTH)
}

impl Palette for LookupTablePalette {
    fn classify(&self, sample: Rgb<u8>) -> Vec<ColorProbability> {
        let Rgb([r, g, b]) = sample;
        let probabilities = &self.table[bin_index(r as usize, g as usize, b as usize)];
        ColorName::ALL
            .into_iter()
            .zip(probabilities.iter())
            .map(|(color, &probability)| ColorProbability::new(color, probability))
            .collect()
    }

    fn name(&self) -> &'static str {
        "lookup_table"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Table that calls every bin with a dominant red channel "red", every
    /// bin with a dominant blue channel "blue", and everything else "grey".
    pub(crate) fn channel_table() -> String {
        let mut contents = String::from("# r g b orange yellow green blue purple pink red brown white grey black\n");
        for b in 0..BINS_PER_CHANNEL {
            for g in 0..BINS_PER_CHANNEL {
                for r in 0..BINS_PER_CHANNEL {
                    let mut probabilities = [0.0f32; ColorName::COUNT];
                    let winner = if r > g && r > b {
                        ColorName::Red
                    } else if b > r && b > g {
                        ColorName::Blue
                    } else {
                        ColorName::Grey
                    };
                    probabilities[winner.index()] = 0.9;
                    probabilities[ColorName::Black.index()] += 0.1;
                    let columns: Vec<String> = probabilities.iter().map(|p| p.to_string()).collect();
                    contents.push_str(&format!(
                        "{} {} {} {}\n",
                        r * BIN_WIDTH,
                        g * BIN_WIDTH,
                        b * BIN_WIDTH,
                        columns.join(" ")
                    ));
                }
            }
        }
        contents
    }

    #[test]
    fn test_classifies_through_the_table() {
        let palette = LookupTablePalette::parse(&channel_table()).unwrap();
        assert_eq!(palette.dominant(Rgb([250, 10, 10])), Some(ColorName::Red));
        assert_eq!(palette.dominant(Rgb([10, 10, 250])), Some(ColorName::Blue));
        assert_eq!(palette.dominant(Rgb([128, 128, 128])), Some(ColorName::Grey));

        let probabilities = palette.classify(Rgb([250, 10, 10]));
        assert_eq!(probabilities.len(), ColorName::COUNT);
        assert_eq!(probabilities[0].color, ColorName::Orange);
    }

    #[test]
    fn test_incomplete_table_is_rejected() {
        let contents = "0 0 0 0 0 0 0 0 0 0 0 0 0 1\n";
        match LookupTablePalette::parse(contents) {
            Err(PaletteError::IncompleteTable { found, expected }) => {
                assert_eq!(found, 1);
                assert_eq!(expected, TABLE_SIZE);
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_malformed_lines_report_their_position() {
        let contents = "# header\n0 0 0 0.5\n";
        match LookupTablePalette::parse(contents) {
            Err(PaletteError::ParseError { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_duplicate_bins_are_rejected() {
        let contents = "0 0 0 0 0 0 0 0 0 0 0 0 0 1\n4 4 4 1 0 0 0 0 0 0 0 0 0 0\n";
        assert!(matches!(
            LookupTablePalette::parse(contents),
            Err(PaletteError::ParseError { line: 2, .. })
        ));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let result = LookupTablePalette::load(Path::new("/nonexistent/color_names.txt"));
        assert!(matches!(result, Err(PaletteError::ReadError(..))));
    }
}
