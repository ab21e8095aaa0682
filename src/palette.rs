//! Everactive data visualization color palette.

use std::fmt;
use std::str::FromStr;

use crate::error::{EveractiveError, Result};

/// Intensity used when none is given.
pub const DEFAULT_INTENSITY: u8 = 100;

/// Intensity levels every palette color comes in, in percent.
pub const INTENSITIES: [u8; 10] = [20, 25, 33, 40, 50, 60, 67, 75, 80, 100];

/// A palette color.
///
/// # Example
///
/// ```
/// use everactive::Color;
///
/// assert_eq!(Color::Violet.hex(None).unwrap(), "#9519B7");
/// assert_eq!(Color::Violet.hex(Some(50)).unwrap(), "#CA8CDB");
/// assert!(Color::Violet.hex(Some(45)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Violet,
    Sky,
    Midnight,
    Chartreuse,
    DarkTeal,
    Sand,
    Charcoal,
    Apricot,
}

impl Color {
    /// Every palette color.
    pub const ALL: [Color; 8] = [
        Color::Violet,
        Color::Sky,
        Color::Midnight,
        Color::Chartreuse,
        Color::DarkTeal,
        Color::Sand,
        Color::Charcoal,
        Color::Apricot,
    ];

    /// Snake-case name of the color.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Violet => "violet",
            Self::Sky => "sky",
            Self::Midnight => "midnight",
            Self::Chartreuse => "chartreuse",
            Self::DarkTeal => "dark_teal",
            Self::Sand => "sand",
            Self::Charcoal => "charcoal",
            Self::Apricot => "apricot",
        }
    }

    /// Hex code of the color at `intensity` percent (default 100).
    ///
    /// # Errors
    ///
    /// Returns [`EveractiveError::InvalidArgument`] if the intensity is not
    /// one of [`INTENSITIES`].
    pub fn hex(&self, intensity: Option<u8>) -> Result<&'static str> {
        let intensity = intensity.unwrap_or(DEFAULT_INTENSITY);
        let index = INTENSITIES
            .iter()
            .position(|&level| level == intensity)
            .ok_or_else(|| {
                EveractiveError::InvalidArgument(format!(
                    "color {} at intensity {intensity} does not exist in palette",
                    self.name()
                ))
            })?;
        Ok(self.shades()[index])
    }

    /// Hex codes ordered like [`INTENSITIES`].
    fn shades(&self) -> &'static [&'static str; 10] {
        match self {
            Self::Violet => &[
                "#EAD1F1", "#E4C5ED", "#DCB3E7", "#D5A3E2", "#CA8CDB", "#BF75D4", "#B865CF",
                "#AF52C9", "#AA47C5", "#9519B7",
            ],
            Self::Sky => &[
                "#CCF4FF", "#BFF1FF", "#ABEDFF", "#99E9FF", "#80E3FF", "#66DEFF", "#54DAFF",
                "#40D5FF", "#33D3FF", "#00C8FF",
            ],
            Self::Midnight => &[
                "#D7D6E4", "#CDCBDD", "#BDBBD2", "#AFADC9", "#9B98BB", "#8783AD", "#7975A4",
                "#696499", "#5F5A92", "#373177",
            ],
            Self::Chartreuse => &[
                "#EDF7D0", "#E8F5C5", "#E1F2B2", "#DBF0A2", "#D2EC8A", "#C9E873", "#C2E563",
                "#BBE250", "#B7E044", "#A4D916",
            ],
            Self::DarkTeal => &[
                "#CDE1E8", "#C0DAE2", "#ACCED9", "#9BC4D1", "#82B5C5", "#69A6BA", "#579CB1",
                "#4390A8", "#3688A2", "#046B8B",
            ],
            Self::Sand => &[
                "#EDE1C8", "#E4D7BB", "#DACCAF", "#D4C4A1", "#D2C5A9", "#BFAF90", "#BFB5A1",
                "#BFAF90", "#B7AD9A", "#A89E88",
            ],
            Self::Charcoal => &[
                "#D2D2D2", "#C7C7C7", "#B5B5B5", "#A5A5A5", "#8F8F8F", "#797979", "#696969",
                "#575757", "#4C4C4C", "#1F1F1F",
            ],
            Self::Apricot => &[
                "#FBEBDD", "#F9E6D4", "#F8DEC6", "#F6D7BA", "#F4CDA9", "#F2C498", "#F0BD8C",
                "#EEB57E", "#EDB075", "#E99C53",
            ],
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = EveractiveError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|color| color.name() == normalized)
            .ok_or_else(|| EveractiveError::InvalidArgument(format!("unknown palette color '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_intensity_is_full() {
        assert_eq!(Color::Sky.hex(None).unwrap(), "#00C8FF");
        assert_eq!(Color::Sky.hex(Some(100)).unwrap(), "#00C8FF");
    }

    #[test]
    fn test_every_color_has_every_intensity() {
        for color in Color::ALL {
            for intensity in INTENSITIES {
                let hex = color.hex(Some(intensity)).unwrap();
                assert!(hex.starts_with('#') && hex.len() == 7, "{color} {intensity}: {hex}");
            }
        }
    }

    #[test]
    fn test_unknown_intensity() {
        let err = Color::Apricot.hex(Some(90)).unwrap_err();
        assert!(matches!(err, EveractiveError::InvalidArgument(_)));
        assert!(err.to_string().contains("apricot at intensity 90"));
    }

    #[test]
    fn test_parse_color_names() {
        assert_eq!("dark_teal".parse::<Color>().unwrap(), Color::DarkTeal);
        assert_eq!("Dark Teal".parse::<Color>().unwrap(), Color::DarkTeal);
        assert_eq!("midnight".parse::<Color>().unwrap(), Color::Midnight);
        assert!("magenta".parse::<Color>().is_err());
    }

    #[test]
    fn test_dark_teal_shades() {
        assert_eq!(Color::DarkTeal.hex(Some(33)).unwrap(), "#ACCED9");
        assert_eq!(Color::Charcoal.hex(Some(67)).unwrap(), "#696969");
    }
}
