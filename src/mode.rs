use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Lighting behaviour of the mouse during a recording.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Mode {
    #[strum(to_string = "nolight", serialize = "no-light")]
    NoLight,
    #[strum(serialize = "breath")]
    Breath,
    #[strum(to_string = "colorcycle", serialize = "color-cycle")]
    ColorCycle,
    #[strum(serialize = "flash")]
    Flash,
    #[strum(serialize = "unknown")]
    Unknown,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::NoLight => "No light",
            Mode::Breath => "Breath",
            Mode::ColorCycle => "Color cycle",
            Mode::Flash => "Flash",
            Mode::Unknown => "Unknown",
        }
    }

    pub fn color(&self) -> RGBColor {
        match self {
            Mode::NoLight => RGBColor(0x2E, 0x8B, 0x57),
            Mode::Breath => RGBColor(0x41, 0x69, 0xE1),
            Mode::ColorCycle => RGBColor(0xFF, 0x63, 0x47),
            Mode::Flash => RGBColor(0xFF, 0xD7, 0x00),
            Mode::Unknown => RGBColor(0x80, 0x80, 0x80),
        }
    }
}

/// Infer the mode from a file name or stem.
/// Case-insensitive substring search, the first matching mode wins.
pub fn detect_mode_from_filename(name: &str) -> Mode {
    let lower = name.to_lowercase();
    let has = |keys: &[&str]| keys.iter().any(|k| lower.contains(k));
    if has(&["nolight", "no light", "no_light", "無燈"]) {
        Mode::NoLight
    } else if has(&["breath", "呼吸"]) {
        Mode::Breath
    } else if has(&["colorcycle", "color cycle", "color", "彩色"]) {
        Mode::ColorCycle
    } else if has(&["flash", "閃爍"]) {
        Mode::Flash
    } else {
        Mode::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn detect_from_recording_names() {
        let cases = [
            ("MD103 No light 2025-10-02 0.csv", Mode::NoLight),
            ("MD103 Breath 2025-10-02 0.csv", Mode::Breath),
            ("MD103 Color cycle 2025-10-02 0.csv", Mode::ColorCycle),
            ("MD103 Flash 2025-10-02 0.csv", Mode::Flash),
            ("unknown_file.csv", Mode::Unknown),
        ];
        for (name, expected) in cases {
            assert_eq!(detect_mode_from_filename(name), expected, "{}", name);
        }
    }

    #[test]
    fn detect_is_case_insensitive() {
        assert_eq!(detect_mode_from_filename("test_NOLIGHT"), Mode::NoLight);
        assert_eq!(detect_mode_from_filename("test_breath"), Mode::Breath);
        assert_eq!(detect_mode_from_filename("test_COLORCYCLE"), Mode::ColorCycle);
        assert_eq!(detect_mode_from_filename("test_flash"), Mode::Flash);
        assert_eq!(detect_mode_from_filename("滑鼠 呼吸燈"), Mode::Breath);
    }

    #[test]
    fn parse_mode_names() {
        assert_eq!(Mode::from_str("Flash").unwrap(), Mode::Flash);
        assert_eq!(Mode::from_str("no-light").unwrap(), Mode::NoLight);
        assert!(Mode::from_str("disco").is_err());
        assert_eq!(Mode::iter().count(), 5);
        assert_eq!(Mode::ColorCycle.to_string(), "colorcycle");
    }
}
