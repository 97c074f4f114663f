//! Day and night presets

use crate::gfx::{color::Color, lighting::LightIntensities, scene::Background};

pub const NIGHT_SKY: u32 = 0x0d1b2a;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Day,
    Night,
}

impl Mode {
    /// Maps a key to the mode it requests: `d` for day, `n` for night
    pub fn from_key(key: &str) -> Option<Mode> {
        match key.to_ascii_lowercase().as_str() {
            "d" => Some(Mode::Day),
            "n" => Some(Mode::Night),
            _ => None,
        }
    }

    /// The mode after pressing `key`; unrelated keys keep the current mode
    pub fn transition(self, key: &str) -> Mode {
        Mode::from_key(key).unwrap_or(self)
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Day => "Day Mode",
            Mode::Night => "Night Mode",
        }
    }
}

/// Everything a mode decides about the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeSettings {
    pub intensities: LightIntensities,
    pub background: Background,
    pub label: &'static str,
}

impl ModeSettings {
    /// Settings for `mode`; `day_background` is the skybox shown by day
    pub fn for_mode(mode: Mode, day_background: Background) -> Self {
        match mode {
            Mode::Day => Self {
                intensities: LightIntensities::DAY,
                background: day_background,
                label: mode.label(),
            },
            Mode::Night => Self {
                intensities: LightIntensities::NIGHT,
                background: Background::Color(Color::from_hex(NIGHT_SKY)),
                label: mode.label(),
            },
        }
    }
}
