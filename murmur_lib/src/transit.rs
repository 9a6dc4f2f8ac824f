use std::{fmt, str::FromStr};

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::options::OptionsError;

// Ridership-derived hourly brightness (0-255), index = hour 0-23
pub const BRIGHTNESS_123: [f32; 24] = [
    34., 16., 9., 6., 7., 25., 60., 114., 161., 126., 99., 102., 112., 124., 144., 182., 216.,
    255., 202., 137., 106., 100., 96., 59.,
];
pub const BRIGHTNESS_456: [f32; 24] = [
    21., 9., 5., 4., 6., 16., 35., 70., 95., 71., 60., 66., 76., 87., 106., 139., 162., 193.,
    148., 97., 71., 56., 48., 35.,
];
pub const BRIGHTNESS_NQR: [f32; 24] = [
    32., 16., 9., 6., 7., 19., 43., 78., 110., 93., 78., 86., 97., 110., 132., 170., 201., 241.,
    191., 132., 104., 95., 86., 56.,
];

/// The transit lines a flock can represent, each with its own colour and
/// ridership curve.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
pub enum Line {
    #[serde(rename = "123")]
    L123,
    #[serde(rename = "456")]
    L456,
    #[serde(rename = "nqr")]
    Nqr,
}

impl Line {
    /// Draw order of the flocks, back to front
    pub const ALL: [Line; 3] = [Line::L123, Line::L456, Line::Nqr];

    pub fn id(&self) -> &'static str {
        match self {
            Line::L123 => "123",
            Line::L456 => "456",
            Line::Nqr => "nqr",
        }
    }

    /// Full-brightness colour of the line's bullet
    pub fn base_color(&self) -> [f32; 3] {
        match self {
            Line::L123 => [255., 60., 53.],
            Line::L456 => [67., 160., 71.],
            Line::Nqr => [249., 168., 37.],
        }
    }

    pub fn brightness_table(&self) -> &'static [f32; 24] {
        match self {
            Line::L123 => &BRIGHTNESS_123,
            Line::L456 => &BRIGHTNESS_456,
            Line::Nqr => &BRIGHTNESS_NQR,
        }
    }

    /// Line colour dimmed by `brightness` in [0, 255]
    pub fn color(&self, brightness: f32) -> [f32; 3] {
        let t = brightness / 255.;
        let [r, g, b] = self.base_color();
        [r * t, g * t, b * t]
    }
}

impl FromStr for Line {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "123" => Ok(Line::L123),
            "456" => Ok(Line::L456),
            "nqr" | "NQR" => Ok(Line::Nqr),
            other => Err(OptionsError::UnknownLine(other.to_owned())),
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Interpolates the hourly table toward the next hour by the minute.
///
/// Seconds are ignored, so the signal steps once a minute.
pub fn interpolate(table: &[f32; 24], hour: u32, minute: u32) -> f32 {
    let h = (hour % 24) as usize;
    let current = table[h];
    let next = table[(h + 1) % 24];
    current + (next - current) * (minute.min(59) as f32 / 60.)
}

/// Brightness of `line` at the given time of day
pub fn ridership_brightness<T: Timelike>(line: Line, now: &T) -> f32 {
    interpolate(line.brightness_table(), now.hour(), now.minute())
}
