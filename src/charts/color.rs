//! Color helpers shared by the interactive and static renderers.

use egui::Color32;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 8-bit sRGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const GREEN: Rgb = Rgb(0, 128, 0);
pub const RED: Rgb = Rgb(255, 0, 0);
pub const YELLOW: Rgb = Rgb(255, 255, 0);
pub const BLUE: Rgb = Rgb(0, 0, 255);
pub const GRAY: Rgb = Rgb(128, 128, 128);
pub const BLACK: Rgb = Rgb(0, 0, 0);

/// Default trace colors when a trace does not set one.
pub const PALETTE: [Rgb; 8] = [
    Rgb(99, 110, 250),
    Rgb(239, 85, 59),
    Rgb(0, 204, 150),
    Rgb(171, 99, 250),
    Rgb(255, 161, 90),
    Rgb(25, 211, 243),
    Rgb(255, 102, 146),
    Rgb(182, 232, 128),
];

impl Rgb {
    pub fn palette(index: usize) -> Rgb {
        PALETTE[index % PALETTE.len()]
    }

    pub fn to_color32(self) -> Color32 {
        Color32::from_rgb(self.0, self.1, self.2)
    }

    pub fn to_plotters(self) -> plotters::style::RGBColor {
        plotters::style::RGBColor(self.0, self.1, self.2)
    }

    /// Hue, lightness, saturation, each in [0, 1].
    pub fn to_hls(self) -> (f64, f64, f64) {
        let r = self.0 as f64 / 255.0;
        let g = self.1 as f64 / 255.0;
        let b = self.2 as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if max == min {
            return (0.0, l, 0.0);
        }

        let delta = max - min;
        let s = if l <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };

        let rc = (max - r) / delta;
        let gc = (max - g) / delta;
        let bc = (max - b) / delta;
        let h = if r == max {
            bc - gc
        } else if g == max {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };

        ((h / 6.0).rem_euclid(1.0), l, s)
    }

    pub fn from_hls(h: f64, l: f64, s: f64) -> Rgb {
        let to_byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if s == 0.0 {
            return Rgb(to_byte(l), to_byte(l), to_byte(l));
        }

        let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let m1 = 2.0 * l - m2;

        let channel = |hue: f64| {
            let hue = hue.rem_euclid(1.0);
            if hue < 1.0 / 6.0 {
                m1 + (m2 - m1) * hue * 6.0
            } else if hue < 0.5 {
                m2
            } else if hue < 2.0 / 3.0 {
                m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
            } else {
                m1
            }
        };

        Rgb(
            to_byte(channel(h + 1.0 / 3.0)),
            to_byte(channel(h)),
            to_byte(channel(h - 1.0 / 3.0)),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Accepts `#rgb`, `#rrggbb` and a handful of CSS color names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let named = match s.to_ascii_lowercase().as_str() {
            "green" => Some(GREEN),
            "red" => Some(RED),
            "yellow" => Some(YELLOW),
            "blue" => Some(BLUE),
            "gray" | "grey" => Some(GRAY),
            "black" => Some(BLACK),
            "white" => Some(Rgb(255, 255, 255)),
            "orange" => Some(Rgb(255, 165, 0)),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        let digits = s
            .strip_prefix('#')
            .filter(|h| h.is_ascii())
            .ok_or_else(|| format!("unknown color '{}'", s))?;
        // Color32::from_hex also takes alpha forms; only opaque colors are valid here.
        if !matches!(digits.len(), 3 | 6) {
            return Err(format!("bad hex color '{}'", s));
        }
        let color = Color32::from_hex(s).map_err(|e| format!("bad hex color '{}': {:?}", s, e))?;
        Ok(Rgb(color.r(), color.g(), color.b()))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// Scale a color's lightness by `amount`, clamped to [0, 1].
///
/// Returns the input unchanged if it cannot be parsed.
pub fn adjust_color_lightness(color: &str, amount: f64) -> String {
    match color.parse::<Rgb>() {
        Ok(rgb) => {
            let (h, l, s) = rgb.to_hls();
            Rgb::from_hls(h, (amount * l).clamp(0.0, 1.0), s).to_string()
        }
        Err(_) => color.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_hex() {
        assert_eq!("green".parse::<Rgb>(), Ok(GREEN));
        assert_eq!("#FF0000".parse::<Rgb>(), Ok(RED));
        assert_eq!("#0f0".parse::<Rgb>(), Ok(Rgb(0, 255, 0)));
        assert!("chartreuse-ish".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#ff000080".parse::<Rgb>().is_err());
        assert!("#ggg".parse::<Rgb>().is_err());
        assert_eq!("#00C000".parse::<Rgb>(), Ok(Rgb(0, 192, 0)));
    }

    #[test]
    fn hls_round_trip() {
        for color in [GREEN, RED, YELLOW, BLUE, Rgb(12, 200, 99), GRAY] {
            let (h, l, s) = color.to_hls();
            assert_eq!(Rgb::from_hls(h, l, s), color);
        }
    }

    #[test]
    fn lightening_and_darkening_green() {
        // green has lightness 0.25 in HLS
        assert_eq!(adjust_color_lightness("green", 1.5), "#00c000");
        assert_eq!(adjust_color_lightness("green", 0.6), "#004d00");
    }

    #[test]
    fn lightness_is_clamped() {
        assert_eq!(adjust_color_lightness("yellow", 10.0), "#ffffff");
        assert_eq!(adjust_color_lightness("red", 0.0), "#000000");
    }

    #[test]
    fn unparseable_color_falls_back_to_input() {
        assert_eq!(adjust_color_lightness("not-a-color", 1.5), "not-a-color");
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&YELLOW).unwrap();
        assert_eq!(json, "\"#ffff00\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, YELLOW);
    }
}
