//! Hex RGB and HSL triple conversion.
//!
//! Theme colors are persisted as HSL triples (`"240 5.9% 10%"`), the form CSS
//! custom properties consume inside `hsl(var(--name))`. Color pickers work in
//! hex. Triples are written with at most one decimal per component, which is
//! enough for hex -> triple -> hex to reproduce every 24-bit color.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing::warn;

/// Hex returned for absent or unreadable triples.
pub const FALLBACK_HEX: &str = "#000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb`; the `#` is optional and case is ignored.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(eyre!(
                "Invalid hex color: '{}'. Expected #rgb or #rrggbb",
                s
            ));
        }
        let channel = |pair: &str| {
            u8::from_str_radix(pair, 16).map_err(|_| eyre!("Invalid hex color component in '{}'", s))
        };
        match digits.len() {
            3 => {
                let doubled: String = digits.chars().flat_map(|c| [c, c]).collect();
                Ok(Self::new(
                    channel(&doubled[0..2])?,
                    channel(&doubled[2..4])?,
                    channel(&doubled[4..6])?,
                ))
            }
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(eyre!(
                "Invalid hex color: '{}'. Expected 3 or 6 hex digits",
                s
            )),
        }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_hsl(&self) -> Hsl {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return Hsl::new(0.0, 0.0, l * 100.0);
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        Hsl::new(h / 6.0 * 360.0, s * 100.0, l * 100.0)
    }
}

/// Hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// Parse `"<h> <s>% <l>%"`. Missing components read as 0 and `%` signs are optional.
    pub fn from_triple(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(eyre!(
                "Invalid HSL triple: '{}'. Expected \"<h> <s>% <l>%\"",
                s
            ));
        }
        let component = |i: usize| -> Result<f64> {
            let Some(part) = parts.get(i) else {
                return Ok(0.0);
            };
            let value: f64 = part
                .trim_end_matches('%')
                .parse()
                .map_err(|_| eyre!("Invalid HSL component '{}' in '{}'", part, s))?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(eyre!("Invalid HSL component '{}' in '{}'", part, s))
            }
        };
        Ok(Self::new(component(0)?, component(1)?, component(2)?))
    }

    /// Format as `"<h> <s>% <l>%"` with at most one decimal per component.
    pub fn to_triple(&self) -> String {
        let mut h = round_tenth(self.h);
        if h >= 360.0 {
            h = 0.0;
        }
        format!(
            "{} {}% {}%",
            tenth_string(h),
            tenth_string(round_tenth(self.s)),
            tenth_string(round_tenth(self.l))
        )
    }

    /// Hue wraps around the circle; saturation and lightness are clamped to 0..=100.
    pub fn to_rgb(&self) -> Rgb {
        let h = self.h.rem_euclid(360.0) / 360.0;
        let s = self.s.clamp(0.0, 100.0) / 100.0;
        let l = self.l.clamp(0.0, 100.0) / 100.0;

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_channel(p, q, h + 1.0 / 3.0),
                hue_to_channel(p, q, h),
                hue_to_channel(p, q, h - 1.0 / 3.0),
            )
        };
        Rgb::new(to_byte(r), to_byte(g), to_byte(b))
    }
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_byte(x: f64) -> u8 {
    (x * 255.0 + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Round half up to one decimal place.
fn round_tenth(x: f64) -> f64 {
    (x * 10.0 + 0.5).floor() / 10.0
}

fn tenth_string(x: f64) -> String {
    if x.fract() == 0.0 {
        format!("{}", x as i64)
    } else {
        format!("{:.1}", x)
    }
}

/// Convert a hex color to an HSL triple. Unreadable input is treated as black.
pub fn hex_to_hsl_triple(hex: &str) -> String {
    let rgb = Rgb::from_hex(hex).unwrap_or_else(|e| {
        warn!("{}; using black", e);
        Rgb::default()
    });
    rgb.to_hsl().to_triple()
}

/// Convert an HSL triple to lowercase `#rrggbb`.
///
/// Absent, empty or unreadable triples give [`FALLBACK_HEX`].
pub fn hsl_triple_to_hex(triple: Option<&str>) -> String {
    let Some(triple) = triple.filter(|t| !t.trim().is_empty()) else {
        return FALLBACK_HEX.to_string();
    };
    match Hsl::from_triple(triple) {
        Ok(hsl) => hsl.to_rgb().to_hex(),
        Err(e) => {
            warn!("{}", e);
            FALLBACK_HEX.to_string()
        }
    }
}
