use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};
use crate::types::{OverlayPalette, ThemeColors};

const LIGHT_EMPTY: &str = "#ebedf0";
const LIGHT_TEXT: &str = "#24292f";
const LIGHT_BACKGROUND: &str = "#ffffff";
const LIGHT_BORDER: &str = "#d0d7de";

const DARK_EMPTY: &str = "#161b22";
const DARK_TEXT: &str = "#c9d1d9";
const DARK_BACKGROUND: &str = "#0d1117";
const DARK_BORDER: &str = "#30363d";

/// Lightness steps (percent) for generated ramps, lowest intensity first.
const DARK_RAMP_LIGHTNESS: [f64; 4] = [15.0, 30.0, 50.0, 65.0];
const LIGHT_RAMP_LIGHTNESS: [f64; 4] = [85.0, 65.0, 45.0, 30.0];

pub const DEFAULT_THEME: &str = "github";

const BUILTIN_THEMES: &[(&str, bool, [&str; 4])] = &[
    ("github", false, ["#9be9a8", "#40c463", "#30a14e", "#216e39"]),
    ("github-dark", true, ["#0e4429", "#006d32", "#26a641", "#39d353"]),
    ("blue", false, ["#c6dbef", "#6baed6", "#2171b5", "#08519c"]),
    ("purple", false, ["#d4b9da", "#c994c7", "#df65b0", "#980043"]),
    ("orange", false, ["#fdd0a2", "#fdae6b", "#f16913", "#d94801"]),
    ("blue-dark", true, ["#0a3069", "#0550ae", "#388bfd", "#58a6ff"]),
    ("purple-dark", true, ["#3c1e70", "#6e40c9", "#a371f7", "#bc8cff"]),
    ("orange-dark", true, ["#5a1e02", "#bd561d", "#d29922", "#e3b341"]),
];

pub const THEME_NAMES: [&str; 8] = [
    "github",
    "github-dark",
    "blue",
    "purple",
    "orange",
    "blue-dark",
    "purple-dark",
    "orange-dark",
];

/// Themes whose colours stay readable under every overlay palette.
pub const OVERLAY_THEME_NAMES: [&str; 5] = [
    "github",
    "github-dark",
    "blue-dark",
    "purple-dark",
    "orange-dark",
];

/// Fill colours for contributors that were not given an explicit base colour.
pub const DEFAULT_CUSTOM_COLORS: [&str; 18] = [
    "39d353", "58a6ff", "bc8cff", "e3b341", "f47067", "db61a2", "3fb950", "79c0ff", "d2a8ff",
    "f0883e", "ff4500", "1abc9c", "6c5ce7", "fd79a8", "00cec9", "e17055", "0984e3", "fdcb6e",
];

const OVERLAY_LEVELS: [[&str; 4]; 10] = [
    ["#9be9a8", "#40c463", "#30a14e", "#216e39"], // green
    ["#c6dbef", "#6baed6", "#2171b5", "#08519c"], // blue
    ["#fdd0a2", "#fdae6b", "#f16913", "#d94801"], // orange
    ["#d4b9da", "#c994c7", "#df65b0", "#980043"], // purple
    ["#fbb4ae", "#fb6a4a", "#ef3b2c", "#a50f15"], // red
    ["#b3cde3", "#8c96c6", "#8856a7", "#810f7c"], // violet
    ["#ccebc5", "#7bccc4", "#43a2ca", "#0868ac"], // teal
    ["#fde0dd", "#fa9fb5", "#f768a1", "#c51b8a"], // pink
    ["#d9d9d9", "#bdbdbd", "#969696", "#636363"], // gray
    ["#ffffb2", "#fecc5c", "#fd8d3c", "#e31a1c"], // yellow-red
];

fn levels_from(levels: &[&str; 4]) -> [String; 4] {
    levels.map(str::to_string)
}

fn chrome(levels: [String; 4], dark: bool) -> ThemeColors {
    if dark {
        ThemeColors {
            empty: DARK_EMPTY.to_string(),
            levels,
            text: DARK_TEXT.to_string(),
            background: DARK_BACKGROUND.to_string(),
            border: DARK_BORDER.to_string(),
        }
    } else {
        ThemeColors {
            empty: LIGHT_EMPTY.to_string(),
            levels,
            text: LIGHT_TEXT.to_string(),
            background: LIGHT_BACKGROUND.to_string(),
            border: LIGHT_BORDER.to_string(),
        }
    }
}

fn find_builtin(name: &str) -> Option<ThemeColors> {
    BUILTIN_THEMES
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, dark, levels)| chrome(levels_from(levels), *dark))
}

/// Resolve a built-in theme by name, falling back to `github`.
pub fn get_theme(name: &str) -> ThemeColors {
    find_builtin(name)
        .or_else(|| find_builtin(DEFAULT_THEME))
        .unwrap_or_else(|| chrome(levels_from(&OVERLAY_LEVELS[0]), false))
}

pub fn is_known_theme(name: &str) -> bool {
    THEME_NAMES.contains(&name)
}

pub fn is_overlay_theme(name: &str) -> bool {
    OVERLAY_THEME_NAMES.contains(&name)
}

/// The ten built-in per-contributor ramps used in overlay mode.
pub fn overlay_palettes() -> Vec<OverlayPalette> {
    OVERLAY_LEVELS
        .iter()
        .map(|levels| OverlayPalette {
            levels: levels_from(levels),
        })
        .collect()
}

/// Parse `rrggbb` (a leading `#` is tolerated) into channel bytes.
pub fn parse_hex(value: &str) -> Result<(u8, u8, u8)> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(MergeError::InvalidColor(value.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| MergeError::InvalidColor(value.to_string()))
    };
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Convert RGB to (hue degrees, saturation %, lightness %).
pub fn rgb_to_hsl((r, g, b): (u8, u8, u8)) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l * 100.0);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        ((g - b) / d + if g < b { 6.0 } else { 0.0 }) / 6.0
    } else if max == g {
        ((b - r) / d + 2.0) / 6.0
    } else {
        ((r - g) / d + 4.0) / 6.0
    };

    (h * 360.0, s * 100.0, l * 100.0)
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

/// Convert HSL (degrees, %, %) back to a `#rrggbb` string.
pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let h = h / 360.0;
    let s = s / 100.0;
    let l = l / 100.0;

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

    let to_byte = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", to_byte(r), to_byte(g), to_byte(b))
}

/// Derive a four-step intensity ramp from one base colour, keeping its hue
/// and saturation and stepping lightness through a fixed schedule.
pub fn generate_levels(base_hex: &str, dark: bool) -> Result<[String; 4]> {
    let (h, s, _) = rgb_to_hsl(parse_hex(base_hex)?);
    let schedule = if dark {
        DARK_RAMP_LIGHTNESS
    } else {
        LIGHT_RAMP_LIGHTNESS
    };
    Ok(schedule.map(|l| hsl_to_hex(h, s, l)))
}

pub fn build_custom_theme(base_hex: &str, dark: bool) -> Result<ThemeColors> {
    Ok(chrome(generate_levels(base_hex, dark)?, dark))
}

/// One generated ramp per contributor. Contributors past the supplied
/// colours take `DEFAULT_CUSTOM_COLORS` in order, wrapping around.
pub fn custom_palettes(colors: &[String], contributors: usize, dark: bool) -> Result<Vec<OverlayPalette>> {
    (0..contributors)
        .map(|i| {
            let base = match colors.get(i) {
                Some(color) => color.as_str(),
                None => DEFAULT_CUSTOM_COLORS[(i - colors.len()) % DEFAULT_CUSTOM_COLORS.len()],
            };
            Ok(OverlayPalette {
                levels: generate_levels(base, dark)?,
            })
        })
        .collect()
}

fn default_empty() -> String {
    LIGHT_EMPTY.to_string()
}
fn default_levels() -> [String; 4] {
    levels_from(&BUILTIN_THEMES[0].2)
}
fn default_text() -> String {
    LIGHT_TEXT.to_string()
}
fn default_background() -> String {
    LIGHT_BACKGROUND.to_string()
}
fn default_border() -> String {
    LIGHT_BORDER.to_string()
}

/// On-disk theme description; omitted keys take the `github` colours.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ThemeFile {
    #[serde(default = "default_empty")]
    empty: String,
    #[serde(default = "default_levels")]
    levels: [String; 4],
    #[serde(default = "default_text")]
    text: String,
    #[serde(default = "default_background")]
    background: String,
    #[serde(default = "default_border")]
    border: String,
}

impl ThemeFile {
    fn into_colors(self) -> Result<ThemeColors> {
        let colors = ThemeColors {
            empty: self.empty,
            levels: self.levels,
            text: self.text,
            background: self.background,
            border: self.border,
        };
        let fields = [&colors.empty, &colors.text, &colors.background, &colors.border];
        for value in fields.into_iter().chain(colors.levels.iter()) {
            if parse_hex(value).is_err() {
                return Err(MergeError::Theme(format!(
                    "Invalid color in theme file: \"{}\"",
                    value
                )));
            }
        }
        Ok(colors)
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).or_else(|toml_err| {
            serde_yaml::from_str(content).map_err(|yaml_err| {
                MergeError::Theme(format!(
                    "Failed to parse theme as TOML ({}) or YAML ({})",
                    toml_err, yaml_err
                ))
            })
        })
    }
}

impl ThemeColors {
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ThemeFile = toml::from_str(content)
            .map_err(|e| MergeError::Theme(format!("Failed to parse theme TOML: {}", e)))?;
        file.into_colors()
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: ThemeFile = serde_yaml::from_str(content)
            .map_err(|e| MergeError::Theme(format!("Failed to parse theme YAML: {}", e)))?;
        file.into_colors()
    }

    /// Try TOML first, then YAML. Every colour must be `#rrggbb`.
    pub fn from_file_contents(content: &str) -> Result<Self> {
        ThemeFile::parse(content)?.into_colors()
    }
}
