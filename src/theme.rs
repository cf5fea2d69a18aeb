//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use columnstui::{Cell, Jewel};
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Jewel colours and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// One colour per jewel, in `Jewel::ALL` order: red, orange, yellow, green, cyan, blue, violet.
    pub jewels: [Color; 7],
    /// Landed faller flash.
    pub landed: Color,
    /// Matched jewels waiting to be cleared.
    pub matched: Color,
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text.
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (key help).
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

const ONEDARK_JEWELS: [Color; 7] = [
    rgb(0xE06C75),
    rgb(0xD19A66),
    rgb(0xE5C07B),
    rgb(0x98C379),
    rgb(0x56B6C2),
    rgb(0x61AFEF),
    rgb(0xC678DD),
];

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// One Dark defaults (hex values from onedark.theme).
    pub fn onedark_default() -> Self {
        Self {
            jewels: ONEDARK_JEWELS,
            landed: rgb(0x000000),
            matched: rgb(0xFCFFC6),
            bg: rgb(0x31353F),
            div_line: rgb(0x3F444F),
            main_fg: rgb(0xABB2BF),
            title: rgb(0xE5C07B),
            inactive_fg: rgb(0x5C6370),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override jewel colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                // Saturated arcade colours
                self.jewels = [
                    rgb(0xFF0000),
                    rgb(0xFF7F00),
                    rgb(0xFFF200),
                    rgb(0x76FF00),
                    rgb(0x00FFFF),
                    rgb(0x0004FF),
                    rgb(0x9D00FF),
                ];
            }
            crate::Palette::Colorblind => {
                // Paul Tol's bright + vibrant picks; distinguishable without red/green
                self.jewels = [
                    rgb(0xCC3311),
                    rgb(0xEE7733),
                    rgb(0xBBBB00),
                    rgb(0x009988),
                    rgb(0x33BBEE),
                    rgb(0x0077BB),
                    rgb(0xEE3377),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        let d = Self::onedark_default();
        // Keys match onedark.theme; fallbacks are the same file's hex values.
        Self {
            jewels: [
                get("cpu_end").or_else(|| get("temp_end")).unwrap_or(d.jewels[0]),
                get("temp_mid").unwrap_or(d.jewels[1]),
                get("title").or_else(|| get("cpu_mid")).unwrap_or(d.jewels[2]),
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(d.jewels[3]),
                get("hi_fg").or_else(|| get("proc_misc")).unwrap_or(d.jewels[4]),
                get("cpu_box").unwrap_or(d.jewels[5]),
                get("net_box").unwrap_or(d.jewels[6]),
            ],
            landed: get("landed").unwrap_or(d.landed),
            matched: get("selected_fg").unwrap_or(d.matched),
            bg: get("meter_bg").unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
        }
    }

    #[inline]
    pub fn jewel_color(&self, jewel: Jewel) -> Color {
        self.jewels[jewel.index() % self.jewels.len()]
    }

    /// Fill colour for a board cell: landed flashes, matched is highlighted.
    pub fn cell_color(&self, cell: Cell) -> Option<Color> {
        match cell {
            Cell::Empty => None,
            Cell::Landed(_) => Some(self.landed),
            Cell::Matched(_) => Some(self.matched),
            Cell::Falling(j) | Cell::Frozen(j) => Some(self.jewel_color(j)),
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    match s.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(invalid()),
    }
}
