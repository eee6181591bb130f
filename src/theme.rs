//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Block colours and UI colours, neon arcade look by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Block colours by palette index: pink, cyan, green, gold, purple.
    pub blocks: [Color; 5],
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, power).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text and the queued-piece ghost.
    pub inactive_fg: Color,
    /// Win threshold marker.
    pub limit_line: Color,
    /// Frame colours for player 1 and player 2.
    pub players: [Color; 2],
    pub tnt: Color,
    pub bomb: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::neon()
    }
}

impl Theme {
    pub const fn neon() -> Self {
        Self {
            blocks: [
                Color::Rgb(0xFF, 0x2E, 0x97), // pink
                Color::Rgb(0x00, 0xE5, 0xFF), // cyan
                Color::Rgb(0x39, 0xFF, 0x14), // green
                Color::Rgb(0xFF, 0xD7, 0x00), // gold
                Color::Rgb(0xB1, 0x4A, 0xED), // purple
            ],
            bg: Color::Rgb(0x0D, 0x02, 0x21),
            div_line: Color::Rgb(0x2D, 0x1B, 0x4E),
            main_fg: Color::Rgb(0xE0, 0xE0, 0xF0),
            title: Color::Rgb(0xFF, 0xD7, 0x00),
            inactive_fg: Color::Rgb(0x6C, 0x5B, 0x8A),
            limit_line: Color::Rgb(0xFF, 0x44, 0x44),
            players: [Color::Rgb(0x00, 0xE5, 0xFF), Color::Rgb(0xFF, 0x2E, 0x97)],
            tnt: Color::Rgb(0xFF, 0x55, 0x00),
            bomb: Color::Rgb(0xF5, 0xF5, 0xF5),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to the neon defaults if path is None or the file is missing.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default()),
        };
        let s = std::fs::read_to_string(path)?;
        Ok(Self::from_map(&parse_theme_file(&s)))
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let base = Self::neon();
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        // Keys follow btop naming; a block colour may also be set as block0..block4.
        let block = |i: usize, btop_key: &str| {
            get(&format!("block{i}"))
                .or_else(|| get(btop_key))
                .unwrap_or(base.blocks[i])
        };
        Self {
            blocks: [
                block(0, "temp_end"),
                block(1, "hi_fg"),
                block(2, "mem_box"),
                block(3, "title"),
                block(4, "net_box"),
            ],
            bg: get("meter_bg").unwrap_or(base.bg),
            div_line: get("div_line").unwrap_or(base.div_line),
            main_fg: get("main_fg").unwrap_or(base.main_fg),
            title: get("title").unwrap_or(base.title),
            inactive_fg: get("inactive_fg").unwrap_or(base.inactive_fg),
            limit_line: get("cpu_end").unwrap_or(base.limit_line),
            players: [
                get("cpu_box").unwrap_or(base.players[0]),
                get("proc_box").unwrap_or(base.players[1]),
            ],
            tnt: get("temp_mid").unwrap_or(base.tnt),
            bomb: get("selected_fg").unwrap_or(base.bomb),
        }
    }

    /// Colour for a block's palette index.
    #[inline]
    pub fn block_color(&self, index: u8) -> Color {
        self.blocks[(index as usize) % self.blocks.len()]
    }
}

/// Collects `theme[key]=value` assignments. Comments and other lines are skipped.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.strip_prefix("theme[")?.split_once(']')?;
            let value = value.trim().strip_prefix('=')?.trim();
            let value = value.trim_matches(|c| c == '"' || c == '\'');
            (!value.is_empty()).then(|| (key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    if !s.is_ascii() {
        return Err(invalid());
    }
    let (r, g, b) = match s.len() {
        6 => (channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?),
        3 => (
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        ),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}
