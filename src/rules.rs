//! Variant presets and tunables for a session.

use crate::Variant;
use crate::piece::NormalShape;
use thiserror::Error;

/// Most colours the theme can paint.
pub const MAX_PALETTE: u8 = 5;
/// Power meter value that fires an attack.
pub const POWER_MAX: u32 = 100;

#[derive(Debug, Error, PartialEq)]
pub enum RulesError {
    #[error("grid needs at least {min} rows, got {rows}")]
    TooFewRows { rows: usize, min: usize },
    #[error("{shape:?} pieces need at least {min} columns, got {cols}")]
    TooFewColumns {
        cols: usize,
        min: usize,
        shape: NormalShape,
    },
    #[error("palette must hold 1..={max} colours, got {size}")]
    Palette { size: u8, max: u8 },
    #[error("{name} must be within 0..=1, got {value}")]
    Probability { name: &'static str, value: f64 },
    #[error("drop speed must be positive")]
    ZeroDropSpeed,
    #[error("decay window {min}..={max} ms is empty")]
    DecayWindow { min: u64, max: u64 },
}

/// Everything that differs between variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub rows: usize,
    pub cols: usize,
    pub shape: NormalShape,
    pub palette_size: u8,
    pub tnt_chance: f64,
    /// Quadruple the TNT chance while the tallest column is above 80% of the grid.
    pub tnt_surge: bool,
    pub color_bomb_chance: f64,
    /// Tumble rule: allowed height difference to the lower neighbour.
    pub max_steepness: Option<usize>,
    pub stability_pass_cap: u32,
    pub chain_wave_cap: u32,
    /// Block decay interval bounds in ms.
    pub decay_window_ms: Option<(u64, u64)>,
    pub power_per_line: u32,
    pub line_bonus: u32,
    pub attack_rows: usize,
    /// Falling speed in rows per second.
    pub drop_speed: u32,
}

impl Rules {
    pub fn for_variant(variant: Variant) -> Self {
        let base = Self {
            rows: 12,
            cols: 4,
            shape: NormalShape::Block,
            palette_size: 5,
            tnt_chance: 0.08,
            tnt_surge: false,
            color_bomb_chance: 0.0,
            max_steepness: None,
            stability_pass_cap: 20,
            chain_wave_cap: 64,
            decay_window_ms: None,
            power_per_line: 25,
            line_bonus: 50,
            attack_rows: 3,
            drop_speed: 12,
        };
        match variant {
            Variant::Classic => base,
            Variant::Bars => Self {
                rows: 14,
                cols: 6,
                shape: NormalShape::Bar,
                palette_size: 4,
                tnt_chance: 0.06,
                max_steepness: Some(2),
                power_per_line: 20,
                ..base
            },
            Variant::Tetromino => Self {
                rows: 16,
                cols: 10,
                shape: NormalShape::Tetromino,
                palette_size: 4,
                tnt_chance: 0.05,
                max_steepness: Some(2),
                power_per_line: 20,
                drop_speed: 14,
                ..base
            },
            Variant::Decay => Self {
                rows: 16,
                cols: 8,
                shape: NormalShape::Bar,
                palette_size: 5,
                tnt_chance: 0.05,
                tnt_surge: true,
                color_bomb_chance: 0.08,
                max_steepness: Some(2),
                decay_window_ms: Some((8_000, 12_000)),
                power_per_line: 20,
                drop_speed: 14,
                ..base
            },
        }
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        const MIN_ROWS: usize = 3;
        if self.rows < MIN_ROWS {
            return Err(RulesError::TooFewRows {
                rows: self.rows,
                min: MIN_ROWS,
            });
        }
        let min = self.shape.min_columns();
        if self.cols < min {
            return Err(RulesError::TooFewColumns {
                cols: self.cols,
                min,
                shape: self.shape,
            });
        }
        if self.palette_size == 0 || self.palette_size > MAX_PALETTE {
            return Err(RulesError::Palette {
                size: self.palette_size,
                max: MAX_PALETTE,
            });
        }
        for (name, value) in [
            ("tnt chance", self.tnt_chance),
            ("colour bomb chance", self.color_bomb_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RulesError::Probability { name, value });
            }
        }
        if self.drop_speed == 0 {
            return Err(RulesError::ZeroDropSpeed);
        }
        if let Some((min, max)) = self.decay_window_ms {
            if min == 0 || min > max {
                return Err(RulesError::DecayWindow { min, max });
            }
        }
        Ok(())
    }
}
