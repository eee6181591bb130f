//! Seeded piece generator shared by both players of a session.

use crate::grid::PieceId;
use crate::piece::{NormalShape, Piece, PieceKind, TetrominoKind};
use crate::rules::Rules;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// TNT chance multiplier while a stack is close to the top.
const TNT_SURGE_FACTOR: f64 = 4.0;

/// Draws pieces from the variant's probability table. Owns the session's only
/// random source, so decay targeting borrows it through [`Self::rng`].
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    rng: StdRng,
    next_id: PieceId,
}

impl PieceGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_id: 1,
        }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// TNT chance for a player whose tallest column is `tallest` rows high.
    pub fn tnt_chance(rules: &Rules, tallest: usize) -> f64 {
        // tallest > 80% of rows
        if rules.tnt_surge && tallest * 5 > rules.rows * 4 {
            (rules.tnt_chance * TNT_SURGE_FACTOR).min(1.0)
        } else {
            rules.tnt_chance
        }
    }

    pub fn next(&mut self, rules: &Rules, tallest: usize) -> Piece {
        if self.rng.random_bool(Self::tnt_chance(rules, tallest)) {
            return Piece::new(PieceKind::Tnt, None, 0);
        }
        if self.rng.random_bool(rules.color_bomb_chance) {
            return Piece::new(PieceKind::ColorBomb, None, 0);
        }
        let kind = match rules.shape {
            NormalShape::Block => PieceKind::Block,
            NormalShape::Bar => PieceKind::Bar,
            NormalShape::Tetromino => {
                let i = self.rng.random_range(0..TetrominoKind::ALL.len());
                PieceKind::Tetromino(TetrominoKind::ALL[i])
            }
        };
        let color = self.rng.random_range(0..rules.palette_size);
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        Piece::new(kind, Some(color), id)
    }
}
