//! Notifications emitted by the engine for the front-end. Nothing in the
//! simulation depends on them being read.

/// (row, col) grid position.
pub type Pos = (usize, usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Landed { cells: Vec<Pos>, color: u8 },
    /// Landing refused because the piece would stick out of the top.
    Blocked { col: i32 },
    Popped { cells: Vec<Pos>, color: u8, wave: u32 },
    Exploded { center: Pos, cells: Vec<Pos> },
    Slid { from: Pos, to: Pos },
    BombFired { color: u8, cells: Vec<Pos> },
    BombFizzled { col: i32 },
    LineCharged { row: usize },
    AttackLaunched { rows: usize },
    AttackReceived { cleared: usize },
    Decayed { cells: Vec<Pos>, color: u8 },
    StabilityCapReached { passes: u32 },
    ChainCapReached { waves: u32 },
}

impl GameEvent {
    /// Cap hits: the engine gave up on a pass and carried on.
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            Self::StabilityCapReached { .. } | Self::ChainCapReached { .. }
        )
    }

    /// Cells that just vanished, for pop/explosion effects.
    pub fn removed_cells(&self) -> &[Pos] {
        match self {
            Self::Popped { cells, .. }
            | Self::Exploded { cells, .. }
            | Self::BombFired { cells, .. }
            | Self::Decayed { cells, .. } => cells,
            _ => &[],
        }
    }
}
