//! Piece shapes: single blocks, bars, tetrominoes and the two special pieces.

use crate::grid::PieceId;

/// Shape family used for ordinary coloured pieces in a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalShape {
    Block,
    Bar,
    Tetromino,
}

impl NormalShape {
    /// Narrowest grid that can hold every piece of this family.
    pub fn min_columns(&self) -> usize {
        match self {
            Self::Block => 1,
            Self::Bar => 2,
            Self::Tetromino => 4,
        }
    }
}

/// Tetromino kinds (I, O, T, S, Z, J, L).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TetrominoKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl TetrominoKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::S, Self::Z, Self::J, Self::L];

    /// 4 cells relative to origin (0,0); each (dx, dy).
    pub fn cells(&self) -> &[(i8, i8); 4] {
        match self {
            Self::I => &[(0, 0), (1, 0), (2, 0), (3, 0)],
            Self::O => &[(0, 0), (1, 0), (0, 1), (1, 1)],
            Self::T => &[(0, 0), (1, 0), (2, 0), (1, 1)],
            Self::S => &[(1, 0), (2, 0), (0, 1), (1, 1)],
            Self::Z => &[(0, 0), (1, 0), (1, 1), (2, 1)],
            Self::J => &[(0, 0), (0, 1), (1, 1), (2, 1)],
            Self::L => &[(2, 0), (0, 1), (1, 1), (2, 1)],
        }
    }

    fn pivot(&self) -> (i8, i8) {
        match self {
            Self::I => (1, 0),
            _ => (1, 1),
        }
    }
}

fn rotate_cell(dx: i8, dy: i8, r: u8, cx: i8, cy: i8) -> (i32, i32) {
    let dx = dx - cx;
    let dy = dy - cy;
    let (dx, dy) = match r {
        1 => (-dy, dx),
        2 => (-dx, -dy),
        3 => (dy, -dx),
        _ => (dx, dy),
    };
    (i32::from(dx + cx), i32::from(dy + cy))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    Block,
    Bar,
    Tetromino(TetrominoKind),
    Tnt,
    ColorBomb,
}

/// A generated piece. Special pieces (TNT, colour bomb) have no colour and
/// never become grid cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Option<u8>,
    pub id: PieceId,
    /// Quarter turns clockwise, 0..4.
    pub rotation: u8,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Option<u8>, id: PieceId) -> Self {
        Self {
            kind,
            color,
            id,
            rotation: 0,
        }
    }

    #[inline]
    pub fn is_special(&self) -> bool {
        matches!(self.kind, PieceKind::Tnt | PieceKind::ColorBomb)
    }

    /// Footprint as (row offset, column offset) from the anchor.
    pub fn offsets(&self) -> Vec<(i32, i32)> {
        match self.kind {
            PieceKind::Block | PieceKind::Tnt | PieceKind::ColorBomb => vec![(0, 0)],
            PieceKind::Bar => vec![(0, 0), (0, 1)],
            PieceKind::Tetromino(kind) => {
                let (cx, cy) = kind.pivot();
                let r = if kind == TetrominoKind::O { 0 } else { self.rotation % 4 };
                kind.cells()
                    .iter()
                    .map(|&(dx, dy)| {
                        let (x, y) = rotate_cell(dx, dy, r, cx, cy);
                        (y, x)
                    })
                    .collect()
            }
        }
    }

    /// Only tetrominoes other than the square turn.
    pub fn can_rotate(&self) -> bool {
        matches!(self.kind, PieceKind::Tetromino(k) if k != TetrominoKind::O)
    }

    pub fn rotated_cw(&self) -> Self {
        let mut next = self.clone();
        if self.can_rotate() {
            next.rotation = (self.rotation + 1) % 4;
        }
        next
    }

    /// (min row, max row, min col, max col) of the footprint.
    pub fn extents(&self) -> (i32, i32, i32, i32) {
        self.offsets().iter().fold(
            (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
            |(r0, r1, c0, c1), &(dr, dc)| (r0.min(dr), r1.max(dr), c0.min(dc), c1.max(dc)),
        )
    }

    pub fn width(&self) -> usize {
        let (_, _, c0, c1) = self.extents();
        (c1 - c0 + 1) as usize
    }
}
