//! Per-player playfield: cell storage, placement, gravity and flood fill.

use crate::piece::Piece;
use thiserror::Error;

/// Identifier shared by every cell that came from one placed piece.
pub type PieceId = u32;

/// Row index of the win threshold (second from the top).
pub const LIMIT_LINE_ROW: usize = 1;

/// Single cell: either empty or a block left by a placed piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Block {
        color: u8,
        piece: PieceId,
        /// Already counted towards a line charge; never cleared once set.
        scored: bool,
    },
}

impl Cell {
    pub fn block(color: u8, piece: PieceId) -> Self {
        Self::Block {
            color,
            piece,
            scored: false,
        }
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        matches!(self, Self::Block { .. })
    }

    #[inline]
    pub fn color(&self) -> Option<u8> {
        match self {
            Self::Block { color, .. } => Some(*color),
            Self::Empty => None,
        }
    }

    #[inline]
    pub fn piece(&self) -> Option<PieceId> {
        match self {
            Self::Block { piece, .. } => Some(*piece),
            Self::Empty => None,
        }
    }

    #[inline]
    pub fn is_scored(&self) -> bool {
        matches!(self, Self::Block { scored: true, .. })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("cell ({row}, {col}) is outside the grid")]
    OutOfBounds { row: i32, col: i32 },
    #[error("cell ({row}, {col}) is already occupied")]
    Occupied { row: usize, col: usize },
    #[error("special pieces never occupy grid cells")]
    Colorless,
}

/// Fixed-size grid. Row 0 is the top; cells are packed as `row * cols + col`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// Signed coordinates to a cell position, if inside the grid.
    #[inline]
    pub fn position(&self, row: i32, col: i32) -> Option<(usize, usize)> {
        let (r, c) = (usize::try_from(row).ok()?, usize::try_from(col).ok()?);
        self.index(r, c).map(|_| (r, c))
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.index(row, col).map(|i| self.cells[i])
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if let Some(i) = self.index(row, col) {
            self.cells[i] = cell;
        }
    }

    /// Empties a cell, returning what was there.
    pub fn take(&mut self, row: usize, col: usize) -> Cell {
        match self.index(row, col) {
            Some(i) => std::mem::take(&mut self.cells[i]),
            None => Cell::Empty,
        }
    }

    #[inline]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some_and(|c| c.is_occupied())
    }

    /// True if the piece fits with its anchor at (row, col). Cells above the
    /// top edge are free; cells below the floor or beside the walls are not.
    pub fn can_place(&self, piece: &Piece, row: i32, col: i32) -> bool {
        piece.offsets().iter().all(|&(dr, dc)| {
            let (r, c) = (row + dr, col + dc);
            if c < 0 || c >= self.cols as i32 || r >= self.rows as i32 {
                return false;
            }
            r < 0 || !self.is_occupied(r as usize, c as usize)
        })
    }

    /// Writes every footprint cell of the piece. Nothing is written unless all
    /// cells are inside the grid and empty.
    pub fn place(&mut self, piece: &Piece, row: i32, col: i32) -> Result<(), PlacementError> {
        let color = piece.color.ok_or(PlacementError::Colorless)?;
        let mut targets = Vec::with_capacity(4);
        for (dr, dc) in piece.offsets() {
            let (r, c) = (row + dr, col + dc);
            let (r, c) = self
                .position(r, c)
                .ok_or(PlacementError::OutOfBounds { row: r, col: c })?;
            if self.is_occupied(r, c) {
                return Err(PlacementError::Occupied { row: r, col: c });
            }
            targets.push((r, c));
        }
        for (r, c) in targets {
            self.set(r, c, Cell::block(color, piece.id));
        }
        Ok(())
    }

    /// Distance from the floor to the topmost occupied cell of the column.
    pub fn column_height(&self, col: usize) -> usize {
        if col >= self.cols {
            return 0;
        }
        (0..self.rows)
            .find(|&row| self.is_occupied(row, col))
            .map_or(0, |top| self.rows - top)
    }

    pub fn tallest_column_height(&self) -> usize {
        (0..self.cols)
            .map(|c| self.column_height(c))
            .max()
            .unwrap_or(0)
    }

    /// Compacts one column downward, preserving order. Returns true if anything moved.
    pub fn compact_column(&mut self, col: usize) -> bool {
        if col >= self.cols {
            return false;
        }
        let mut moved = false;
        let mut write = self.rows;
        for row in (0..self.rows).rev() {
            if self.is_occupied(row, col) {
                write -= 1;
                if write != row {
                    let cell = self.take(row, col);
                    self.set(write, col, cell);
                    moved = true;
                }
            }
        }
        moved
    }

    /// Compacts every column. Returns true if anything moved.
    pub fn apply_gravity(&mut self) -> bool {
        let mut moved = false;
        for col in 0..self.cols {
            moved |= self.compact_column(col);
        }
        moved
    }

    /// Orthogonally connected cells of `color` reachable from (row, col).
    /// Empty if the start is out of bounds or a different colour.
    pub fn flood_fill(&self, row: usize, col: usize, color: u8) -> Vec<(usize, usize)> {
        let mut visited = vec![false; self.cells.len()];
        self.flood_fill_marking(row, col, color, &mut visited)
    }

    /// Flood fill sharing a visited bitmap across calls (packed indices).
    pub(crate) fn flood_fill_marking(
        &self,
        row: usize,
        col: usize,
        color: u8,
        visited: &mut [bool],
    ) -> Vec<(usize, usize)> {
        let mut component = Vec::new();
        let Some(start) = self.index(row, col) else {
            return component;
        };
        if visited[start] || self.cells[start].color() != Some(color) {
            return component;
        }
        visited[start] = true;
        let mut stack = vec![(row, col)];
        while let Some((r, c)) = stack.pop() {
            component.push((r, c));
            let neighbours = [
                (r.wrapping_sub(1), c),
                (r + 1, c),
                (r, c.wrapping_sub(1)),
                (r, c + 1),
            ];
            for (nr, nc) in neighbours {
                if let Some(i) = self.index(nr, nc) {
                    if !visited[i] && self.cells[i].color() == Some(color) {
                        visited[i] = true;
                        stack.push((nr, nc));
                    }
                }
            }
        }
        component
    }

    /// Clears the square of side `2 * radius + 1` centred on (row, col), clipped
    /// to the grid. Returns the positions that held blocks.
    pub fn clear_area(&mut self, row: i32, col: i32, radius: i32) -> Vec<(usize, usize)> {
        let mut cleared = Vec::new();
        for dr in -radius..=radius {
            for dc in -radius..=radius {
                if let Some((r, c)) = self.position(row + dr, col + dc) {
                    if self.take(r, c).is_occupied() {
                        cleared.push((r, c));
                    }
                }
            }
        }
        cleared
    }

    /// Clears every block of the given colour.
    pub fn clear_color(&mut self, color: u8) -> Vec<(usize, usize)> {
        let hits: Vec<_> = self
            .occupied()
            .filter(|&(_, _, cell)| cell.color() == Some(color))
            .map(|(r, c, _)| (r, c))
            .collect();
        for &(r, c) in &hits {
            self.take(r, c);
        }
        hits
    }

    /// Empties the bottom `n` rows without moving anything above them.
    /// Returns the number of blocks removed.
    pub fn clear_bottom_rows(&mut self, n: usize) -> usize {
        let first = self.rows.saturating_sub(n);
        let mut removed = 0;
        for row in first..self.rows {
            for col in 0..self.cols {
                if self.take(row, col).is_occupied() {
                    removed += 1;
                }
            }
        }
        removed
    }

    pub fn row_is_complete(&self, row: usize) -> bool {
        row < self.rows && (0..self.cols).all(|c| self.is_occupied(row, c))
    }

    pub fn row_has_block(&self, row: usize) -> bool {
        row < self.rows && (0..self.cols).any(|c| self.is_occupied(row, c))
    }

    /// Marks every block of the row as scored. Returns true if any was unscored.
    pub fn mark_row_scored(&mut self, row: usize) -> bool {
        let mut fresh = false;
        for col in 0..self.cols {
            if let Some(i) = self.index(row, col) {
                if let Cell::Block { scored, .. } = &mut self.cells[i] {
                    fresh |= !*scored;
                    *scored = true;
                }
            }
        }
        fresh
    }

    /// All occupied cells, top-left to bottom-right.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_occupied())
            .map(|(i, cell)| (i / self.cols, i % self.cols, *cell))
    }

    #[cfg(test)]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    #[inline]
    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Builds a grid from text rows, top first: `.` is empty, a digit is a
    /// block of that colour. Every block gets its own piece id unless a
    /// lowercase letter follows the digit, which groups blocks into one piece.
    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&str]) -> Self {
        let parsed: Vec<Vec<Cell>> = rows
            .iter()
            .enumerate()
            .map(|(r, line)| {
                let mut cells = Vec::new();
                let mut chars = line.chars().peekable();
                while let Some(ch) = chars.next() {
                    if ch == '.' {
                        cells.push(Cell::Empty);
                        continue;
                    }
                    let color = ch.to_digit(10).expect("colour digit") as u8;
                    let piece = match chars.peek() {
                        Some(tag) if tag.is_ascii_lowercase() => {
                            let id = 1000 + u32::from(*tag as u8 - b'a');
                            chars.next();
                            id
                        }
                        _ => (r * 100 + cells.len() + 1) as PieceId,
                    };
                    cells.push(Cell::block(color, piece));
                }
                cells
            })
            .collect();
        let cols = parsed.first().map_or(0, Vec::len);
        let mut grid = Self::new(parsed.len(), cols);
        for (r, row) in parsed.into_iter().enumerate() {
            assert_eq!(row.len(), cols, "ragged row {r}");
            for (c, cell) in row.into_iter().enumerate() {
                grid.set(r, c, cell);
            }
        }
        grid
    }
}
