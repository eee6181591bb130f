//! Post-landing pipeline: gravity, tumble rule, chained colour matches and
//! line charging.

use crate::events::Pos;
use crate::grid::{Grid, PieceId};
use crate::rules::Rules;
use std::collections::HashSet;

/// Distinct pieces a same-colour group needs before it pops.
pub const MATCH_MIN_PIECES: usize = 3;
pub const MATCH_SCORE_PER_CELL: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slide {
    pub from: Pos,
    pub to: Pos,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stability {
    pub slides: Vec<Slide>,
    pub passes: u32,
    pub converged: bool,
}

/// The neighbour `col` would tumble into: the lower of the two (left on a
/// tie), provided `col` stands more than `max_steepness` above it.
pub fn steep_neighbor(grid: &Grid, col: usize, max_steepness: usize) -> Option<usize> {
    let height = grid.column_height(col);
    let left = col.checked_sub(1);
    let right = (col + 1 < grid.cols()).then_some(col + 1);
    let target = match (left, right) {
        (Some(l), Some(r)) => {
            if grid.column_height(r) < grid.column_height(l) {
                r
            } else {
                l
            }
        }
        (Some(l), None) => l,
        (None, Some(r)) => r,
        (None, None) => return None,
    };
    (height > grid.column_height(target) + max_steepness).then_some(target)
}

/// Slides the top block of every over-steep column into its lower neighbour,
/// one block per column per pass, until nothing is steep or `pass_cap` passes
/// have run. Expects a compacted grid.
pub fn stabilize(grid: &mut Grid, max_steepness: usize, pass_cap: u32) -> Stability {
    let mut report = Stability::default();
    let rows = grid.rows();
    loop {
        if !(0..grid.cols()).any(|c| steep_neighbor(grid, c, max_steepness).is_some()) {
            report.converged = true;
            return report;
        }
        if report.passes >= pass_cap {
            return report;
        }
        report.passes += 1;
        for col in 0..grid.cols() {
            let Some(target) = steep_neighbor(grid, col, max_steepness) else {
                continue;
            };
            let from = (rows - grid.column_height(col), col);
            let cell = grid.take(from.0, from.1);
            let above_target = rows - grid.column_height(target) - 1;
            grid.set(above_target, target, cell);
            grid.compact_column(target);
            report.slides.push(Slide {
                from,
                to: (rows - grid.column_height(target), target),
            });
        }
    }
}

/// A connected same-colour group built from enough distinct pieces to pop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub color: u8,
    pub cells: Vec<Pos>,
    pub pieces: usize,
}

pub fn find_matches(grid: &Grid) -> Vec<MatchGroup> {
    let mut visited = vec![false; grid.cell_count()];
    let mut groups = Vec::new();
    for (row, col, cell) in grid.occupied() {
        let Some(color) = cell.color() else {
            continue;
        };
        let cells = grid.flood_fill_marking(row, col, color, &mut visited);
        if cells.is_empty() {
            continue;
        }
        let pieces = cells
            .iter()
            .filter_map(|&(r, c)| grid.get(r, c).and_then(|cell| cell.piece()))
            .collect::<HashSet<PieceId>>()
            .len();
        if pieces >= MATCH_MIN_PIECES {
            groups.push(MatchGroup {
                color,
                cells,
                pieces,
            });
        }
    }
    groups
}

/// Marks complete rows, bottom to top. Returns the rows that had at least one
/// unscored block; fully scored rows grant nothing.
pub fn charge_lines(grid: &mut Grid) -> Vec<usize> {
    let mut charged = Vec::new();
    for row in (0..grid.rows()).rev() {
        if grid.row_is_complete(row) && grid.mark_row_scored(row) {
            charged.push(row);
        }
    }
    charged
}

/// Outcome of one full resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub slides: Vec<Slide>,
    /// Popped groups with the wave (1-based combo) they popped in.
    pub popped: Vec<(u32, MatchGroup)>,
    pub waves: u32,
    pub match_score: u32,
    pub charged_rows: Vec<usize>,
    pub stability_cap_hits: u32,
    pub chain_capped: bool,
}

/// Runs gravity, the tumble rule and match waves to a fixpoint, then charges
/// lines. Combo starts at zero and rises by one per popping wave.
pub fn resolve(grid: &mut Grid, rules: &Rules) -> Resolution {
    let mut out = Resolution::default();
    grid.apply_gravity();
    loop {
        if let Some(max) = rules.max_steepness {
            let stability = stabilize(grid, max, rules.stability_pass_cap);
            if !stability.converged {
                out.stability_cap_hits += 1;
            }
            out.slides.extend(stability.slides);
        }
        let groups = find_matches(grid);
        if groups.is_empty() {
            break;
        }
        if out.waves >= rules.chain_wave_cap {
            out.chain_capped = true;
            break;
        }
        out.waves += 1;
        let mut cleared = 0u32;
        for group in &groups {
            for &(r, c) in &group.cells {
                grid.take(r, c);
            }
            cleared += group.cells.len() as u32;
        }
        let wave = out.waves;
        out.match_score += cleared * MATCH_SCORE_PER_CELL * wave;
        out.popped.extend(groups.into_iter().map(|g| (wave, g)));
        grid.apply_gravity();
    }
    out.charged_rows = charge_lines(grid);
    out
}
