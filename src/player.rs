//! One player's side of the race: the falling piece, landing, special
//! pieces, block decay and the power meter.

use crate::events::{GameEvent, Pos};
use crate::generator::PieceGenerator;
use crate::grid::{Grid, LIMIT_LINE_ROW};
use crate::piece::{Piece, PieceKind};
use crate::resolver::{self, Resolution};
use crate::rules::{POWER_MAX, Rules};
use rand::Rng;

pub const PLACE_SCORE_PER_CELL: u32 = 10;
pub const TNT_SCORE_PER_CELL: u32 = 20;
pub const BOMB_SCORE_PER_CELL: u32 = 10;
/// TNT clears a (2r+1)² square.
const TNT_RADIUS: i32 = 1;
/// Decay picks blocks in the tallest column(s) this many times as often.
const DECAY_TALL_WEIGHT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    fn delta(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Held above the grid; may move and rotate.
    Queued,
    /// Dropping. `progress` is in thousandths of a row below `start_row`.
    Falling { start_row: i32, progress: u64 },
}

/// Current piece with its column and motion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    pub piece: Piece,
    pub col: i32,
    pub motion: Motion,
}

impl ActivePiece {
    fn queued(piece: Piece, col: i32) -> Self {
        Self {
            piece,
            col,
            motion: Motion::Queued,
        }
    }

    /// Anchor row that keeps the whole footprint above the top edge.
    pub fn queued_row(piece: &Piece) -> i32 {
        let (_, max_row, _, _) = piece.extents();
        -(max_row + 1)
    }

    pub fn row(&self) -> i32 {
        match self.motion {
            Motion::Queued => Self::queued_row(&self.piece),
            Motion::Falling {
                start_row,
                progress,
            } => start_row + (progress / 1000) as i32,
        }
    }

    #[inline]
    pub fn is_falling(&self) -> bool {
        matches!(self.motion, Motion::Falling { .. })
    }

    /// Footprint in grid coordinates (rows may be negative).
    pub fn cells(&self) -> Vec<(i32, i32)> {
        let row = self.row();
        self.piece
            .offsets()
            .into_iter()
            .map(|(dr, dc)| (row + dr, self.col + dc))
            .collect()
    }
}

/// Bottom rows to wipe on the opponent's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attack {
    pub rows: usize,
}

fn spawn_col(piece: &Piece, cols: usize) -> i32 {
    let (_, _, c0, _) = piece.extents();
    (cols.saturating_sub(piece.width()) / 2) as i32 - c0
}

fn clamp_col(piece: &Piece, col: i32, cols: usize) -> i32 {
    let (_, _, c0, c1) = piece.extents();
    col.clamp(-c0, (cols as i32 - 1 - c1).max(-c0))
}

#[derive(Debug, Clone)]
pub struct Player {
    rules: Rules,
    grid: Grid,
    active: ActivePiece,
    next: Piece,
    score: u32,
    power: u32,
    combo: u32,
    lines_charged: u32,
    clock_ms: u64,
    decay_due_ms: Option<u64>,
    events: Vec<GameEvent>,
}

impl Player {
    pub fn new(rules: &Rules, generator: &mut PieceGenerator) -> Self {
        let first = generator.next(rules, 0);
        let next = generator.next(rules, 0);
        let col = spawn_col(&first, rules.cols);
        let decay_due_ms = rules
            .decay_window_ms
            .map(|(min, max)| generator.rng().random_range(min..=max));
        Self {
            rules: rules.clone(),
            grid: Grid::new(rules.rows, rules.cols),
            active: ActivePiece::queued(first, col),
            next,
            score: 0,
            power: 0,
            combo: 0,
            lines_charged: 0,
            clock_ms: 0,
            decay_due_ms,
            events: Vec::new(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn active(&self) -> &ActivePiece {
        &self.active
    }

    pub fn next_piece(&self) -> &Piece {
        &self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn power(&self) -> u32 {
        self.power
    }

    /// Waves popped by the most recent resolution.
    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn lines_charged(&self) -> u32 {
        self.lines_charged
    }

    /// Milliseconds until block decay fires, if decay is enabled.
    pub fn decay_due_in_ms(&self) -> Option<u64> {
        self.decay_due_ms
            .map(|due| due.saturating_sub(self.clock_ms))
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Shifts the queued piece one column. Rejected while falling or if the
    /// footprint would leave the grid or overlap a block.
    pub fn move_active(&mut self, direction: Direction) -> bool {
        if self.active.is_falling() {
            return false;
        }
        let col = self.active.col + direction.delta();
        if !self.grid.can_place(&self.active.piece, self.active.row(), col) {
            return false;
        }
        self.active.col = col;
        true
    }

    /// Turns the queued tetromino clockwise; reverted if it would not fit.
    pub fn rotate_active(&mut self) -> bool {
        if self.active.is_falling() || !self.active.piece.can_rotate() {
            return false;
        }
        let turned = self.active.piece.rotated_cw();
        let row = ActivePiece::queued_row(&turned);
        if !self.grid.can_place(&turned, row, self.active.col) {
            return false;
        }
        self.active.piece = turned;
        true
    }

    /// Releases the queued piece. Cannot be undone.
    pub fn drop_active(&mut self) -> bool {
        if self.active.is_falling() {
            return false;
        }
        self.active.motion = Motion::Falling {
            start_row: self.active.row(),
            progress: 0,
        };
        true
    }

    /// Lowest anchor row the active piece reaches falling straight down from
    /// above the grid. The tightest column decides.
    pub fn landing_row(&self) -> i32 {
        let piece = &self.active.piece;
        let col = self.active.col;
        let mut row = ActivePiece::queued_row(piece);
        while self.grid.can_place(piece, row + 1, col) {
            row += 1;
        }
        row
    }

    /// Advances the falling piece and the decay timer. Returns attacks to be
    /// delivered to the opponent.
    pub fn tick(&mut self, delta_ms: u64, generator: &mut PieceGenerator) -> Vec<Attack> {
        self.clock_ms += delta_ms;
        let mut attacks = Vec::new();
        if let Motion::Falling {
            start_row,
            progress,
        } = self.active.motion
        {
            self.active.motion = Motion::Falling {
                start_row,
                progress: progress + delta_ms * u64::from(self.rules.drop_speed),
            };
            let landing = self.landing_row();
            if self.active.row() >= landing {
                attacks.extend(self.land(landing, generator));
            }
        }
        if self.decay_due_ms.is_some_and(|due| self.clock_ms >= due) {
            attacks.extend(self.fire_decay(generator));
        }
        attacks
    }

    /// Wipes the bottom rows; whatever stood on them keeps floating until the
    /// next resolution pulls it down.
    pub fn receive_attack(&mut self, attack: Attack) {
        let cleared = self.grid.clear_bottom_rows(attack.rows);
        self.events.push(GameEvent::AttackReceived { cleared });
    }

    /// True once any block reaches the limit line.
    pub fn check_win_condition(&self) -> bool {
        self.grid.row_has_block(LIMIT_LINE_ROW)
    }

    fn land(&mut self, row: i32, generator: &mut PieceGenerator) -> Option<Attack> {
        let piece = self.active.piece.clone();
        let col = self.active.col;
        let (min_row, _, _, _) = piece.extents();
        if row + min_row < 0 {
            self.refuse_landing();
            return None;
        }
        self.combo = 0;
        match piece.kind {
            PieceKind::Tnt => self.detonate(row, col),
            PieceKind::ColorBomb => self.fire_bomb(row, col),
            PieceKind::Block | PieceKind::Bar | PieceKind::Tetromino(_) => {
                if self.grid.place(&piece, row, col).is_err() {
                    self.refuse_landing();
                    return None;
                }
                let cells: Vec<Pos> = piece
                    .offsets()
                    .into_iter()
                    .filter_map(|(dr, dc)| self.grid.position(row + dr, col + dc))
                    .collect();
                self.score += PLACE_SCORE_PER_CELL * cells.len() as u32;
                self.events.push(GameEvent::Landed {
                    cells,
                    color: piece.color.unwrap_or_default(),
                });
            }
        }
        let attack = self.settle();
        self.spawn_next(generator);
        attack
    }

    fn refuse_landing(&mut self) {
        self.active.motion = Motion::Queued;
        self.events.push(GameEvent::Blocked {
            col: self.active.col,
        });
    }

    fn detonate(&mut self, row: i32, col: i32) {
        let cells = self.grid.clear_area(row, col, TNT_RADIUS);
        self.score += TNT_SCORE_PER_CELL * cells.len() as u32;
        self.events.push(GameEvent::Exploded {
            center: (row.max(0) as usize, col.max(0) as usize),
            cells,
        });
    }

    /// Clears every block sharing the colour of the block under the bomb, or
    /// fizzles when there is none.
    fn fire_bomb(&mut self, row: i32, col: i32) {
        let target = self
            .grid
            .position(row + 1, col)
            .and_then(|(r, c)| self.grid.get(r, c))
            .and_then(|cell| cell.color());
        match target {
            Some(color) => {
                let cells = self.grid.clear_color(color);
                self.score += BOMB_SCORE_PER_CELL * cells.len() as u32;
                self.events.push(GameEvent::BombFired { color, cells });
            }
            None => self.events.push(GameEvent::BombFizzled { col }),
        }
    }

    fn settle(&mut self) -> Option<Attack> {
        let resolution = resolver::resolve(&mut self.grid, &self.rules);
        self.absorb(resolution)
    }

    fn absorb(&mut self, res: Resolution) -> Option<Attack> {
        for slide in res.slides {
            self.events.push(GameEvent::Slid {
                from: slide.from,
                to: slide.to,
            });
        }
        for (wave, group) in res.popped {
            self.events.push(GameEvent::Popped {
                cells: group.cells,
                color: group.color,
                wave,
            });
        }
        for _ in 0..res.stability_cap_hits {
            self.events.push(GameEvent::StabilityCapReached {
                passes: self.rules.stability_pass_cap,
            });
        }
        if res.chain_capped {
            self.events.push(GameEvent::ChainCapReached { waves: res.waves });
        }
        self.combo = res.waves;
        self.score += res.match_score;
        for row in res.charged_rows {
            self.lines_charged += 1;
            self.score += self.rules.line_bonus;
            self.power += self.rules.power_per_line;
            self.events.push(GameEvent::LineCharged { row });
        }
        if self.power < POWER_MAX {
            return None;
        }
        self.power = 0;
        let rows = self.rules.attack_rows;
        self.events.push(GameEvent::AttackLaunched { rows });
        Some(Attack { rows })
    }

    fn spawn_next(&mut self, generator: &mut PieceGenerator) {
        let upcoming = generator.next(&self.rules, self.grid.tallest_column_height());
        let piece = std::mem::replace(&mut self.next, upcoming);
        let col = clamp_col(&piece, self.active.col, self.rules.cols);
        self.active = ActivePiece::queued(piece, col);
    }

    /// Removes a random block's whole same-colour cluster, favouring the
    /// tallest column(s), then reschedules.
    fn fire_decay(&mut self, generator: &mut PieceGenerator) -> Option<Attack> {
        let Some((min, max)) = self.rules.decay_window_ms else {
            self.decay_due_ms = None;
            return None;
        };
        self.decay_due_ms = Some(self.clock_ms + generator.rng().random_range(min..=max));
        let (row, col, color) = self.pick_decay_target(generator)?;
        let cells = self.grid.flood_fill(row, col, color);
        for &(r, c) in &cells {
            self.grid.take(r, c);
        }
        self.events.push(GameEvent::Decayed { cells, color });
        self.combo = 0;
        self.settle()
    }

    fn pick_decay_target(&self, generator: &mut PieceGenerator) -> Option<(usize, usize, u8)> {
        let tallest = self.grid.tallest_column_height();
        let weighted: Vec<(usize, usize, u8, u32)> = self
            .grid
            .occupied()
            .filter_map(|(r, c, cell)| {
                let weight = if self.grid.column_height(c) == tallest {
                    DECAY_TALL_WEIGHT
                } else {
                    1
                };
                cell.color().map(|color| (r, c, color, weight))
            })
            .collect();
        let total: u32 = weighted.iter().map(|w| w.3).sum();
        if total == 0 {
            return None;
        }
        let mut pick = generator.rng().random_range(0..total);
        for (r, c, color, weight) in weighted {
            if pick < weight {
                return Some((r, c, color));
            }
            pick -= weight;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Variant;
    use crate::grid::Cell;
    use crate::piece::TetrominoKind;

    fn calm(variant: Variant) -> Rules {
        Rules {
            tnt_chance: 0.0,
            color_bomb_chance: 0.0,
            ..Rules::for_variant(variant)
        }
    }

    fn player(rules: &Rules) -> (Player, PieceGenerator) {
        let mut generator = PieceGenerator::new(11);
        let player = Player::new(rules, &mut generator);
        (player, generator)
    }

    fn block(color: u8, id: u32) -> Piece {
        Piece::new(PieceKind::Block, Some(color), id)
    }

    /// Drops the given piece at `col` and ticks until it lands.
    fn drop_at(p: &mut Player, g: &mut PieceGenerator, piece: Piece, col: i32) -> Vec<Attack> {
        p.active = ActivePiece::queued(piece, col);
        assert!(p.drop_active());
        let mut attacks = Vec::new();
        for _ in 0..100 {
            attacks.extend(p.tick(50, g));
            if !p.active.is_falling() {
                break;
            }
        }
        attacks
    }

    #[test]
    fn test_move_stops_at_walls() {
        let rules = calm(Variant::Classic);
        let (mut p, _) = player(&rules);
        p.active = ActivePiece::queued(block(0, 1), 0);
        assert!(!p.move_active(Direction::Left));
        assert_eq!(p.active.col, 0);
        assert!(p.move_active(Direction::Right));
        p.active.col = 3;
        assert!(!p.move_active(Direction::Right));
    }

    #[test]
    fn test_no_moves_while_falling() {
        let rules = calm(Variant::Classic);
        let (mut p, _) = player(&rules);
        p.active = ActivePiece::queued(block(0, 1), 1);
        assert!(p.drop_active());
        assert!(!p.drop_active());
        assert!(!p.move_active(Direction::Left));
        assert_eq!(p.active.col, 1);
    }

    #[test]
    fn test_falls_at_drop_speed_then_lands_on_floor() {
        let rules = calm(Variant::Classic);
        let (mut p, mut g) = player(&rules);
        p.active = ActivePiece::queued(block(1, 500), 2);
        p.drop_active();
        p.tick(250, &mut g);
        assert_eq!(p.active.row(), -1 + 3);
        p.tick(750, &mut g);
        assert_eq!(p.grid.get(11, 2), Some(Cell::block(1, 500)));
        assert_eq!(p.score(), PLACE_SCORE_PER_CELL);
        assert!(!p.active.is_falling());
    }

    #[test]
    fn test_next_piece_is_promoted() {
        let rules = calm(Variant::Classic);
        let (mut p, mut g) = player(&rules);
        let queued = p.next.clone();
        drop_at(&mut p, &mut g, block(1, 500), 0);
        assert_eq!(p.active.piece, queued);
        assert_ne!(p.next.id, queued.id);
    }

    #[test]
    fn test_three_stacked_drops_pop() {
        let rules = calm(Variant::Classic);
        let (mut p, mut g) = player(&rules);
        for id in 1..=3 {
            drop_at(&mut p, &mut g, block(2, 900 + id), 0);
        }
        assert_eq!(p.grid.occupied_count(), 0);
        assert_eq!(p.score(), 3 * PLACE_SCORE_PER_CELL + 3 * 15);
        assert_eq!(p.combo(), 1);
        let events = p.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::Popped { wave: 1, .. })));
    }

    #[test]
    fn test_bar_lands_on_tallest_column() {
        let rules = calm(Variant::Bars);
        let (mut p, mut g) = player(&rules);
        p.grid.set(13, 1, Cell::block(0, 100));
        p.grid.set(12, 1, Cell::block(1, 101));
        p.grid.set(13, 2, Cell::block(2, 102));
        p.grid.set(12, 2, Cell::block(0, 103));
        let bar = Piece::new(PieceKind::Bar, Some(3), 300);
        p.active = ActivePiece::queued(bar.clone(), 0);
        assert_eq!(p.landing_row(), 11);
        drop_at(&mut p, &mut g, bar, 0);
        // the overhanging half drops to the floor of column 0
        assert_eq!(p.grid.get(13, 0).and_then(|c| c.piece()), Some(300));
        assert_eq!(p.grid.get(11, 1).and_then(|c| c.piece()), Some(300));
    }

    #[test]
    fn test_line_charge_grants_power_once() {
        let rules = calm(Variant::Classic);
        let (mut p, mut g) = player(&rules);
        p.grid.set(11, 0, Cell::block(0, 100));
        p.grid.set(11, 1, Cell::block(1, 101));
        p.grid.set(11, 2, Cell::block(2, 102));
        drop_at(&mut p, &mut g, block(3, 103), 3);
        assert_eq!(p.power(), rules.power_per_line);
        assert_eq!(p.lines_charged(), 1);
        assert_eq!(p.grid.occupied_count(), 4);
        drop_at(&mut p, &mut g, block(4, 104), 0);
        assert_eq!(p.power(), rules.power_per_line);
    }

    #[test]
    fn test_full_meter_launches_attack() {
        let rules = calm(Variant::Classic);
        let (mut p, mut g) = player(&rules);
        p.power = 100 - rules.power_per_line;
        p.grid.set(11, 0, Cell::block(0, 100));
        p.grid.set(11, 1, Cell::block(1, 101));
        p.grid.set(11, 2, Cell::block(2, 102));
        let attacks = drop_at(&mut p, &mut g, block(3, 103), 3);
        assert_eq!(attacks, vec![Attack { rows: 3 }]);
        assert_eq!(p.power(), 0);
    }

    #[test]
    fn test_receive_attack_wipes_bottom_rows_without_gravity() {
        let rules = calm(Variant::Classic);
        let (mut p, _) = player(&rules);
        for row in 7..12 {
            p.grid.set(row, 0, Cell::block((row % 5) as u8, row as u32));
        }
        p.grid.set(11, 3, Cell::block(1, 50));
        p.receive_attack(Attack { rows: 3 });
        assert_eq!(p.grid.occupied_count(), 2);
        assert!(p.grid.is_occupied(7, 0));
        assert!(p.grid.is_occupied(8, 0));
        assert!(!p.grid.is_occupied(11, 0));
    }

    #[test]
    fn test_tnt_clears_neighbourhood_and_vanishes() {
        let rules = calm(Variant::Classic);
        let (mut p, mut g) = player(&rules);
        for (row, col, color) in [(11, 0, 0), (11, 1, 1), (11, 2, 2), (10, 0, 3), (10, 2, 4), (11, 3, 0)] {
            p.grid.set(row, col, Cell::block(color, (row * 10 + col) as u32));
        }
        drop_at(&mut p, &mut g, Piece::new(PieceKind::Tnt, None, 0), 1);
        // TNT rests at (10, 1); its 3x3 covers columns 0..=2 of rows 9..=11
        assert_eq!(p.grid.occupied_count(), 1);
        assert!(p.grid.is_occupied(11, 3));
        assert_eq!(p.score(), 5 * TNT_SCORE_PER_CELL);
    }

    #[test]
    fn test_blocks_above_blast_fall_and_pop() {
        let rules = calm(Variant::Classic);
        let (mut p, mut g) = player(&rules);
        for (row, col, color, id) in [
            (6, 0, 2, 1),
            (7, 0, 2, 2),
            (8, 0, 0, 3),
            (9, 0, 1, 4),
            (10, 0, 0, 5),
            (11, 0, 2, 6),
            (10, 1, 3, 7),
            (11, 1, 4, 8),
        ] {
            p.grid.set(row, col, Cell::block(color, id));
        }
        drop_at(&mut p, &mut g, Piece::new(PieceKind::Tnt, None, 0), 1);
        // blast at (9, 1) takes rows 8..=10 of column 0 and (10, 1); the two
        // colour 2 blocks drop onto the third and pop
        let events = p.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::Exploded { cells, .. } if cells.len() == 4)));
        assert!(events.iter().any(|e| matches!(e, GameEvent::Popped { cells, color: 2, .. } if cells.len() == 3)));
        assert_eq!(p.grid.occupied_count(), 1);
        assert_eq!(p.grid.get(11, 1).and_then(|c| c.color()), Some(4));
        assert_eq!(p.score(), 4 * TNT_SCORE_PER_CELL + 3 * 15);
        assert_eq!(p.combo(), 1);
    }

    #[test]
    fn test_bomb_fizzles_on_floor() {
        let rules = calm(Variant::Decay);
        let (mut p, mut g) = player(&rules);
        p.decay_due_ms = None;
        drop_at(&mut p, &mut g, Piece::new(PieceKind::ColorBomb, None, 0), 2);
        assert_eq!(p.grid.occupied_count(), 0);
        let events = p.drain_events();
        assert!(events.contains(&GameEvent::BombFizzled { col: 2 }));
        assert!(!p.active.piece.is_special());
    }

    #[test]
    fn test_bomb_clears_colour_beneath() {
        let rules = calm(Variant::Decay);
        let (mut p, mut g) = player(&rules);
        p.decay_due_ms = None;
        p.grid.set(15, 0, Cell::block(3, 1));
        p.grid.set(15, 5, Cell::block(3, 2));
        p.grid.set(15, 6, Cell::block(1, 3));
        p.grid.set(14, 6, Cell::block(3, 4));
        drop_at(&mut p, &mut g, Piece::new(PieceKind::ColorBomb, None, 0), 0);
        assert_eq!(p.grid.occupied_count(), 1);
        assert_eq!(p.grid.get(15, 6).and_then(|c| c.color()), Some(1));
        assert_eq!(p.score(), 3 * BOMB_SCORE_PER_CELL);
    }

    #[test]
    fn test_bomb_clear_leaves_steep_column_that_tumbles() {
        let rules = calm(Variant::Decay);
        let (mut p, mut g) = player(&rules);
        p.decay_due_ms = None;
        for (row, color) in [(12, 0), (13, 1), (14, 0), (15, 1)] {
            p.grid.set(row, 0, Cell::block(color, row as u32));
        }
        for row in 13..16 {
            p.grid.set(row, 1, Cell::block(3, 50));
        }
        drop_at(&mut p, &mut g, Piece::new(PieceKind::ColorBomb, None, 0), 1);
        let events = p.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::BombFired { color: 3, .. })));
        assert!(events.contains(&GameEvent::Slid {
            from: (12, 0),
            to: (15, 1),
        }));
        assert!(!p.grid.is_occupied(12, 0));
        assert_eq!(p.grid.get(15, 1).and_then(|c| c.color()), Some(0));
        assert_eq!(p.score(), 3 * BOMB_SCORE_PER_CELL);
    }

    #[test]
    fn test_decay_prefers_tallest_column() {
        let rules = calm(Variant::Decay);
        let (mut p, mut g) = player(&rules);
        p.grid.set(14, 0, Cell::block(0, 1));
        p.grid.set(15, 0, Cell::block(1, 2));
        p.grid.set(15, 3, Cell::block(2, 3));
        let mut hits = [0u32; 3];
        for _ in 0..7_000 {
            match p.pick_decay_target(&mut g) {
                Some((14, 0, 0)) => hits[0] += 1,
                Some((15, 0, 1)) => hits[1] += 1,
                Some((15, 3, 2)) => hits[2] += 1,
                other => panic!("unexpected target {other:?}"),
            }
        }
        // weights 3 : 3 : 1
        assert!((2_700..3_300).contains(&hits[0]), "{hits:?}");
        assert!((2_700..3_300).contains(&hits[1]), "{hits:?}");
        assert!((800..1_200).contains(&hits[2]), "{hits:?}");
    }

    #[test]
    fn test_decay_removes_whole_cluster_and_reschedules() {
        let rules = calm(Variant::Decay);
        let (mut p, mut g) = player(&rules);
        p.grid.set(15, 0, Cell::block(2, 1));
        p.grid.set(15, 1, Cell::block(2, 2));
        p.decay_due_ms = Some(p.clock_ms);
        p.tick(1, &mut g);
        assert_eq!(p.grid.occupied_count(), 0);
        let due = p.decay_due_in_ms().unwrap();
        assert!((8_000..=12_000).contains(&due));
    }

    #[test]
    fn test_decay_on_empty_grid_only_reschedules() {
        let rules = calm(Variant::Decay);
        let (mut p, mut g) = player(&rules);
        p.decay_due_ms = Some(0);
        assert!(p.tick(5, &mut g).is_empty());
        assert!(p.decay_due_in_ms().is_some_and(|d| d >= 7_995));
    }

    #[test]
    fn test_full_column_refuses_landing() {
        let rules = calm(Variant::Classic);
        let (mut p, mut g) = player(&rules);
        for row in 0..12 {
            p.grid.set(row, 0, Cell::block((row % 2) as u8, row as u32));
        }
        p.active = ActivePiece::queued(block(4, 77), 0);
        p.drop_active();
        p.tick(100, &mut g);
        assert!(!p.active.is_falling());
        assert_eq!(p.active.piece.id, 77);
        assert!(p.drain_events().contains(&GameEvent::Blocked { col: 0 }));
    }

    #[test]
    fn test_win_condition_on_limit_row() {
        let rules = calm(Variant::Classic);
        let (mut p, _) = player(&rules);
        p.grid.set(2, 1, Cell::block(0, 1));
        assert!(!p.check_win_condition());
        p.grid.set(LIMIT_LINE_ROW, 1, Cell::block(0, 2));
        assert!(p.check_win_condition());
    }

    #[test]
    fn test_rotation_reverts_at_wall() {
        let rules = calm(Variant::Tetromino);
        let (mut p, _) = player(&rules);
        let mut i = Piece::new(PieceKind::Tetromino(TetrominoKind::I), Some(0), 5);
        i.rotation = 1;
        p.active = ActivePiece::queued(i, -1);
        assert!(!p.rotate_active());
        assert_eq!(p.active.piece.rotation, 1);
        p.active.col = 4;
        assert!(p.rotate_active());
        assert_eq!(p.active.piece.rotation, 2);
    }

    #[test]
    fn test_square_does_not_rotate() {
        let rules = calm(Variant::Tetromino);
        let (mut p, _) = player(&rules);
        let o = Piece::new(PieceKind::Tetromino(TetrominoKind::O), Some(0), 5);
        p.active = ActivePiece::queued(o, 3);
        assert!(!p.rotate_active());
    }

    #[test]
    fn test_stability_slides_tall_column() {
        let rules = calm(Variant::Bars);
        let (mut p, mut g) = player(&rules);
        for row in 11..14 {
            p.grid.set(row, 0, Cell::block((row % 4) as u8, row as u32));
        }
        // a fourth block on column 0 makes it 4 above column 1
        drop_at(&mut p, &mut g, block(0, 400), 0);
        assert_eq!(p.grid.column_height(0), 3);
        assert_eq!(p.grid.column_height(1), 1);
        assert!(p.drain_events().iter().any(|e| matches!(e, GameEvent::Slid { .. })));
    }
}
