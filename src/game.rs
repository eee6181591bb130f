//! Session: one or two players racing on the same seeded piece stream.

use crate::PlayerMode;
use crate::events::GameEvent;
use crate::generator::PieceGenerator;
use crate::player::{Direction, Player};
use crate::rules::{Rules, RulesError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::One => "P1",
            Self::Two => "P2",
        }
    }
}

/// Already-resolved player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Move(Direction),
    Rotate,
    Drop,
}

#[derive(Debug)]
pub struct Game {
    rules: Rules,
    mode: PlayerMode,
    seed: u64,
    generator: PieceGenerator,
    players: Vec<Player>,
    winner: Option<PlayerSlot>,
    elapsed_ms: u64,
}

impl Game {
    pub fn new(rules: Rules, mode: PlayerMode, seed: u64) -> Result<Self, RulesError> {
        rules.validate()?;
        let mut generator = PieceGenerator::new(seed);
        let count = match mode {
            PlayerMode::Single => 1,
            PlayerMode::Versus => 2,
        };
        let players = (0..count)
            .map(|_| Player::new(&rules, &mut generator))
            .collect();
        Ok(Self {
            rules,
            mode,
            seed,
            generator,
            players,
            winner: None,
            elapsed_ms: 0,
        })
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn mode(&self) -> PlayerMode {
        self.mode
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn winner(&self) -> Option<PlayerSlot> {
        self.winner
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn player(&self, slot: PlayerSlot) -> Option<&Player> {
        self.players.get(slot.index())
    }

    /// Slots in play, in tick order.
    pub fn slots(&self) -> impl Iterator<Item = PlayerSlot> + '_ {
        PlayerSlot::ALL
            .into_iter()
            .take(self.players.len())
    }

    /// Applies an intent; false when it was rejected or the race is over.
    fn apply(&mut self, slot: PlayerSlot, intent: Intent) -> bool {
        if self.winner.is_some() {
            return false;
        }
        let Some(player) = self.players.get_mut(slot.index()) else {
            return false;
        };
        match intent {
            Intent::Move(direction) => player.move_active(direction),
            Intent::Rotate => player.rotate_active(),
            Intent::Drop => player.drop_active(),
        }
    }

    pub fn move_active(&mut self, slot: PlayerSlot, direction: Direction) -> bool {
        self.apply(slot, Intent::Move(direction))
    }

    pub fn rotate_active(&mut self, slot: PlayerSlot) -> bool {
        self.apply(slot, Intent::Rotate)
    }

    pub fn drop_active(&mut self, slot: PlayerSlot) -> bool {
        self.apply(slot, Intent::Drop)
    }

    /// Advances every player by `delta_ms`, routing attacks to the opponent
    /// as soon as they fire. Returns the winner once there is one.
    pub fn tick(&mut self, delta_ms: u64) -> Option<PlayerSlot> {
        if self.winner.is_some() {
            return self.winner;
        }
        self.elapsed_ms += delta_ms;
        for slot in PlayerSlot::ALL.into_iter().take(self.players.len()) {
            let attacks = self.players[slot.index()].tick(delta_ms, &mut self.generator);
            if let Some(opponent) = self.players.get_mut(slot.opponent().index()) {
                for attack in attacks {
                    opponent.receive_attack(attack);
                }
            }
            if self.players[slot.index()].check_win_condition() {
                self.winner = Some(slot);
                break;
            }
        }
        self.winner
    }

    /// Pending notifications from every player, tagged with their slot.
    pub fn drain_events(&mut self) -> Vec<(PlayerSlot, GameEvent)> {
        let mut out = Vec::new();
        for (i, player) in self.players.iter_mut().enumerate() {
            let slot = PlayerSlot::ALL[i];
            out.extend(player.drain_events().into_iter().map(|e| (slot, e)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Variant;
    use crate::grid::Cell;

    fn calm(variant: Variant) -> Rules {
        Rules {
            tnt_chance: 0.0,
            color_bomb_chance: 0.0,
            ..Rules::for_variant(variant)
        }
    }

    fn drop_and_settle(game: &mut Game, slot: PlayerSlot) {
        game.drop_active(slot);
        for _ in 0..100 {
            game.tick(50);
            if game.player(slot).is_none_or(|p| !p.active().is_falling()) {
                break;
            }
        }
    }

    #[test]
    fn test_single_has_one_player() {
        let game = Game::new(calm(Variant::Classic), PlayerMode::Single, 1).unwrap();
        assert_eq!(game.slots().count(), 1);
        assert!(game.player(PlayerSlot::Two).is_none());
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let rules = Rules {
            drop_speed: 0,
            ..calm(Variant::Classic)
        };
        assert!(matches!(
            Game::new(rules, PlayerMode::Versus, 1),
            Err(RulesError::ZeroDropSpeed)
        ));
    }

    #[test]
    fn test_same_seed_same_race() {
        let script = [
            (PlayerSlot::One, Intent::Move(Direction::Left)),
            (PlayerSlot::Two, Intent::Move(Direction::Right)),
            (PlayerSlot::One, Intent::Drop),
            (PlayerSlot::Two, Intent::Drop),
        ];
        let run = || {
            let mut game = Game::new(Rules::for_variant(Variant::Decay), PlayerMode::Versus, 99).unwrap();
            for _ in 0..40 {
                for (slot, intent) in script {
                    game.apply(slot, intent);
                }
                for _ in 0..30 {
                    game.tick(50);
                }
            }
            game.slots()
                .filter_map(|s| game.player(s).map(|p| (p.grid().clone(), p.score(), p.power())))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_players_get_distinct_pieces_from_shared_stream() {
        let game = Game::new(calm(Variant::Bars), PlayerMode::Versus, 5).unwrap();
        let one = game.player(PlayerSlot::One).unwrap().active().piece.id;
        let two = game.player(PlayerSlot::Two).unwrap().active().piece.id;
        assert_ne!(one, two);
    }

    #[test]
    fn test_intents_only_reach_their_player() {
        let mut game = Game::new(calm(Variant::Bars), PlayerMode::Versus, 5).unwrap();
        let before = game.player(PlayerSlot::Two).unwrap().active().col;
        assert!(game.move_active(PlayerSlot::One, Direction::Left));
        assert_eq!(game.player(PlayerSlot::Two).unwrap().active().col, before);
    }

    #[test]
    fn test_reaching_limit_line_wins_and_freezes() {
        let rules = Rules {
            rows: 3,
            ..calm(Variant::Classic)
        };
        let mut game = Game::new(rules, PlayerMode::Versus, 3).unwrap();
        // column 0 of P1 reaches row 1 after two landings unless they pop
        let mut guard = 0;
        while game.winner().is_none() && guard < 50 {
            drop_and_settle(&mut game, PlayerSlot::One);
            guard += 1;
        }
        assert_eq!(game.winner(), Some(PlayerSlot::One));
        let elapsed = game.elapsed_ms();
        assert_eq!(game.tick(1000), Some(PlayerSlot::One));
        assert_eq!(game.elapsed_ms(), elapsed);
        assert!(!game.drop_active(PlayerSlot::Two));
    }

    /// One completed line fills the meter. Player 1's bottom row lacks only
    /// its rightmost block, and the active piece is parked above that gap.
    fn primed_for_attack(mode: PlayerMode) -> Game {
        let rules = Rules {
            power_per_line: 100,
            ..calm(Variant::Classic)
        };
        let mut game = Game::new(rules, mode, 21).unwrap();
        let grid = game.players[0].grid_mut();
        for col in 0..3 {
            grid.set(11, col, Cell::block(col as u8, 100 + col as u32));
        }
        while game.move_active(PlayerSlot::One, Direction::Right) {}
        game
    }

    #[test]
    fn test_attack_reaches_opponent_in_the_same_tick() {
        let mut game = primed_for_attack(PlayerMode::Versus);
        let grid = game.players[1].grid_mut();
        for row in 6..12 {
            grid.set(row, 0, Cell::block((row % 2) as u8, row as u32));
        }
        grid.set(11, 2, Cell::block(3, 40));
        drop_and_settle(&mut game, PlayerSlot::One);

        let attacker = game.player(PlayerSlot::One).unwrap();
        assert_eq!(attacker.power(), 0);
        assert_eq!(attacker.lines_charged(), 1);
        let defender = game.player(PlayerSlot::Two).unwrap().grid();
        assert!((9..12).all(|row| !defender.row_has_block(row)));
        assert!((6..9).all(|row| defender.is_occupied(row, 0)));
        assert_eq!(defender.occupied_count(), 3);

        let events = game.drain_events();
        assert!(events.contains(&(PlayerSlot::One, GameEvent::AttackLaunched { rows: 3 })));
        assert!(events.contains(&(PlayerSlot::Two, GameEvent::AttackReceived { cleared: 4 })));
    }

    #[test]
    fn test_single_player_attack_has_no_target() {
        let mut game = primed_for_attack(PlayerMode::Single);
        drop_and_settle(&mut game, PlayerSlot::One);
        let player = game.player(PlayerSlot::One).unwrap();
        assert_eq!(player.power(), 0);
        assert!(player.grid().row_is_complete(11));
        let events = game.drain_events();
        assert!(events.contains(&(PlayerSlot::One, GameEvent::AttackLaunched { rows: 3 })));
        assert!(!events
            .iter()
            .any(|(_, e)| matches!(e, GameEvent::AttackReceived { .. })));
    }

    #[test]
    fn test_drained_events_are_tagged() {
        let mut game = Game::new(calm(Variant::Classic), PlayerMode::Versus, 8).unwrap();
        drop_and_settle(&mut game, PlayerSlot::Two);
        let events = game.drain_events();
        assert!(!events.is_empty());
        assert!(events.iter().all(|(slot, _)| *slot == PlayerSlot::Two));
        assert!(game.drain_events().is_empty());
    }
}
