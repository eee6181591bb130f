//! App: terminal init, main loop, tick and key handling.

use crate::events::GameEvent;
use crate::game::{Game, Intent, PlayerSlot};
use crate::input::{Action, key_to_action};
use crate::player::{BOMB_SCORE_PER_CELL, Direction, TNT_SCORE_PER_CELL};
use crate::resolver::MATCH_SCORE_PER_CELL;
use crate::rules::Rules;
use crate::theme::Theme;
use crate::ui::Flash;
use crate::{Args, PlayerMode, Variant};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use ratatui::style::Color;
use std::fmt;
use std::time::{Duration, Instant};

/// Longest step fed to the engine; longer stalls (suspend, slow terminal) are cut short.
const MAX_STEP_MS: u64 = 250;
/// Popups float up one row per this many ms.
const POPUP_RISE_MS: u32 = 200;
const POPUP_LIFETIME_MS: u32 = 1400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTab {
    Variant,
    Players,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuState {
    pub tab: MenuTab,
    pub variant: Variant,
    pub mode: PlayerMode,
}

impl MenuState {
    fn new(variant: Variant, mode: PlayerMode) -> Self {
        Self {
            tab: MenuTab::Variant,
            variant,
            mode,
        }
    }

    /// Steps the value under the cursor, wrapping around.
    fn cycle(&mut self, step: i32) {
        match self.tab {
            MenuTab::Variant => {
                let all = Variant::ALL;
                let i = all.iter().position(|&v| v == self.variant).unwrap_or(0) as i32;
                let n = all.len() as i32;
                self.variant = all[(i + step).rem_euclid(n) as usize];
            }
            MenuTab::Players => {
                self.mode = match self.mode {
                    PlayerMode::Single => PlayerMode::Versus,
                    PlayerMode::Versus => PlayerMode::Single,
                };
            }
            MenuTab::Start => {}
        }
    }

    fn next_tab(&mut self) {
        self.tab = match self.tab {
            MenuTab::Variant => MenuTab::Players,
            MenuTab::Players => MenuTab::Start,
            MenuTab::Start => MenuTab::Variant,
        };
    }

    fn prev_tab(&mut self) {
        self.tab = match self.tab {
            MenuTab::Variant => MenuTab::Start,
            MenuTab::Players => MenuTab::Variant,
            MenuTab::Start => MenuTab::Players,
        };
    }
}

/// Floating text over a board, e.g. "+45 x2".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorePopup {
    pub slot: PlayerSlot,
    pub row: usize,
    pub col: usize,
    pub text: String,
    pub age_ms: u32,
    pub color: Color,
}

/// Engine cap hits seen during the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub stability_caps: u32,
    pub chain_caps: u32,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.stability_caps == 0 && self.chain_caps == 0
    }

    fn record(&mut self, event: &GameEvent) {
        if !event.is_diagnostic() {
            return;
        }
        match event {
            GameEvent::StabilityCapReached { .. } => self.stability_caps += 1,
            GameEvent::ChainCapReached { .. } => self.chain_caps += 1,
            _ => {}
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stability pass cap hit {} time(s), chain wave cap hit {} time(s)",
            self.stability_caps, self.chain_caps
        )
    }
}

pub struct App {
    args: Args,
    theme: Theme,
    rules: Rules,
    game: Game,
    screen: Screen,
    menu: MenuState,
    /// Fade-out of removed cells, one per player slot.
    flashes: [Flash; 2],
    popups: Vec<ScorePopup>,
    diagnostics: Diagnostics,
    last_tick: Instant,
}

impl App {
    pub fn new(args: &Args, rules: Rules, theme: Theme) -> Result<Self> {
        let seed = args.seed.unwrap_or_else(rand::random);
        let game = Game::new(rules.clone(), args.players, seed)?;
        let screen = if args.no_menu {
            Screen::Playing
        } else {
            Screen::Menu
        };
        Ok(Self {
            args: args.clone(),
            theme,
            rules,
            game,
            screen,
            menu: MenuState::new(args.variant, args.players),
            flashes: Default::default(),
            popups: Vec::new(),
            diagnostics: Diagnostics::default(),
            last_tick: Instant::now(),
        })
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    /// New race with the menu's variant and player count. A fixed --seed
    /// replays the same race; otherwise every round gets a fresh seed.
    fn start_game(&mut self) -> Result<()> {
        self.rules = crate::rules_with_overrides(self.menu.variant, &self.args)?;
        let seed = self.args.seed.unwrap_or_else(rand::random);
        self.game = Game::new(self.rules.clone(), self.menu.mode, seed)?;
        self.screen = Screen::Playing;
        self.flashes = Default::default();
        self.popups.clear();
        self.last_tick = Instant::now();
        Ok(())
    }

    /// Returns true when the app should exit.
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match self.screen {
            Screen::Menu => match action {
                Action::Quit => return Ok(true),
                Action::Play(_, Intent::Move(Direction::Left)) => self.menu.cycle(-1),
                Action::Play(_, Intent::Move(Direction::Right)) => self.menu.cycle(1),
                Action::Play(_, Intent::Rotate) => self.menu.next_tab(),
                Action::Play(_, Intent::Drop) => self.menu.prev_tab(),
                Action::Confirm => {
                    if self.menu.tab == MenuTab::Start {
                        self.start_game()?;
                    } else {
                        self.menu.tab = MenuTab::Start;
                    }
                }
                _ => {}
            },
            Screen::Playing => match action {
                Action::Quit => return Ok(true),
                Action::Pause => self.screen = Screen::Paused,
                Action::Play(slot, Intent::Move(direction)) => {
                    self.game.move_active(slot, direction);
                }
                Action::Play(slot, Intent::Rotate) => {
                    self.game.rotate_active(slot);
                }
                Action::Play(slot, Intent::Drop) => {
                    self.game.drop_active(slot);
                }
                _ => {}
            },
            Screen::Paused => match action {
                Action::Quit => return Ok(true),
                Action::Pause | Action::Confirm => {
                    self.screen = Screen::Playing;
                    self.last_tick = Instant::now();
                }
                _ => {}
            },
            Screen::GameOver => match action {
                Action::Quit => return Ok(true),
                Action::Restart | Action::Confirm => self.start_game()?,
                _ => {}
            },
        }
        Ok(false)
    }

    /// Advances the race by the wall time since the last step.
    fn step(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_tick).as_millis();
        let delta = elapsed.min(u128::from(MAX_STEP_MS)) as u64;
        self.last_tick = now;
        let winner = self.game.tick(delta);
        self.absorb_events();
        self.tick_popups(delta as u32);
        if winner.is_some() {
            self.screen = Screen::GameOver;
        }
    }

    fn absorb_events(&mut self) {
        for (slot, event) in self.game.drain_events() {
            self.diagnostics.record(&event);
            let removed = event.removed_cells();
            if !removed.is_empty() {
                self.flashes[slot.index()].trigger(removed);
            }
            if let Some(popup) = self.popup_for(slot, &event) {
                self.popups.push(popup);
            }
        }
    }

    fn popup_for(&self, slot: PlayerSlot, event: &GameEvent) -> Option<ScorePopup> {
        let bottom = self.rules.rows - 1;
        let (row, col, text, color) = match event {
            GameEvent::Popped { cells, color, wave } => {
                let &(row, col) = cells.first()?;
                let amount = cells.len() as u32 * MATCH_SCORE_PER_CELL * wave;
                let text = if *wave > 1 {
                    format!("+{amount} x{wave}")
                } else {
                    format!("+{amount}")
                };
                (row, col, text, self.theme.block_color(*color))
            }
            GameEvent::Exploded { center, cells } => {
                let amount = cells.len() as u32 * TNT_SCORE_PER_CELL;
                (center.0, center.1, format!("BOOM +{amount}"), self.theme.tnt)
            }
            GameEvent::BombFired { cells, .. } => {
                let &(row, col) = cells.first()?;
                let amount = cells.len() as u32 * BOMB_SCORE_PER_CELL;
                (row, col, format!("+{amount}"), self.theme.bomb)
            }
            GameEvent::BombFizzled { col } => {
                (bottom, (*col).max(0) as usize, "fizz".to_string(), self.theme.inactive_fg)
            }
            GameEvent::LineCharged { row } => {
                let text = format!("+{} LINE", self.rules.line_bonus);
                (*row, 0, text, self.theme.title)
            }
            GameEvent::AttackLaunched { .. } => {
                (0, 0, "ATTACK!".to_string(), self.theme.limit_line)
            }
            GameEvent::AttackReceived { cleared } if *cleared > 0 => {
                (bottom, 0, format!("-{cleared} ROWS"), self.theme.limit_line)
            }
            GameEvent::Blocked { col } => {
                (0, (*col).max(0) as usize, "FULL".to_string(), self.theme.limit_line)
            }
            _ => return None,
        };
        Some(ScorePopup {
            slot,
            row,
            col,
            text,
            age_ms: 0,
            color,
        })
    }

    fn tick_popups(&mut self, delta_ms: u32) {
        self.popups.retain_mut(|p| {
            let old_steps = p.age_ms / POPUP_RISE_MS;
            p.age_ms += delta_ms;
            if p.age_ms / POPUP_RISE_MS > old_steps {
                p.row = p.row.saturating_sub(1);
            }
            p.age_ms < POPUP_LIFETIME_MS
        });
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        self.last_tick = Instant::now();
        let result = self.run_loop(&mut terminal);

        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.args.frame_rate.max(1.0));
        loop {
            let now = Instant::now();
            if self.screen == Screen::Playing {
                self.step(now);
            }

            terminal.draw(|f| {
                let view = crate::ui::View {
                    screen: self.screen,
                    game: &self.game,
                    theme: &self.theme,
                    menu: &self.menu,
                    popups: &self.popups,
                    now,
                };
                crate::ui::draw(f, &view, &mut self.flashes);
            })?;
            for flash in &mut self.flashes {
                flash.expire();
            }

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else {
                        continue;
                    };
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    let mode = match self.screen {
                        Screen::Menu => self.menu.mode,
                        _ => self.game.mode(),
                    };
                    if self.handle_action(key_to_action(key, mode))? {
                        return Ok(());
                    }
                }
            }
        }
    }
}
