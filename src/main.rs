//! Tower Tumble: two-player race-to-the-top block stacking in the terminal.

mod app;
mod events;
mod game;
mod generator;
mod grid;
mod input;
mod piece;
mod player;
mod resolver;
mod rules;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use rules::{Rules, RulesError};

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref())
        .with_context(|| format!("loading theme {:?}", args.theme))?;
    let rules = args.rules()?;
    let mut app = App::new(&args, rules, theme)?;
    app.run()?;
    let diagnostics = app.diagnostics();
    if !diagnostics.is_empty() {
        eprintln!("towertumble: {diagnostics}");
    }
    Ok(())
}

/// Race-to-the-top block stacking in the terminal.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "towertumble",
    version,
    about = "Race-to-the-top block stacking in the terminal. First tower to touch the limit line wins.",
    long_about = "Tower Tumble is a competitive stacking game for one or two players.\n\n\
        Move the crane, drop your piece and build up to the dashed limit line before your \
        opponent. Three or more pieces touching in one colour pop; full rows charge your power \
        meter, and a full meter blows away the bottom of your opponent's tower. TNT clears a \
        3x3 area and the colour bomb clears every block of the colour it lands on.\n\n\
        CONTROLS:\n  Player 1    A/D move   W drop   S rotate\n  Player 2    Left/Right move   Up drop   Down rotate\n  \
        P pause   R restart (after a round)   Q / Esc quit\n\n\
        In single-player mode both key sets steer player 1."
)]
pub struct Args {
    /// Ruleset: classic (single blocks), bars (2-wide bars), tetromino, or decay (bars with block decay and colour bombs).
    #[arg(short, long, default_value = "classic")]
    pub variant: Variant,

    /// Number of players at this keyboard.
    #[arg(short, long, default_value = "two")]
    pub players: PlayerMode,

    /// Seed for the piece stream (random if not set). Shown in the HUD so a race can be replayed.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Falling speed in rows per second (overrides the variant).
    #[arg(long, value_name = "ROWS")]
    pub drop_speed: Option<u32>,

    /// Chance (0..=1) that a piece is TNT (overrides the variant).
    #[arg(long, value_name = "P")]
    pub tnt_chance: Option<f64>,

    /// Power gained per charged line (overrides the variant). 100 power fires an attack.
    #[arg(long, value_name = "N")]
    pub power_per_line: Option<u32>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses the neon palette if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Skip main menu and start game immediately.
    #[arg(long)]
    pub no_menu: bool,
}

impl Args {
    /// Variant preset with command-line overrides applied.
    pub fn rules(&self) -> Result<Rules, RulesError> {
        rules_with_overrides(self.variant, self)
    }
}

/// Preset for `variant` with the overrides from `args`, validated.
pub fn rules_with_overrides(variant: Variant, args: &Args) -> Result<Rules, RulesError> {
    let mut rules = Rules::for_variant(variant);
    if let Some(speed) = args.drop_speed {
        rules.drop_speed = speed;
    }
    if let Some(chance) = args.tnt_chance {
        rules.tnt_chance = chance;
    }
    if let Some(power) = args.power_per_line {
        rules.power_per_line = power;
    }
    rules.validate()?;
    Ok(rules)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Variant {
    #[default]
    Classic,
    #[value(alias = "bar")]
    Bars,
    #[value(alias = "tetris")]
    Tetromino,
    Decay,
}

impl Variant {
    pub const ALL: [Self; 4] = [Self::Classic, Self::Bars, Self::Tetromino, Self::Decay];

    pub fn label(self) -> &'static str {
        match self {
            Self::Classic => "CLASSIC",
            Self::Bars => "BARS",
            Self::Tetromino => "TETROMINO",
            Self::Decay => "DECAY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PlayerMode {
    #[value(name = "one", alias = "1", alias = "single")]
    Single,
    #[default]
    #[value(name = "two", alias = "2", alias = "versus")]
    Versus,
}
