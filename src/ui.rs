//! Layout and drawing: menu, boards, sidebars, pause, game over.

use crate::PlayerMode;
use crate::app::{MenuState, MenuTab, ScorePopup, Screen};
use crate::events::Pos;
use crate::game::{Game, PlayerSlot};
use crate::grid::{Cell, LIMIT_LINE_ROW};
use crate::piece::{NormalShape, Piece, PieceKind};
use crate::player::{ActivePiece, Player};
use crate::rules::POWER_MAX;
use crate::theme::Theme;
use crate::Variant;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Each grid cell is two terminal columns wide so blocks look square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 22;
/// Stacked heights of the sidebar sections (next, gap, stats, gap, power).
const SIDEBAR_HEIGHT: u16 = 6 + 1 + 7 + 1 + 4;
/// Columns between the two players' areas.
const PLAYER_GAP: u16 = 3;
/// Fade of popped/exploded cells.
const FADE_MS: u32 = 350;

/// Everything the renderer reads for one frame.
pub struct View<'a> {
    pub screen: Screen,
    pub game: &'a Game,
    pub theme: &'a Theme,
    pub menu: &'a MenuState,
    pub popups: &'a [ScorePopup],
    pub now: Instant,
}

/// Cells removed by the latest resolution: drawn bright, then faded out.
#[derive(Default)]
pub struct Flash {
    cells: Vec<Pos>,
    effect: Option<Effect>,
    processed_at: Option<Instant>,
}

impl Flash {
    /// Adds cells and restarts the fade.
    pub fn trigger(&mut self, cells: &[Pos]) {
        self.cells.extend_from_slice(cells);
        self.effect = None;
        self.processed_at = None;
    }

    pub fn is_active(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Drops the flash once its fade has finished.
    pub fn expire(&mut self) {
        if self.effect.as_ref().is_some_and(|e| e.done()) {
            *self = Self::default();
        }
    }
}

/// Rows above the grid where the crane holds the queued piece.
fn crane_rows(game: &Game) -> u16 {
    match game.rules().shape {
        NormalShape::Tetromino => 4,
        NormalShape::Block | NormalShape::Bar => 2,
    }
}

/// Board size in terminal cells, border included.
fn board_size(game: &Game) -> (u16, u16) {
    let rules = game.rules();
    let w = rules.cols as u16 * CELL_WIDTH + 2;
    let h = rules.rows as u16 + crane_rows(game) + 2;
    (w, h)
}

/// Terminal position of grid cell (row, col); rows above the grid land in the crane zone.
fn cell_xy(inner: Rect, crane: u16, row: i32, col: i32) -> Option<(u16, u16)> {
    let y = i32::from(crane) + row;
    if y < 0 || col < 0 {
        return None;
    }
    Some((inner.x + col as u16 * CELL_WIDTH, inner.y + y as u16))
}

/// Writes `text` at (x, y) if it starts inside `clip`, cut at its right edge.
fn put(buf: &mut Buffer, clip: Rect, x: u16, y: u16, text: &str, style: Style) {
    if x < clip.left() || x >= clip.right() || y < clip.top() || y >= clip.bottom() {
        return;
    }
    let max = (clip.right() - x) as usize;
    buf.set_stringn(x, y, text, max, style);
}

fn piece_glyph(theme: &Theme, piece: &Piece) -> (&'static str, Color) {
    match piece.kind {
        PieceKind::Tnt => ("▒▒", theme.tnt),
        PieceKind::ColorBomb => ("◆◆", theme.bomb),
        PieceKind::Block | PieceKind::Bar | PieceKind::Tetromino(_) => {
            ("██", theme.block_color(piece.color.unwrap_or_default()))
        }
    }
}

pub fn draw(frame: &mut Frame, view: &View, flashes: &mut [Flash; 2]) {
    let area = frame.area();
    frame
        .buffer_mut()
        .set_style(area, Style::default().bg(view.theme.bg));
    match view.screen {
        Screen::Menu => draw_menu(frame, view, area),
        Screen::Playing => draw_game(frame, view, area, flashes),
        Screen::Paused => {
            draw_game(frame, view, area, flashes);
            draw_pause_overlay(frame, view.theme, area);
        }
        Screen::GameOver => {
            draw_game(frame, view, area, flashes);
            draw_game_over(frame, view, area);
        }
    }
}

fn centered(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_menu(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let menu = view.menu;
    let popup = centered(area, 52, 16);

    let title = Line::from(vec![
        Span::styled(" TOWER ", Style::default().fg(theme.blocks[0]).bold()),
        Span::styled(" TUMBLE ", Style::default().fg(theme.blocks[1]).bold()),
    ]);

    let highlight = Style::default().fg(Color::Black).bg(theme.title).bold();
    let selected = Style::default().fg(theme.title).bold();
    let normal = Style::default().fg(theme.main_fg);
    let option = |label: &str, tab: MenuTab, chosen: bool| {
        let style = if chosen && menu.tab == tab {
            highlight
        } else if chosen {
            selected
        } else {
            normal
        };
        Span::styled(format!(" {label} "), style)
    };

    let mut variants = vec![Span::styled("Variant  ", selected)];
    variants.extend(
        Variant::ALL
            .iter()
            .map(|&v| option(v.label(), MenuTab::Variant, v == menu.variant)),
    );
    let players = Line::from(vec![
        Span::styled("Players  ", selected),
        option("ONE", MenuTab::Players, menu.mode == PlayerMode::Single),
        option("TWO", MenuTab::Players, menu.mode == PlayerMode::Versus),
    ]);
    let start_style = if menu.tab == MenuTab::Start {
        highlight
    } else {
        normal
    };
    let blurb = match menu.variant {
        Variant::Classic => "Single blocks on a narrow 4-wide tower.",
        Variant::Bars => "2-wide bars. Steep columns tumble.",
        Variant::Tetromino => "Tetrominoes. Rotate while on the crane.",
        Variant::Decay => "Bars, colour bombs, and blocks that crumble.",
    };
    let hint = Style::default().fg(theme.inactive_fg);

    let lines = vec![
        Line::from(""),
        title,
        Line::from(Span::styled("race to the limit line", hint)),
        Line::from(""),
        Line::from(variants),
        Line::from(Span::styled(blurb, hint)),
        Line::from(""),
        players,
        Line::from(""),
        Line::from(Span::styled(" [ START ] ", start_style)),
        Line::from(""),
        Line::from(Span::styled("A/D or ←/→ change   W/S or ↑/↓ select", hint)),
        Line::from(Span::styled("Enter start   Q quit", hint)),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

/// Boards and sidebars side by side, centred, with a header line above.
fn draw_game(frame: &mut Frame, view: &View, area: Rect, flashes: &mut [Flash; 2]) {
    let game = view.game;
    let (bw, bh) = board_size(game);
    let slots: Vec<PlayerSlot> = game.slots().collect();
    let n = slots.len() as u16;
    let total_w = n * (bw + SIDEBAR_WIDTH) + n.saturating_sub(1) * PLAYER_GAP;
    let total_h = bh.max(SIDEBAR_HEIGHT);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);

    draw_header(frame, view, vert[1]);

    let mut x = vert[2].x;
    for slot in slots {
        let Some(player) = game.player(slot) else {
            continue;
        };
        let board_area = Rect {
            x,
            y: vert[2].y,
            width: bw,
            height: bh,
        }
        .intersection(area);
        let sidebar_area = Rect {
            x: x + bw,
            y: vert[2].y,
            width: SIDEBAR_WIDTH,
            height: SIDEBAR_HEIGHT,
        }
        .intersection(area);
        let flash = &mut flashes[slot.index()];
        let grid_rect = draw_board(frame, view, slot, player, board_area, flash);
        draw_sidebar(frame, view, slot, player, sidebar_area);
        if flash.is_active() {
            apply_flash_effect(frame, view, grid_rect, flash);
        }
        x += bw + SIDEBAR_WIDTH + PLAYER_GAP;
    }
}

fn draw_header(frame: &mut Frame, view: &View, area: Rect) {
    let game = view.game;
    let secs = game.elapsed_ms() / 1000;
    let theme = view.theme;
    let line = Line::from(vec![
        Span::styled("TOWER TUMBLE", Style::default().fg(theme.title).bold()),
        Span::styled(
            format!(
                "  {:02}:{:02}  seed {}",
                secs / 60,
                secs % 60,
                game.seed()
            ),
            Style::default().fg(theme.inactive_fg),
        ),
    ]);
    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(area, frame.buffer_mut());
}

/// Draws one player's board and returns the rect of its grid rows.
fn draw_board(
    frame: &mut Frame,
    view: &View,
    slot: PlayerSlot,
    player: &Player,
    area: Rect,
    flash: &Flash,
) -> Rect {
    let theme = view.theme;
    let frame_color = theme.players[slot.index()];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(frame_color).bg(theme.bg))
        .title(Span::styled(
            format!(" {} ", slot.label()),
            Style::default().fg(frame_color).bold(),
        ));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let crane = crane_rows(view.game);
    let grid = player.grid();
    let grid_rect = Rect {
        x: inner.x,
        y: inner.y + crane,
        width: (grid.cols() as u16 * CELL_WIDTH).min(inner.width),
        height: grid.rows() as u16,
    }
    .intersection(inner);
    let flashing: HashSet<Pos> = flash.cells.iter().copied().collect();
    let buf = frame.buffer_mut();

    // crane rail
    if crane > 0 {
        for c in 0..grid.cols() {
            if let Some((x, y)) = cell_xy(inner, crane, -i32::from(crane), c as i32) {
                put(buf, inner, x, y, "▁▁", Style::default().fg(theme.div_line).bg(theme.bg));
            }
        }
    }

    for r in 0..grid.rows() {
        for c in 0..grid.cols() {
            let Some((x, y)) = cell_xy(inner, crane, r as i32, c as i32) else {
                continue;
            };
            let (glyph, style) = match grid.get(r, c).unwrap_or_default() {
                _ if flashing.contains(&(r, c)) => {
                    ("██", Style::default().fg(Color::White).bg(theme.bg))
                }
                cell @ Cell::Block { color, .. } => {
                    let fg = theme.block_color(color);
                    let glyph = if cell.is_scored() { "▓▓" } else { "██" };
                    (glyph, Style::default().fg(fg).bg(theme.bg))
                }
                Cell::Empty if r == LIMIT_LINE_ROW => {
                    ("╌╌", Style::default().fg(theme.limit_line).bg(theme.bg))
                }
                Cell::Empty => ("  ", Style::default().bg(theme.bg)),
            };
            put(buf, inner, x, y, glyph, style);
        }
    }

    let active = player.active();
    if view.game.winner().is_none() {
        if !active.is_falling() {
            draw_ghost(buf, view, player, inner, crane);
        }
        let (glyph, color) = piece_glyph(theme, &active.piece);
        for (r, c) in active.cells() {
            if let Some((x, y)) = cell_xy(inner, crane, r, c) {
                put(buf, inner, x, y, glyph, Style::default().fg(color).bg(theme.bg));
            }
        }
    }

    for popup in view.popups.iter().filter(|p| p.slot == slot) {
        if let Some((x, y)) = cell_xy(inner, crane, popup.row as i32, popup.col as i32) {
            let style = Style::default().fg(popup.color).bg(theme.bg).bold();
            put(buf, inner, x, y, &popup.text, style);
        }
    }

    grid_rect
}

/// Where the queued piece would come to rest if dropped now.
fn draw_ghost(buf: &mut Buffer, view: &View, player: &Player, inner: Rect, crane: u16) {
    let active = player.active();
    let row = player.landing_row();
    let ActivePiece { piece, col, .. } = active;
    if row < 0 {
        return;
    }
    let style = Style::default().fg(view.theme.inactive_fg).bg(view.theme.bg);
    for (dr, dc) in piece.offsets() {
        let (r, c) = (row + dr, col + dc);
        let free = player
            .grid()
            .position(r, c)
            .is_some_and(|(r, c)| !player.grid().is_occupied(r, c));
        if free {
            if let Some((x, y)) = cell_xy(inner, crane, r, c) {
                put(buf, inner, x, y, "░░", style);
            }
        }
    }
}

/// Fades the flashing cells to the background (TachyonFX).
fn apply_flash_effect(frame: &mut Frame, view: &View, grid_rect: Rect, flash: &mut Flash) {
    if grid_rect.is_empty() {
        return;
    }
    let delta = flash
        .processed_at
        .map(|t| view.now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    flash.processed_at = Some(view.now);

    if flash.effect.is_none() {
        let positions: HashSet<(u16, u16)> = flash
            .cells
            .iter()
            .map(|&(r, c)| (grid_rect.x + c as u16 * CELL_WIDTH, grid_rect.y + r as u16))
            .flat_map(|(x, y)| [(x, y), (x + 1, y)])
            .collect();
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            positions.contains(&(pos.x, pos.y))
        }));
        let bg = view.theme.bg;
        let effect = fx::fade_to(bg, bg, (FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(grid_rect);
        flash.effect = Some(effect);
    }

    if let Some(effect) = flash.effect.as_mut() {
        frame.render_effect(effect, grid_rect, TfxDuration::from_millis(delta_ms));
    }
}

fn draw_sidebar(frame: &mut Frame, view: &View, slot: PlayerSlot, player: &Player, area: Rect) {
    let theme = view.theme;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Next
            Constraint::Length(1),
            Constraint::Length(7), // Stats
            Constraint::Length(1),
            Constraint::Length(4), // Power
        ])
        .split(area);

    // --- Next ---
    let next_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Next ", title_style));
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    draw_piece_preview(frame.buffer_mut(), theme, player.next_piece(), next_inner);

    // --- Stats ---
    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(format!(" {} ", slot.label()), title_style));
    let stats_inner = stats_block.inner(chunks[2]);
    stats_block.render(chunks[2], frame.buffer_mut());
    let mut stats = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(player.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Lines: ", title_style),
            Span::styled(player.lines_charged().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Combo: ", title_style),
            Span::styled(
                if player.combo() > 1 {
                    format!("x{}", player.combo())
                } else {
                    "-".to_string()
                },
                fg_style,
            ),
        ]),
        Line::from(vec![
            Span::styled("Height: ", title_style),
            Span::styled(
                format!(
                    "{}/{}",
                    player.grid().tallest_column_height(),
                    player.grid().rows() - LIMIT_LINE_ROW
                ),
                fg_style,
            ),
        ]),
    ];
    if let Some(ms) = player.decay_due_in_ms() {
        stats.push(Line::from(vec![
            Span::styled("Decay: ", title_style),
            Span::styled(format!("{:.1}s", ms as f64 / 1000.0), fg_style),
        ]));
    }
    Paragraph::new(ratatui::text::Text::from(stats)).render(stats_inner, frame.buffer_mut());

    // --- Power ---
    let power_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Power ", title_style));
    let power_inner = power_block.inner(chunks[4]);
    power_block.render(chunks[4], frame.buffer_mut());
    let ratio = (f64::from(player.power()) / f64::from(POWER_MAX)).min(1.0);
    let bar_color = if ratio >= 0.75 {
        theme.limit_line
    } else if ratio >= 0.4 {
        theme.title
    } else {
        theme.players[slot.index()]
    };
    Gauge::default()
        .ratio(ratio)
        .label(format!("{}/{}", player.power(), POWER_MAX))
        .gauge_style(Style::default().fg(bar_color).bg(theme.div_line))
        .render(power_inner, frame.buffer_mut());
}

/// Piece shape centred in `area`, unrotated.
fn draw_piece_preview(buf: &mut Buffer, theme: &Theme, piece: &Piece, area: Rect) {
    let (r0, r1, c0, c1) = piece.extents();
    let bw = (c1 - c0 + 1) as u16 * CELL_WIDTH;
    let bh = (r1 - r0 + 1) as u16;
    let off_x = area.width.saturating_sub(bw) / 2;
    let off_y = area.height.saturating_sub(bh) / 2;
    let (glyph, color) = piece_glyph(theme, piece);
    for (dr, dc) in piece.offsets() {
        let x = area.x + off_x + (dc - c0) as u16 * CELL_WIDTH;
        let y = area.y + off_y + (dr - r0) as u16;
        put(buf, area, x, y, glyph, Style::default().fg(color).bg(theme.bg));
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(theme.title),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P: Resume    Q: Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let game = view.game;
    let winner = game.winner();
    let title = match (game.mode(), winner) {
        (PlayerMode::Single, _) => " Tower complete! ".to_string(),
        (PlayerMode::Versus, Some(slot)) => format!(" {} wins! ", slot.label()),
        (PlayerMode::Versus, None) => " Game Over ".to_string(),
    };
    let title_color = winner.map_or(theme.title, |slot| theme.players[slot.index()]);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            title,
            Style::default().fg(Color::Black).bg(title_color).bold(),
        )),
        Line::from(""),
    ];
    for slot in game.slots() {
        if let Some(player) = game.player(slot) {
            lines.push(Line::from(Span::styled(
                format!(
                    " {}  score {}  lines {} ",
                    slot.label(),
                    player.score(),
                    player.lines_charged()
                ),
                Style::default().fg(theme.players[slot.index()]),
            )));
        }
    }
    let secs = game.elapsed_ms() / 1000;
    lines.push(Line::from(Span::styled(
        format!(" Time {:02}:{:02}   seed {} ", secs / 60, secs % 60, game.seed()),
        Style::default().fg(theme.inactive_fg),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " R: Restart    Q: Quit ",
        Style::default().fg(theme.main_fg),
    )));
    let height = lines.len() as u16 + 2;
    let popup = centered(area, 40, height);
    for y in popup.top()..popup.bottom() {
        for x in popup.left()..popup.right() {
            frame.buffer_mut()[(x, y)].set_style(Style::default().bg(theme.bg));
        }
    }
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Tower Tumble ", theme.title)),
        )
        .render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rules;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(game: &Game, screen: Screen) -> Buffer {
        let theme = Theme::default();
        let menu = MenuState {
            tab: MenuTab::Start,
            variant: Variant::Classic,
            mode: game.mode(),
        };
        let mut flashes: [Flash; 2] = Default::default();
        flashes[0].trigger(&[(11, 0)]);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| {
                let view = View {
                    screen,
                    game,
                    theme: &theme,
                    menu: &menu,
                    popups: &[],
                    now: Instant::now(),
                };
                draw(f, &view, &mut flashes);
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_versus_draws_both_boards() {
        let game = Game::new(Rules::for_variant(Variant::Classic), PlayerMode::Versus, 1).unwrap();
        let out = text(&render(&game, Screen::Playing));
        assert!(out.contains(" P1 "));
        assert!(out.contains(" P2 "));
        assert!(out.contains("seed 1"));
        assert!(out.contains("╌╌"));
    }

    #[test]
    fn test_menu_and_pause_render() {
        let game = Game::new(Rules::for_variant(Variant::Tetromino), PlayerMode::Single, 2).unwrap();
        assert!(text(&render(&game, Screen::Menu)).contains("START"));
        let paused = text(&render(&game, Screen::Paused));
        assert!(paused.contains("Paused"));
        assert!(!paused.contains(" P2 "));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let game = Game::new(Rules::for_variant(Variant::Decay), PlayerMode::Versus, 3).unwrap();
        let theme = Theme::default();
        let menu = MenuState {
            tab: MenuTab::Variant,
            variant: Variant::Decay,
            mode: PlayerMode::Versus,
        };
        let mut flashes: [Flash; 2] = Default::default();
        let mut terminal = Terminal::new(TestBackend::new(20, 8)).unwrap();
        terminal
            .draw(|f| {
                let view = View {
                    screen: Screen::GameOver,
                    game: &game,
                    theme: &theme,
                    menu: &menu,
                    popups: &[],
                    now: Instant::now(),
                };
                draw(f, &view, &mut flashes);
            })
            .unwrap();
    }

    #[test]
    fn test_flash_expires_only_when_done() {
        let mut flash = Flash::default();
        flash.trigger(&[(1, 1)]);
        flash.expire();
        assert!(flash.is_active());
    }
}
