//! Layout and drawing: well, next preview, colour strip, stats, pause, game over.

use crate::app::Screen;
use crate::theme::Theme;
use columnstui::{Cell, Faller, Field, Game, Jewel, SPAWN_ROWS};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Each jewel is drawn with its three-character cell code, e.g. `[S]` or `*S*`.
const CELL_WIDTH: u16 = 3;

const SIDEBAR_WIDTH: u16 = 24;
/// Next (5) + gap + Colours (3) + gap + Stats (4) + gap + Keys (5).
const SIDEBAR_HEIGHT: u16 = 20;

/// Duration of the matched-jewel fade (TachyonFX); shorter than the default tick.
const MATCH_FADE_MS: u32 = 350;

/// Well size in terminal cells, border included.
fn well_size(field: &Field) -> (u16, u16) {
    let w = field.width() as u16 * CELL_WIDTH + 2;
    let h = field.rows() as u16 + 2;
    (w, h)
}

/// Well (with border) and sidebar rects, centred in `area`.
fn game_layout(area: Rect, field: &Field) -> (Rect, Rect) {
    let (ww, wh) = well_size(field);
    let total_w = ww + SIDEBAR_WIDTH;
    let total_h = wh.max(SIDEBAR_HEIGHT);

    // Center horizontally
    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);

    // Center vertically
    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);

    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(ww), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert_chunks[1]);
    let well_area = Rect {
        height: wh.min(inner[0].height),
        ..inner[0]
    };
    (well_area, inner[1])
}

/// Well inner rect (board only, no border).
fn board_rect(area: Rect, field: &Field) -> Rect {
    let (well_area, _) = game_layout(area, field);
    well_block_inner(well_area)
}

fn well_block_inner(well_area: Rect) -> Rect {
    Rect {
        x: well_area.x + 1,
        y: well_area.y + 1,
        width: well_area.width.saturating_sub(2),
        height: well_area.height.saturating_sub(2),
    }
}

/// Terminal cells covered by matched jewels in the visible rows.
fn matched_buffer_positions(board: Rect, field: &Field) -> HashSet<(u16, u16)> {
    field
        .matched_positions()
        .into_iter()
        .filter(|&(_, y)| y >= SPAWN_ROWS)
        .flat_map(|(x, y)| {
            let rx = board.x + x as u16 * CELL_WIDTH;
            let ry = board.y + (y - SPAWN_ROWS) as u16;
            (0..CELL_WIDTH).map(move |dx| (rx + dx, ry))
        })
        .collect()
}

/// Create or update the matched fade effect and process it (TachyonFX: fade matched jewels to bg).
fn apply_match_effect(
    frame: &mut Frame,
    field: &Field,
    theme: &Theme,
    area: Rect,
    match_effect: &mut Option<Effect>,
    match_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let board = board_rect(area, field);
    let delta = match_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    let tfx_delta = TfxDuration::from_millis(delta_ms);
    *match_process_time = Some(now);

    if match_effect.is_none() {
        let matched_set = matched_buffer_positions(board, field);
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            matched_set.contains(&(pos.x, pos.y))
        }));
        let bg = theme.bg;
        let effect = fx::fade_to(bg, bg, (MATCH_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(board);
        *match_effect = Some(effect);
    }

    if let Some(effect) = match_effect {
        frame.render_effect(effect, board, tfx_delta);
    }
}

/// Draw current screen, with optional pause overlay. While matched jewels are waiting
/// to be cleared, applies the TachyonFX fade and updates `match_effect` /
/// `match_process_time`.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    game: &Game,
    theme: &Theme,
    paused: bool,
    area: Rect,
    match_effect: &mut Option<Effect>,
    match_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let faded = match_effect.as_ref().is_some_and(|e| e.done());
    draw_game(frame, game, theme, area, faded);
    match screen {
        Screen::Playing => {
            if game.field().has_matches() && !faded {
                apply_match_effect(
                    frame,
                    game.field(),
                    theme,
                    area,
                    match_effect,
                    match_process_time,
                    now,
                );
            }
            if paused {
                draw_pause_overlay(frame, theme, area);
            }
        }
        Screen::GameOver => draw_game_over(frame, game, theme, area),
    }
}

fn popup_rect(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = popup_rect(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Resume    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, game: &Game, theme: &Theme, area: Rect) {
    let popup = popup_rect(area, 30, 8);
    let field = game.field();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Ticks: {} ", game.ticks()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Well: {} x {} ", field.rows(), field.width()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            " R — Restart    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .title(Span::styled(" columnstui ", theme.title)),
    );
    p.render(popup, frame.buffer_mut());
}

/// Draw game: well + sidebar; use full area and center the board.
fn draw_game(frame: &mut Frame, game: &Game, theme: &Theme, area: Rect, faded: bool) {
    let (well_area, sidebar_area) = game_layout(area, game.field());
    draw_well(frame, game.field(), theme, well_area, faded);
    draw_sidebar(frame, game, theme, sidebar_area);
}

/// Style and text for one cell. Empty cells show a faint dot so the grid reads.
fn cell_span(cell: Cell, theme: &Theme, faded: bool) -> (String, Style) {
    match (cell, theme.cell_color(cell)) {
        (Cell::Empty, _) | (_, None) => (
            " · ".to_string(),
            Style::default().fg(theme.div_line).bg(theme.bg),
        ),
        (Cell::Matched(_), Some(color)) if faded => {
            (cell.to_string(), Style::default().fg(color).bg(theme.bg))
        }
        (Cell::Landed(_), Some(color)) => {
            (cell.to_string(), Style::default().fg(theme.main_fg).bg(color))
        }
        (_, Some(color)) => (cell.to_string(), Style::default().fg(Color::Black).bg(color)),
    }
}

fn draw_well(frame: &mut Frame, field: &Field, theme: &Theme, area: Rect, faded: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" columnstui ", theme.title));
    let inner = well_block_inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    // Spawn rows above the well stay hidden.
    for (row, y) in (SPAWN_ROWS..field.height()).enumerate() {
        let ry = inner.y + row as u16;
        if ry >= inner.y + inner.height {
            break;
        }
        for x in 0..field.width() {
            let rx = inner.x + x as u16 * CELL_WIDTH;
            if rx + CELL_WIDTH > inner.x + inner.width {
                break;
            }
            let cell = field.get(x, y).unwrap_or_default();
            let (text, style) = cell_span(cell, theme, faded);
            buf.set_string(rx, ry, text, style);
        }
    }
}

fn sidebar_block(theme: &Theme, title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)))
}

fn draw_sidebar(frame: &mut Frame, game: &Game, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let help_style = Style::default().fg(theme.inactive_fg);

    // Free-floating sections with their own borders; vertical layout with small gaps
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Next (border + 3 jewels)
            Constraint::Length(1),
            Constraint::Length(3), // Colours (border + strip)
            Constraint::Length(1),
            Constraint::Length(4), // Stats
            Constraint::Length(1),
            Constraint::Length(5), // Keys
        ])
        .split(area);

    let next_block = sidebar_block(theme, " Next ");
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    draw_next_preview(frame, game.next_faller(), theme, next_inner);

    let colours_block = sidebar_block(theme, " Jewels ");
    let colours_inner = colours_block.inner(chunks[2]);
    colours_block.render(chunks[2], frame.buffer_mut());
    draw_colour_strip(frame, theme, colours_inner);

    let stats_block = sidebar_block(theme, " Stats ");
    let stats_inner = stats_block.inner(chunks[4]);
    stats_block.render(chunks[4], frame.buffer_mut());
    let field = game.field();
    let tallest = (0..field.width())
        .map(|x| field.settled_height(x))
        .max()
        .unwrap_or(0);
    let stats_lines = vec![
        Line::from(vec![
            Span::styled("Ticks: ", title_style),
            Span::styled(game.ticks().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Stack: ", title_style),
            Span::styled(format!("{tallest} / {}", field.rows()), fg_style),
        ]),
    ];
    Paragraph::new(ratatui::text::Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    let keys_block = sidebar_block(theme, " Keys ");
    let keys_inner = keys_block.inner(chunks[6]);
    keys_block.render(chunks[6], frame.buffer_mut());
    let keys_lines = vec![
        Line::from(Span::styled("←/h →/l  move", help_style)),
        Line::from(Span::styled("Space/↑/k rotate", help_style)),
        Line::from(Span::styled("p pause  r restart", help_style)),
    ];
    Paragraph::new(ratatui::text::Text::from(keys_lines)).render(keys_inner, frame.buffer_mut());
}

/// Next faller as three stacked jewels, with the column it will drop into.
fn draw_next_preview(frame: &mut Frame, faller: &Faller, theme: &Theme, area: Rect) {
    let buf = frame.buffer_mut();
    for (i, jewel) in faller.jewels.iter().enumerate() {
        let ry = area.y + i as u16;
        if ry >= area.y + area.height {
            break;
        }
        let color = theme.jewel_color(*jewel);
        buf.set_string(
            area.x + 1,
            ry,
            format!(" {} ", jewel.symbol()),
            Style::default().fg(Color::Black).bg(color),
        );
    }
    if area.height > 1 && area.width > 14 {
        buf.set_string(
            area.x + 6,
            area.y + 1,
            format!("column {}", faller.column + 1),
            Style::default().fg(theme.main_fg),
        );
    }
}

/// Draw a row of the seven jewel colours.
fn draw_colour_strip(frame: &mut Frame, theme: &Theme, area: Rect) {
    let block_w = (area.width / Jewel::ALL.len() as u16).max(1);
    for (i, jewel) in Jewel::ALL.iter().enumerate() {
        let r = Rect {
            x: area.x + i as u16 * block_w,
            y: area.y,
            width: block_w,
            height: area.height.min(1),
        };
        if r.x + r.width > area.x + area.width {
            break;
        }
        let c = theme.jewel_color(*jewel);
        let p = Paragraph::new(jewel.symbol().to_string())
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Black).bg(c));
        p.render(r, frame.buffer_mut());
    }
}
