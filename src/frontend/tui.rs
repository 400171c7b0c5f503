//! ratatui renderer: the foreground application's layout, popups against
//! their screen edge, the hot point as the terminal cursor, and a message
//! line at the bottom.

use crate::core::application::LayoutKind;
use crate::core::popups::Placement;
use crate::core::screen::{AreaView, Renderer, ScreenView};
use anyhow::{Context, Result};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::io;

pub struct TuiRenderer<B: Backend> {
    terminal: Terminal<B>,
    /// Raw mode and the alternate screen were entered by us
    owns_terminal: bool,
    restored: bool,
}

impl TuiRenderer<CrosstermBackend<io::Stdout>> {
    /// Take over the terminal: raw mode, alternate screen, bracketed paste
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableBracketedPaste) {
            let _ = disable_raw_mode();
            return Err(e).context("Failed to setup terminal");
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;
        Ok(Self {
            terminal,
            owns_terminal: true,
            restored: false,
        })
    }
}

impl<B: Backend> TuiRenderer<B> {
    /// Render into an existing backend (tests use ratatui's `TestBackend`)
    pub fn with_backend(backend: B) -> Result<Self> {
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;
        Ok(Self {
            terminal,
            owns_terminal: false,
            restored: false,
        })
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        if self.owns_terminal {
            disable_raw_mode()?;
            execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen)?;
        }
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl<B: Backend> Renderer for TuiRenderer<B> {
    fn redraw(&mut self, view: &ScreenView) -> Result<()> {
        self.terminal
            .draw(|frame| draw_screen(frame, view))
            .context("Failed to draw screen")?;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.restore()
    }
}

impl<B: Backend> Drop for TuiRenderer<B> {
    fn drop(&mut self) {
        // Ensure terminal is restored even if shutdown() wasn't called
        let _ = self.restore();
    }
}

fn draw_screen(frame: &mut Frame, view: &ScreenView) {
    let screen = frame.area();
    if screen.height == 0 || screen.width == 0 {
        return;
    }
    let [main, message] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .areas(screen);

    let mut cursor = None;
    if let Some(layout) = &view.layout {
        for (area, rect) in layout.areas.iter().zip(area_rects(layout.kind, main)) {
            if let Some(position) = draw_area(frame, area, rect) {
                cursor = Some(position);
            }
        }
    }
    for popup in &view.popups {
        let rect = popup_rect(popup.placement, main, popup.area.line_count);
        frame.render_widget(Clear, rect);
        if let Some(position) = draw_area(frame, &popup.area, rect) {
            cursor = Some(position);
        }
    }

    let text = view.message.clone().unwrap_or_default();
    frame.render_widget(
        Paragraph::new(Line::from(text)).style(Style::default().fg(Color::Yellow)),
        message,
    );
    if let Some(position) = cursor {
        frame.set_cursor_position(position);
    }
}

/// Draw one area; returns the cursor position when it is the active one
fn draw_area(frame: &mut Frame, area: &AreaView, rect: Rect) -> Option<Position> {
    let border_style = if area.active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(area.name.clone());
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    if inner.height == 0 || inner.width == 0 {
        return None;
    }

    let start = visible_start(area, inner.height as usize);
    let lines: Vec<Line> = area
        .lines
        .iter()
        .skip(start - area.first_line)
        .take(inner.height as usize)
        .map(|l| Line::from(l.replace('\t', "    ")))
        .collect();
    let (column, row) = area.hot_point;
    let scroll_x = column.saturating_sub(inner.width as usize - 1);
    frame.render_widget(Paragraph::new(lines).scroll((0, scroll_x as u16)), inner);

    if !area.active || row < start {
        return None;
    }
    let y = inner.y as usize + (row - start);
    let x = inner.x as usize + (column - scroll_x);
    if y >= (inner.y + inner.height) as usize {
        return None;
    }
    Some(Position::new(x as u16, y as u16))
}

/// First absolute line to show so the hot point stays visible
fn visible_start(area: &AreaView, height: usize) -> usize {
    let last = area.first_line + area.lines.len();
    let hot = area.hot_point.1.clamp(area.first_line, last.max(area.first_line + 1) - 1);
    let start = (hot + 1).saturating_sub(height).max(area.first_line);
    start.min(last)
}

/// Screen rectangles for a layout, in the layout's area order
pub fn area_rects(kind: LayoutKind, rect: Rect) -> Vec<Rect> {
    let halves = |direction: Direction, r: Rect| -> [Rect; 2] {
        Layout::default()
            .direction(direction)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(r)
    };
    match kind {
        LayoutKind::Single => vec![rect],
        LayoutKind::LeftRight => halves(Direction::Horizontal, rect).to_vec(),
        LayoutKind::TopBottom => halves(Direction::Vertical, rect).to_vec(),
        LayoutKind::LeftTopBottom => {
            let [left, right] = halves(Direction::Horizontal, rect);
            let [top, bottom] = halves(Direction::Vertical, right);
            vec![left, top, bottom]
        }
        LayoutKind::LeftRightBottom => {
            let [upper, bottom] = halves(Direction::Vertical, rect);
            let [left, right] = halves(Direction::Horizontal, upper);
            vec![left, right, bottom]
        }
    }
}

/// Popup rectangle against its edge: up to a third of the screen, fitted to content
pub fn popup_rect(placement: Placement, rect: Rect, line_count: usize) -> Rect {
    let wanted_height = (line_count as u16).saturating_add(2).max(3);
    let height = wanted_height.min((rect.height / 3).max(3)).min(rect.height);
    let width = (rect.width / 3).max(20).min(rect.width);
    match placement {
        Placement::Top => Rect::new(rect.x, rect.y, rect.width, height),
        Placement::Bottom => Rect::new(
            rect.x,
            rect.y + rect.height.saturating_sub(height),
            rect.width,
            height,
        ),
        Placement::Left => Rect::new(rect.x, rect.y, width, rect.height),
        Placement::Right => Rect::new(
            rect.x + rect.width.saturating_sub(width),
            rect.y,
            width,
            rect.height,
        ),
    }
}
