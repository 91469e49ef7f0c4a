//! Terminal rendering surface
//!
//! Declaratively redraws the simulated session and the tmux-style
//! status bar from the mirrored view state, on every event and once a
//! second for the clock.

mod view;

pub use view::ViewState;

use std::time::Duration;

use anyhow::Result;
use chrono::{Local, Timelike};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{DefaultTerminal, Frame};
use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{info, trace, warn};

use crate::chord::Overlay;
use crate::config::Config;
use crate::events::UiEvent;
use crate::script;

// Catppuccin macchiato
const BG: Color = Color::Rgb(0x1e, 0x20, 0x30);
const TEXT: Color = Color::Rgb(0xca, 0xd3, 0xf5);
const SUBTEXT: Color = Color::Rgb(0xa5, 0xad, 0xcb);
const MUTED: Color = Color::Rgb(0x65, 0x69, 0x89);
const SURFACE: Color = Color::Rgb(0x36, 0x3a, 0x4f);
const RED: Color = Color::Rgb(0xed, 0x87, 0x96);
const GREEN: Color = Color::Rgb(0xa6, 0xe3, 0xa1);
const TEAL: Color = Color::Rgb(0x8b, 0xd5, 0xca);
const BLUE: Color = Color::Rgb(0x7d, 0xc4, 0xe4);
const LINK: Color = Color::Rgb(0xf2, 0xd5, 0xcf);

const LOGO: [&str; 7] = [
    r"      /\       ",
    r"     /  \      ",
    r"    /\   \     ",
    r"   /      \    ",
    r"  /   ,,   \   ",
    r" /   |  |  -\  ",
    r"/_-''    ''-_\ ",
];

/// Owns the terminal and redraws from mirrored events
pub struct Renderer {
    config: Config,
    view: ViewState,
    event_rx: broadcast::Receiver<UiEvent>,
}

impl Renderer {
    pub fn new(config: Config, event_rx: broadcast::Receiver<UiEvent>) -> Self {
        Self {
            config,
            view: ViewState::new(),
            event_rx,
        }
    }

    /// Run until the event channel closes; restores the terminal on
    /// the way out, including on error
    pub async fn run(mut self) -> Result<()> {
        let mut terminal = ratatui::try_init()?;
        let result = self.event_loop(&mut terminal).await;
        ratatui::restore();
        info!("renderer stopped");
        result
    }

    async fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        // the status bar clock needs a periodic redraw
        let mut clock = interval(Duration::from_secs(1));

        loop {
            terminal.draw(|frame| draw(frame, &self.view, &self.config))?;

            tokio::select! {
                _ = clock.tick() => {}
                result = self.event_rx.recv() => match result {
                    Ok(event) => {
                        trace!(%event, "ui event");
                        self.view.apply(&event);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "renderer lagged behind events");
                    }
                    Err(broadcast::error::RecvError::Closed) => return Ok(()),
                },
            }
        }
    }
}

fn draw(frame: &mut Frame, view: &ViewState, config: &Config) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(BG)), area);

    let [content, bar] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    draw_session(frame, content, view);
    draw_status_bar(frame, bar, view, config);

    if let Some(overlay) = view.overlay {
        draw_split(frame, content, overlay);
    }
    if view.pane_shift {
        draw_newwin_pane(frame, content);
    }
    if let Some(status) = &view.status {
        draw_bubble(frame, content, status, Alignment::Left);
    }
    if view.awaiting {
        draw_bubble(frame, content, "[prefix]", Alignment::Right);
    }
    if view.help_visible {
        draw_help(frame, area);
    }
}

/// Banner plus the scripted command lines and their outputs
fn draw_session(frame: &mut Frame, area: Rect, view: &ViewState) {
    let mut lines = banner_lines();
    lines.push(Line::default());

    for (index, script_line) in script::LINES.iter().enumerate() {
        // a line appears only after the previous output block
        if index > 0 && !view.lines[index - 1].output_shown {
            break;
        }

        let mut spans = vec![
            Span::styled(script::PROMPT_USER, Style::default().fg(RED)),
            Span::styled(script::PROMPT_PATH, Style::default().fg(TEXT)),
            Span::styled(view.lines[index].visible.clone(), Style::default().fg(TEXT)),
        ];
        if view.cursor_on(index) {
            spans.push(Span::styled("\u{2588}", Style::default().fg(TEXT)));
        }
        lines.push(Line::from(spans));

        if view.lines[index].output_shown {
            for out in script_line.output {
                let style = if out.contains("](") {
                    Style::default().fg(LINK)
                } else {
                    Style::default().fg(TEXT)
                };
                lines.push(Line::styled(*out, style));
            }
        }
    }

    // nudge the page content while the new-window pane slides in
    let target = if view.pane_shift {
        Rect {
            x: area.x + 2,
            width: area.width.saturating_sub(2),
            ..area
        }
    } else {
        area
    };
    frame.render_widget(Paragraph::new(lines), target);
}

/// Neofetch-style two-column banner
fn banner_lines() -> Vec<Line<'static>> {
    let info: [(&str, String); 7] = [
        ("", "guest@lucky-falcon".to_string()),
        ("", "-------------------".to_string()),
        ("os: ", "Arch Linux x86_64".to_string()),
        ("uptime: ", format_uptime()),
        ("packages: ", "595 (cargo)".to_string()),
        ("shell: ", "zsh + tmux".to_string()),
        ("editor: ", "neovim".to_string()),
    ];

    LOGO.iter()
        .zip(info)
        .map(|(logo, (label, value))| {
            let value_style = if label.is_empty() && value.starts_with('-') {
                Style::default().fg(MUTED)
            } else {
                Style::default().fg(TEXT)
            };
            Line::from(vec![
                Span::styled(*logo, Style::default().fg(BLUE)),
                Span::raw("  "),
                Span::styled(label.to_string(), Style::default().fg(RED)),
                Span::styled(value, value_style),
            ])
        })
        .collect()
}

/// One-line bar: session/host left, window list center, clock right
fn draw_status_bar(frame: &mut Frame, area: Rect, view: &ViewState, config: &Config) {
    let left = Line::from(vec![
        Span::styled(
            format!("[{}]", config.session),
            Style::default().fg(BG).bg(TEAL).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {} ", config.hostname), Style::default().fg(TEXT).bg(SURFACE)),
    ]);

    let mut center = Vec::new();
    for (index, name) in config.windows.iter().enumerate() {
        if index > 0 {
            center.push(Span::raw(" "));
        }
        if index == view.active_window {
            center.push(Span::styled(
                format!(" {}:{}* ", index, name),
                Style::default().fg(BG).bg(GREEN),
            ));
        } else {
            center.push(Span::styled(
                format!(" {}:{} ", index, name),
                Style::default().fg(SUBTEXT),
            ));
        }
    }

    let right = Line::from(vec![
        Span::styled("85% ", Style::default().fg(SUBTEXT)),
        Span::styled("0.42 ", Style::default().fg(SUBTEXT)),
        Span::styled(format_clock(), Style::default().fg(SUBTEXT)),
    ]);

    let left_width = left.width() as u16;
    let right_width = right.width() as u16;
    let [left_area, center_area, right_area] = Layout::horizontal([
        Constraint::Length(left_width),
        Constraint::Min(0),
        Constraint::Length(right_width),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(left).style(Style::default().bg(SURFACE)),
        left_area,
    );
    frame.render_widget(
        Paragraph::new(Line::from(center))
            .alignment(Alignment::Center)
            .style(Style::default().bg(SURFACE)),
        center_area,
    );
    frame.render_widget(
        Paragraph::new(right).style(Style::default().bg(SURFACE)),
        right_area,
    );
}

/// Floating one-line bubble just above the status bar
fn draw_bubble(frame: &mut Frame, content: Rect, text: &str, side: Alignment) {
    if content.height == 0 {
        return;
    }
    let width = (text.len() as u16 + 2).min(content.width);
    let x = match side {
        Alignment::Right => content.right().saturating_sub(width + 1),
        _ => content.x + 1,
    };
    let area = Rect {
        x,
        y: content.bottom().saturating_sub(1),
        width,
        height: 1,
    };
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(format!(" {} ", text)).style(Style::default().fg(TEXT).bg(SURFACE)),
        area,
    );
}

/// Transient split divider through the middle of the content area
fn draw_split(frame: &mut Frame, content: Rect, overlay: Overlay) {
    let style = Style::default().fg(Color::Rgb(0x4b, 0x4f, 0x6b));
    match overlay {
        Overlay::VerticalSplit => {
            let area = Rect {
                x: content.x + content.width / 2,
                y: content.y,
                width: 1,
                height: content.height,
            };
            let bar: Vec<Line> = (0..area.height).map(|_| Line::styled("\u{2502}", style)).collect();
            frame.render_widget(Paragraph::new(bar), area);
        }
        Overlay::HorizontalSplit => {
            let area = Rect {
                x: content.x,
                y: content.y + content.height / 2,
                width: content.width,
                height: 1,
            };
            let rule = "\u{2500}".repeat(area.width as usize);
            frame.render_widget(Paragraph::new(Line::styled(rule, style)), area);
        }
    }
}

/// Transient pane sliding in from the right while a new window is
/// "created", paired with the content nudge
fn draw_newwin_pane(frame: &mut Frame, content: Rect) {
    let width = content.width / 2;
    if width == 0 || content.height == 0 {
        return;
    }
    let area = Rect {
        x: content.right().saturating_sub(width),
        y: content.y,
        width,
        height: content.height,
    };
    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::default()
            .borders(Borders::LEFT)
            .style(Style::default().bg(SURFACE).fg(Color::Rgb(0x4b, 0x4f, 0x6b))),
        area,
    );
}

/// Centered key-binding reference panel
fn draw_help(frame: &mut Frame, area: Rect) {
    let width = 44.min(area.width.saturating_sub(4));
    let height = 11.min(area.height.saturating_sub(2));
    let panel = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    let rows = [
        ("?", "help"),
        ("%", "split vertical"),
        ("\"", "split horizontal"),
        ("c", "new window"),
        ("n / p", "next/prev window"),
        ("0-9", "select window"),
        ("d", "detach"),
    ];
    let mut lines: Vec<Line> = rows
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled("ctrl+b ", Style::default().fg(SUBTEXT)),
                Span::styled(format!("{:<6}", key), Style::default().fg(TEXT).bg(SURFACE)),
                Span::styled(format!("  {}", action), Style::default().fg(TEXT)),
            ])
        })
        .collect();
    lines.push(Line::default());
    lines.push(Line::styled("Press Esc to close", Style::default().fg(SUBTEXT)));

    frame.render_widget(Clear, panel);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("tmux keys")
                .style(Style::default().fg(TEXT).bg(BG)),
        ),
        panel,
    );
}

/// Status bar clock, e.g. "Thu, Sep 11"
fn format_clock() -> String {
    Local::now().format("%a, %b %d").to_string()
}

/// Simulated uptime: minutes since local midnight
fn format_uptime() -> String {
    let now = Local::now();
    let mins = now.hour() * 60 + now.minute();
    let hours = mins / 60;
    let rest = mins % 60;
    if hours > 0 {
        format!("{} hours, {} mins", hours, rest)
    } else {
        format!("{} mins", rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_format_shape() {
        let uptime = format_uptime();
        assert!(uptime.ends_with("mins") || uptime.ends_with("min"));
    }

    #[test]
    fn test_logo_and_banner_align() {
        assert_eq!(banner_lines().len(), LOGO.len());
    }

    #[test]
    fn test_pane_shift_draws_slide_in_pane() {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut view = ViewState::new();
        view.apply(&UiEvent::PaneShiftStarted);
        let config = Config::default();

        terminal.draw(|frame| draw(frame, &view, &config)).unwrap();

        // the pane covers the right half with a left border
        let buffer = terminal.backend().buffer();
        assert_eq!(buffer.cell((40, 0)).unwrap().symbol(), "\u{2502}");

        view.apply(&UiEvent::PaneShiftEnded);
        terminal.draw(|frame| draw(frame, &view, &config)).unwrap();
        let buffer = terminal.backend().buffer();
        assert_ne!(buffer.cell((40, 0)).unwrap().symbol(), "\u{2502}");
    }
}
