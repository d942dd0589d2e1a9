mod clipboard;
mod help;
mod state;

use crate::cli::Cli;
use crate::controller::{
    ClipboardWriter, CopyOutcome, GenerationController, InputUpdate, PendingRequest, Status,
};
use crate::engine::{GenerationService, HttpGenerationClient};
use crate::error::GenerateError;
use crate::model::ServiceConfig;
use crate::orchestrator::{self, AppEvent, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};
use state::{wrapped_height, Focus, UiState};
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// What the run loop should do after a key press.
#[derive(Debug)]
enum KeyAction {
    None,
    Dispatch(PendingRequest),
    Quit,
}

pub async fn run(args: Cli, cfg: ServiceConfig, initial_content: String) -> Result<()> {
    let service: Arc<dyn GenerationService> = Arc::new(HttpGenerationClient::new(&cfg)?);

    // Unbounded channels keep the UI thread from ever blocking on the runtime.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let mut controller = GenerationController::new();
    controller.update_input(InputUpdate::Content(initial_content));
    controller.update_input(InputUpdate::Tone(args.tone));
    let state = UiState::new(controller, cfg.endpoint.clone());

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_handle = std::thread::spawn(move || run_threaded(state, event_rx, cmd_tx));

    let res = orchestrator::run_dispatcher(service, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    mut state: UiState,
    mut event_rx: UnboundedReceiver<AppEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let clipboard = clipboard::SystemClipboard;
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    let res = loop {
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, ev);
            dirty = true;
        }

        if dirty || last_tick.elapsed() >= tick_rate {
            if last_tick.elapsed() >= tick_rate {
                state.tick = state.tick.wrapping_add(1);
                last_tick = Instant::now();
            }
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            dirty = false;
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if !event::poll(Duration::from_millis(10)).unwrap_or(false) {
            continue;
        }
        let action = match event::read() {
            Ok(Event::Key(k)) if k.kind == KeyEventKind::Press => {
                handle_key(&mut state, k, &clipboard)
            }
            Ok(Event::Paste(text)) => {
                if state.focus == Focus::Email && !state.show_help {
                    state.insert_text(&text);
                }
                KeyAction::None
            }
            _ => KeyAction::None,
        };
        dirty = true;

        match action {
            KeyAction::None => {}
            KeyAction::Dispatch(pending) => {
                let seq = pending.seq;
                if cmd_tx.send(UiCommand::Generate(pending)).is_err() {
                    state
                        .controller
                        .apply_outcome(seq, Err(GenerateError::Interrupted));
                }
            }
            KeyAction::Quit => {
                let _ = cmd_tx.send(UiCommand::Quit);
                break Ok(());
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, DisableBracketedPaste, LeaveAlternateScreen).ok();
    res
}

fn apply_event(state: &mut UiState, ev: AppEvent) {
    match ev {
        AppEvent::GenerationFinished { seq, outcome } => {
            if state.controller.apply_outcome(seq, outcome)
                && state.controller.state().status == Status::Success
            {
                state.info = "Reply ready. Ctrl-Y to copy".into();
            }
        }
    }
}

fn try_generate(state: &mut UiState) -> KeyAction {
    if !state.controller.can_submit() {
        state.info = if state.is_loading() {
            "Already generating…".into()
        } else {
            "Write or paste an email first".into()
        };
        return KeyAction::None;
    }
    state.info.clear();
    KeyAction::Dispatch(state.controller.begin_generate())
}

fn handle_key(state: &mut UiState, k: KeyEvent, clipboard: &dyn ClipboardWriter) -> KeyAction {
    if state.show_help && matches!(k.code, KeyCode::Esc | KeyCode::F(1)) {
        state.show_help = false;
        return KeyAction::None;
    }

    match (k.modifiers, k.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Esc) => KeyAction::Quit,
        (_, KeyCode::F(1)) => {
            state.show_help = !state.show_help;
            KeyAction::None
        }
        _ if state.show_help => KeyAction::None,
        (_, KeyCode::Tab) | (_, KeyCode::BackTab) => {
            state.focus = state.focus.toggle();
            KeyAction::None
        }
        (KeyModifiers::CONTROL, KeyCode::Char('g')) => try_generate(state),
        (KeyModifiers::CONTROL, KeyCode::Char('y')) => {
            state.info = match state.controller.copy_response(clipboard) {
                CopyOutcome::Copied => "✓ Copied to clipboard".into(),
                CopyOutcome::Empty => "Nothing to copy yet".into(),
                CopyOutcome::Failed(e) => format!("Clipboard copy failed: {e}"),
            };
            KeyAction::None
        }
        (KeyModifiers::CONTROL, KeyCode::Char('l')) => {
            state.controller.clear_response();
            state.info = "Response cleared".into();
            KeyAction::None
        }
        (mods, code) => match state.focus {
            Focus::Email => {
                match code {
                    KeyCode::Char(c)
                        if !mods.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                    {
                        state.insert_text(c.encode_utf8(&mut [0u8; 4]));
                    }
                    KeyCode::Enter => state.insert_text("\n"),
                    KeyCode::Backspace => state.backspace(),
                    _ => {}
                }
                KeyAction::None
            }
            Focus::Tone => match code {
                KeyCode::Left | KeyCode::Up => {
                    state.cycle_tone(false);
                    KeyAction::None
                }
                KeyCode::Right | KeyCode::Down => {
                    state.cycle_tone(true);
                    KeyAction::None
                }
                KeyCode::Enter => try_generate(state),
                _ => KeyAction::None,
            },
        },
    }
}

fn focused_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled("Endpoint: ", Style::default().fg(Color::Gray)),
        Span::raw(state.endpoint.as_str()),
    ]))
    .block(Block::default().borders(Borders::ALL).title("replycraft"));
    f.render_widget(header, chunks[0]);

    // Narrow terminals stack the panes.
    let direction = if chunks[1].width < 80 {
        Direction::Vertical
    } else {
        Direction::Horizontal
    };
    let panes = Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    draw_input(panes[0], f, state);
    draw_response(panes[1], f, state);

    let footer = if state.info.is_empty() {
        Line::from(Span::styled(
            "Ctrl-G generate · Ctrl-Y copy · Ctrl-L clear · Tab focus · F1 help · Esc quit",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(state.info.as_str())
    };
    f.render_widget(Paragraph::new(footer), chunks[2]);

    if state.show_help {
        let w = area.width.min(60);
        let h = area.height.min(20);
        let popup = Rect {
            x: area.x + (area.width - w) / 2,
            y: area.y + (area.height - h) / 2,
            width: w,
            height: h,
        };
        help::draw_help(popup, f);
    }
}

fn draw_input(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let gen = state.controller.state();
    let error_height = match gen.error_message.as_deref() {
        Some(msg) => wrapped_height(msg, area.width.saturating_sub(2)) + 2,
        None => 0,
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(error_height),
        ])
        .split(area);

    let email_focused = state.focus == Focus::Email && !state.show_help;
    let email_block = Block::default()
        .borders(Borders::ALL)
        .title("Email content")
        .border_style(focused_border(email_focused));
    let inner = email_block.inner(rows[0]);

    let text = if gen.email_content.is_empty() && !email_focused {
        Text::from(Span::styled(
            "Paste the email you received or write your context here...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut content = gen.email_content.clone();
        if email_focused {
            content.push('▏');
        }
        Text::from(content)
    };
    // Keep the end of the text (where typing happens) in view.
    let scroll = wrapped_height(&gen.email_content, inner.width).saturating_sub(inner.height);
    let email = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(email_block);
    f.render_widget(email, rows[0]);

    let controls = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let tone_focused = state.focus == Focus::Tone && !state.show_help;
    let tone = Paragraph::new(Line::from(vec![
        Span::styled("◀ ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            gen.tone.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ▶", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Tone")
            .border_style(focused_border(tone_focused)),
    );
    f.render_widget(tone, controls[0]);

    let button = if state.is_loading() {
        Line::from(vec![
            Span::styled(state.spinner(), Style::default().fg(Color::Cyan)),
            Span::raw(" Generating..."),
        ])
    } else if state.controller.can_submit() {
        Line::from(Span::styled(
            "Generate response (Ctrl-G)",
            Style::default().add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            "Generate response (Ctrl-G)",
            Style::default().fg(Color::DarkGray),
        ))
    };
    f.render_widget(
        Paragraph::new(button).block(Block::default().borders(Borders::ALL)),
        controls[1],
    );

    if let Some(msg) = gen.error_message.as_deref() {
        let err = Paragraph::new(msg)
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red)),
            );
        f.render_widget(err, rows[2]);
    }
}

fn draw_response(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let gen = state.controller.state();
    let badge_height = if gen.copied { 1 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(badge_height)])
        .split(area);

    let block = Block::default().borders(Borders::ALL).title("Response");
    let body = if state.is_loading() && gen.response_text.is_empty() {
        let bar = |n: usize| {
            Line::from(Span::styled(
                "▒".repeat(n),
                Style::default().fg(Color::DarkGray),
            ))
        };
        Paragraph::new(vec![
            Line::from(vec![
                Span::styled(state.spinner(), Style::default().fg(Color::Cyan)),
                Span::raw(" Generating..."),
            ]),
            Line::from(""),
            bar(24),
            bar(18),
            bar(30),
            bar(12),
        ])
    } else if !gen.response_text.is_empty() {
        Paragraph::new(gen.response_text.as_str()).wrap(Wrap { trim: false })
    } else {
        Paragraph::new(Span::styled(
            "Your reply will appear here.",
            Style::default().fg(Color::DarkGray),
        ))
    };
    f.render_widget(body.block(block), rows[0]);

    if gen.copied {
        f.render_widget(
            Paragraph::new(Span::styled(
                " Copied to clipboard",
                Style::default().fg(Color::Green),
            )),
            rows[1],
        );
    }
}
