use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};

use practice_planner::api::{self, HttpPlanApi};
use practice_planner::config::ApiConfig;
use practice_planner::form::IssueKind;
use practice_planner::plan_view;
use practice_planner::provider::spawn_provider;
use practice_planner::schema::{FIELDS, FieldKind};
use practice_planner::state::{AppState, Delta, Pane, ProviderCommand, apply_delta};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_overlay = false;
            }
            return;
        }
        if self.state.is_editing() {
            match key.code {
                KeyCode::Enter => {
                    let cmd = self.state.commit_edit();
                    self.dispatch(cmd);
                }
                KeyCode::Esc => self.state.cancel_edit(),
                KeyCode::Backspace => self.state.edit_pop(),
                KeyCode::Char(ch) => self.state.edit_push(ch),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.state.toggle_pane(),
            KeyCode::Char('j') | KeyCode::Down => match self.state.pane {
                Pane::Form => self.state.select_next(),
                Pane::Plan => self.state.scroll_plan(true),
            },
            KeyCode::Char('k') | KeyCode::Up => match self.state.pane {
                Pane::Form => self.state.select_prev(),
                Pane::Plan => self.state.scroll_plan(false),
            },
            KeyCode::PageDown => self.state.scroll_plan(true),
            KeyCode::PageUp => self.state.scroll_plan(false),
            KeyCode::Enter | KeyCode::Char('e') => {
                if self.state.selected_field().kind == FieldKind::Number {
                    self.state.begin_edit();
                } else {
                    let cmd = self.state.cycle_choice(true);
                    self.dispatch(cmd);
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                let cmd = self.state.cycle_choice(true);
                self.dispatch(cmd);
            }
            KeyCode::Left | KeyCode::Char('h') => {
                let cmd = self.state.cycle_choice(false);
                self.dispatch(cmd);
            }
            KeyCode::Backspace | KeyCode::Delete => {
                let name = self.state.selected_field().name;
                let cmd = self.state.set_field(name, "");
                self.dispatch(cmd);
            }
            KeyCode::Char('g') => {
                let cmd = self.state.request_preview();
                self.dispatch(cmd);
            }
            KeyCode::Char('s') => {
                let cmd = self.state.request_save();
                self.dispatch(cmd);
            }
            KeyCode::Char('r') => {
                let cmd = self.state.reset();
                self.dispatch(cmd);
            }
            KeyCode::Char(']') => self.state.cycle_rotation(true),
            KeyCode::Char('[') => self.state.cycle_rotation(false),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn dispatch(&mut self, cmd: Option<ProviderCommand>) {
        let Some(cmd) = cmd else {
            return;
        };
        let Some(tx) = &self.cmd_tx else {
            self.fail_unsent(cmd, "Plan service worker unavailable");
            return;
        };
        if let Err(mpsc::SendError(cmd)) = tx.send(cmd) {
            self.fail_unsent(cmd, "Plan service worker stopped");
        }
    }

    // A command that never reached the worker still has to settle its ticket.
    fn fail_unsent(&mut self, cmd: ProviderCommand, reason: &str) {
        let delta = match cmd {
            ProviderCommand::FetchPositions(ticket) => Delta::PositionsLoaded {
                ticket,
                result: Err(reason.to_string()),
            },
            ProviderCommand::GeneratePlan(request) => Delta::PlanFinished {
                ticket: request.ticket,
                result: Err(reason.to_string()),
            },
        };
        apply_delta(&mut self.state, delta);
    }
}

fn main() -> io::Result<()> {
    let config = ApiConfig::from_env();

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let mut app = match HttpPlanApi::new(config.clone()) {
        Ok(api) => {
            spawn_provider(Arc::new(api), config.parallelism, tx, cmd_rx);
            App::new(Some(cmd_tx))
        }
        Err(err) => {
            let mut app = App::new(None);
            app.state.push_log(format!("[WARN] {err:#}"));
            app
        }
    };
    app.state.push_log(format!(
        "[INFO] Plan service: {}",
        config.endpoint("/api")
    ));
    for cmd in app.state.initial_commands() {
        app.dispatch(Some(cmd));
    }

    api::install_quiet_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(52), Constraint::Min(40)])
        .split(chunks[1]);
    render_form(frame, body[0], &app.state);
    render_plan(frame, body[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let status = if state.session.loading {
        "Generating..."
    } else if state.session.error.is_some() {
        "Error"
    } else if state.session.success {
        "Ready"
    } else {
        "Idle"
    };
    format!("PRACTICE PLANNER | {status}")
}

fn footer_text(state: &AppState) -> String {
    if state.is_editing() {
        return "Type value | Enter Commit | Esc Cancel | Backspace Delete".to_string();
    }
    match state.pane {
        Pane::Form => {
            "j/k Move | Enter Edit | ←/→ Choose | Del Clear | g Generate | s Save | r Reset | Tab Plan | ? Help | q Quit".to_string()
        }
        Pane::Plan => {
            "j/k Scroll | [/] Rotation | g Generate | s Save | r Reset | Tab Form | ? Help | q Quit".to_string()
        }
    }
}

fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.pane == Pane::Form;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title("Practice Parameters")
        .borders(Borders::ALL)
        .border_style(border_style);

    let issues = state.session.params.validate();
    let mut lines = Vec::with_capacity(FIELDS.len() + 6);
    for (idx, spec) in FIELDS.iter().enumerate() {
        let selected = idx == state.field_selected;
        let value = match (&state.edit_buffer, selected) {
            (Some(buf), true) => format!("{buf}_"),
            _ => state.display_value(spec.name),
        };
        let hint = spec
            .bounds
            .map(|bounds| format!(" [{}]", bounds.hint()))
            .unwrap_or_default();
        let marker = if selected { "> " } else { "  " };
        let required = if spec.required { "*" } else { "" };
        let mut row_style = Style::default();
        if selected && focused {
            row_style = row_style.fg(Color::White).bg(Color::DarkGray);
        }
        let mut spans = vec![
            Span::styled(format!("{marker}{}{required}: ", spec.label), row_style),
            Span::styled(value, row_style.add_modifier(Modifier::BOLD)),
            Span::styled(hint, Style::default().fg(Color::DarkGray)),
        ];
        if let Some(issue) = issues.iter().find(|i| i.field == spec.name) {
            let mark = match issue.kind {
                IssueKind::Missing => " (required)",
                IssueKind::NotANumber => " (not a number)",
                IssueKind::OutOfRange => " (out of range)",
            };
            spans.push(Span::styled(mark, Style::default().fg(Color::Red)));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        state.session.params.describe(),
        Style::default().fg(Color::Gray),
    )));
    if let Some(err) = &state.positions.error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }
    if let Some(err) = &state.session.error {
        lines.push(Line::from(Span::styled(
            format!("Error: {err}"),
            Style::default().fg(Color::Red),
        )));
    } else if state.session.loading {
        lines.push(Line::from(Span::styled(
            "Generating...",
            Style::default().fg(Color::Cyan),
        )));
    }

    let form = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(form, area);
}

fn render_plan(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.pane == Pane::Plan;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title("Practice Plan")
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let Some(plan) = state.session.plan.as_ref() else {
        let text = if state.session.loading {
            "Generating practice plan..."
        } else {
            "No plan yet. Press g to generate a preview."
        };
        let empty = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    };

    let header = plan_view::header_lines(plan);
    let rows = plan_view::plan_rows(plan, state.selected_rotation);
    let table_height = (rows.len() as u16 + 1).min(inner.height / 2).max(2);
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header.len() as u16 + 1),
            Constraint::Length(table_height),
            Constraint::Min(1),
        ])
        .split(inner);

    let header_widget = Paragraph::new(header.join("\n"))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: true });
    frame.render_widget(header_widget, sections[0]);

    let table_rows = rows.iter().map(|row| {
        let style = if row.is_rotation_header {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(row.time.clone()),
            Cell::from(Line::from(vec![
                Span::styled("■ ", Style::default().fg(row.color)),
                Span::raw(row.activity.clone()),
            ])),
            Cell::from(row.detail.clone()),
            Cell::from(row.duration.clone()),
            Cell::from(row.equipment.clone()),
        ])
        .style(style)
    });
    let table = Table::new(
        table_rows,
        [
            Constraint::Length(10),
            Constraint::Min(22),
            Constraint::Min(18),
            Constraint::Length(9),
            Constraint::Min(12),
        ],
    )
    .header(
        Row::new(vec!["Time", "Activity", "Drill", "Duration", "Equipment"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(table, sections[1]);

    let mut notes = vec!["Drill Instructions".to_string()];
    notes.extend(plan_view::instruction_lines(plan));
    let equipment = plan_view::equipment_lines(plan);
    if !equipment.is_empty() {
        notes.push("Equipment Needed".to_string());
        notes.extend(equipment.into_iter().map(|line| format!("  {line}")));
    }
    let notes_widget = Paragraph::new(notes.join("\n"))
        .wrap(Wrap { trim: false })
        .scroll((state.plan_scroll, 0));
    frame.render_widget(notes_widget, sections[2]);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(4)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Practice Planner - Help",
        "",
        "Form:",
        "  j/k or ↑/↓   Move between fields",
        "  Enter / e    Edit number (or next choice)",
        "  ←/→ h/l      Cycle sport, focus, position, age",
        "  Del / Bksp   Clear field (no constraint)",
        "",
        "Plan:",
        "  g            Generate preview",
        "  s            Save previewed plan",
        "  r            Reset form to defaults",
        "  [ / ]        Previous / next rotation",
        "  PgUp/PgDn    Scroll instructions",
        "",
        "  Tab          Switch pane",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
