use anyhow::Result;
use credit_limits::format::{format_currency, format_timestamp, mask_account};
use credit_limits::{
    filter_applications, AppState, Application, ApplicationStatus, EditForm, FormField, MockApi,
    StatusFilter, SubmitOutcome, DebouncedSearch,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// How often the loop wakes up to flush the search debounce
const TICK: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Browse,
    Search,
    Edit(EditForm),
}

pub struct App {
    pub state: AppState<MockApi>,
    pub visible: Vec<Application>,
    pub table_state: TableState,
    pub status_filter: StatusFilter,
    pub search: DebouncedSearch,
    pub mode: Mode,
    pub should_quit: bool,
}

impl App {
    pub fn new(state: AppState<MockApi>, search_debounce: Duration) -> Self {
        let mut app = Self {
            state,
            visible: Vec::new(),
            table_state: TableState::default(),
            status_filter: StatusFilter::All,
            search: DebouncedSearch::new(search_debounce),
            mode: Mode::Browse,
            should_quit: false,
        };
        app.refresh_visible();
        app
    }

    /// Re-run the status → search pipeline and keep the selection in range
    pub fn refresh_visible(&mut self) {
        let selected_id = self.selected_row().map(|a| a.id.clone());

        self.visible =
            filter_applications(self.state.applications(), self.status_filter, self.search.term());

        let index = selected_id
            .and_then(|id| self.visible.iter().position(|a| a.id == id))
            .or(if self.visible.is_empty() { None } else { Some(0) });
        self.table_state.select(index);
    }

    pub fn selected_row(&self) -> Option<&Application> {
        self.table_state.selected().and_then(|i| self.visible.get(i))
    }

    pub fn next(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn cycle_filter(&mut self) {
        self.status_filter = self.status_filter.next();
        self.refresh_visible();
    }

    pub fn reload(&mut self) {
        self.state.load_applications();
        self.refresh_visible();
    }

    pub fn open_editor(&mut self) {
        let Some(id) = self.selected_row().map(|a| a.id.clone()) else {
            return;
        };
        self.state.select_application(Some(&id));
        if let Some(app) = self.state.selected_application() {
            self.mode = Mode::Edit(EditForm::new(app));
        }
    }

    pub fn close_editor(&mut self) {
        self.state.select_application(None);
        self.mode = Mode::Browse;
    }

    pub fn submit_editor(&mut self) {
        let Mode::Edit(form) = &mut self.mode else {
            return;
        };
        match self.state.submit_edit(form) {
            // Stay open so the inline errors are visible
            SubmitOutcome::Invalid(_) => {}
            SubmitOutcome::Saved { .. } | SubmitOutcome::Failed(_) => {
                self.close_editor();
                self.refresh_visible();
            }
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if self.search.tick(now) {
            self.refresh_visible();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        match &mut self.mode {
            Mode::Browse => match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Esc if self.state.error().is_some() => self.state.clear_error(),
                KeyCode::Esc => self.should_quit = true,
                KeyCode::Char('x') => self.state.clear_error(),
                KeyCode::Char('/') => self.mode = Mode::Search,
                KeyCode::Char('f') => self.cycle_filter(),
                KeyCode::Char('r') => self.reload(),
                KeyCode::Enter => self.open_editor(),
                KeyCode::Down | KeyCode::Char('j') => self.next(),
                KeyCode::Up | KeyCode::Char('k') => self.previous(),
                KeyCode::Home => {
                    if !self.visible.is_empty() {
                        self.table_state.select(Some(0));
                    }
                }
                KeyCode::End => {
                    if !self.visible.is_empty() {
                        self.table_state.select(Some(self.visible.len() - 1));
                    }
                }
                _ => {}
            },
            Mode::Search => match key.code {
                KeyCode::Enter | KeyCode::Esc => self.mode = Mode::Browse,
                KeyCode::Backspace => self.search.pop(now),
                KeyCode::Char(ch) => self.search.push(ch, now),
                _ => {}
            },
            Mode::Edit(form) => match key.code {
                KeyCode::Esc => self.close_editor(),
                KeyCode::Enter => self.submit_editor(),
                KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
                KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.previous(),
                KeyCode::Left | KeyCode::Right => {
                    let forward = key.code == KeyCode::Right;
                    match form.focus {
                        FormField::Reason => form.cycle_reason(forward),
                        FormField::Status => form.cycle_status(forward),
                        FormField::Limit => {}
                    }
                }
                KeyCode::Backspace if form.focus == FormField::Limit => form.pop_limit_char(),
                KeyCode::Char(ch) if form.focus == FormField::Limit => form.push_limit_char(ch),
                _ => {}
            },
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key, Instant::now());
                }
            }
        }
        app.tick(Instant::now());
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    let has_error = app.state.error().is_some();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                              // Header with totals
            Constraint::Length(if has_error { 3 } else { 0 }), // Error banner
            Constraint::Length(3),                              // Filter + search
            Constraint::Min(6),                                 // Applications
            Constraint::Length(8),                              // Change log
            Constraint::Length(3),                              // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    if has_error {
        render_error_banner(f, chunks[1], app);
    }
    render_toolbar(f, chunks[2], app);
    render_table(f, chunks[3], app);
    render_change_log(f, chunks[4], app);
    render_status_bar(f, chunks[5], app);

    if let Mode::Edit(form) = &app.mode {
        render_edit_modal(f, form, app.state.is_loading());
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let spans = vec![
        Span::styled(
            "Credit Limits",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Total: {}", app.state.total_count()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("New: {}", app.state.new_count()),
            Style::default().fg(Color::Yellow),
        ),
    ];

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_error_banner(f: &mut Frame, area: Rect, app: &App) {
    let message = app.state.error().unwrap_or_default();
    let banner = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {} ", message), Style::default().fg(Color::Red)),
        Span::raw(" ("),
        Span::styled("x", Style::default().fg(Color::Yellow)),
        Span::raw(" dismiss)"),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Error "),
    );

    f.render_widget(banner, area);
}

fn render_toolbar(f: &mut Frame, area: Rect, app: &App) {
    let searching = app.mode == Mode::Search;
    let search_style = if searching {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![
        Span::styled("Status: ", Style::default().fg(Color::Cyan)),
        Span::styled(
            app.status_filter.label(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled("Search: ", Style::default().fg(Color::Cyan)),
        Span::styled(app.search.input().to_string(), search_style),
    ];
    if searching {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }
    if app.search.is_pending() {
        spans.push(Span::styled(" …", Style::default().fg(Color::DarkGray)));
    }

    let toolbar = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::White)));

    f.render_widget(toolbar, area);
}

fn status_color(status: ApplicationStatus) -> Color {
    match status {
        ApplicationStatus::New => Color::Yellow,
        ApplicationStatus::Approved => Color::Green,
        ApplicationStatus::Rejected => Color::Red,
    }
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    if app.state.is_loading() && app.state.applications().is_empty() {
        let loading = Paragraph::new("Loading applications…")
            .block(Block::default().borders(Borders::ALL).title(" Applications "));
        f.render_widget(loading, area);
        return;
    }

    if app.visible.is_empty() {
        let empty = Paragraph::new("No applications found")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Applications "));
        f.render_widget(empty, area);
        return;
    }

    let header_cells = ["ID", "Client", "Current limit", "Requested limit", "Status"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.visible.iter().map(|a| {
        let cells = vec![
            Cell::from(a.id.clone()),
            Cell::from(truncate(&a.name, 40)),
            Cell::from(format_currency(a.current_limit, &a.currency)),
            Cell::from(format_currency(a.requested_limit, &a.currency)),
            Cell::from(a.status.as_str()).style(Style::default().fg(status_color(a.status))),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(42),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Applications "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_change_log(f: &mut Frame, area: Rect, app: &App) {
    let entries = app.state.change_log();
    let lines: Vec<Line> = if entries.is_empty() {
        vec![Line::from(Span::styled(
            "  No changes this session",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))]
    } else {
        entries
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::styled(
                        format!("  {} ", format_timestamp(&entry.timestamp)),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(entry.description.clone()),
                ])
            })
            .collect()
    };

    let log = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" Change log ({}) ", entries.len())),
    );

    f.render_widget(log, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.table_state.selected().map(|i| i + 1).unwrap_or(0);

    let keys: &[(&str, &str)] = match app.mode {
        Mode::Browse => &[
            ("Enter", " Edit | "),
            ("f", " Filter | "),
            ("/", " Search | "),
            ("r", " Reload | "),
            ("↑/↓", " Nav | "),
        ],
        Mode::Search => &[("Enter/Esc", " Done | ")],
        Mode::Edit(_) => &[
            ("Tab", " Field | "),
            ("←/→", " Change | "),
            ("Enter", " Save | "),
            ("Esc", " Cancel | "),
        ],
    };

    let mut spans = vec![
        Span::styled(
            format!(" Row: {}/{} ", selected, app.visible.len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
    ];
    for (key, label) in keys {
        spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(*label));
    }
    spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_edit_modal(f: &mut Frame, form: &EditForm, saving: bool) {
    let area = centered_rect(70, 22, f.size());
    let validation = form.validation();
    let app = &form.original;

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let field_style = |field: FormField| {
        if form.focus == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        }
    };
    let error_style = Style::default().fg(Color::Red);

    let mut lines = vec![
        Line::from(vec![Span::styled("  Client ID: ", label), Span::raw(app.id.clone())]),
        Line::from(vec![Span::styled("  Account: ", label), Span::raw(mask_account(&app.account))]),
        Line::from(vec![
            Span::styled("  Current limit: ", label),
            Span::raw(format_currency(app.current_limit, &app.currency)),
        ]),
        Line::from(vec![
            Span::styled("  Requested limit: ", label),
            Span::styled(
                format_currency(app.requested_limit, &app.currency),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from("  ─────────────────────────────────────"),
        Line::from(vec![
            Span::styled("  New limit *: ", label),
            Span::styled(format!("[{}]", form.limit_text()), field_style(FormField::Limit)),
        ]),
    ];

    if form.touched {
        if let Some(err) = &validation.limit_error {
            lines.push(Line::from(Span::styled(format!("    {}", err), error_style)));
        }
    }

    let reason_text = form.reason.map(|r| r.label()).unwrap_or("(choose a reason)");
    lines.push(Line::from(vec![
        Span::styled(
            if validation.is_reason_required { "  Reason *: " } else { "  Reason: " },
            label,
        ),
        Span::styled(format!("◀ {} ▶", reason_text), field_style(FormField::Reason)),
    ]));
    let offered: Vec<&str> = validation.available_reasons.iter().map(|r| r.label()).collect();
    lines.push(Line::from(Span::styled(
        format!("    Options: {}", offered.join(", ")),
        Style::default().fg(Color::DarkGray),
    )));
    if form.touched {
        if let Some(err) = &validation.reason_error {
            lines.push(Line::from(Span::styled(format!("    {}", err), error_style)));
        }
    }

    lines.push(Line::from(vec![
        Span::styled("  Status: ", label),
        Span::styled(format!("◀ {} ▶", form.status), field_style(FormField::Status)),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        if saving { "  Saving…" } else { "  Enter to save, Esc to cancel" },
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(format!(" Edit application: {} ", app.name)),
        );

    f.render_widget(Clear, area);
    f.render_widget(modal, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((r.height - height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
