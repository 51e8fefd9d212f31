//! Interactive dashboard application.
//!
//! Three tabbed views mirror the web dashboard: metrics summary with the
//! leaderboard and aging ranking, the task table with filtering and delete
//! confirmation, and the employee roster with per-employee stat bundles.
//! The store is re-read from disk after every mutation; re-fetch-after-write
//! is the only consistency mechanism.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::export::write_csv;
use crate::fields::Status;
use crate::metrics::{leaderboard, summary, task_aging};
use crate::store::{filter_tasks, format_status, truncate, Store};
use crate::task::Task;
use crate::tui::colors::{ACCENT_BLUE, DONE_GREEN, PROGRESS_AMBER, TODO_GREY};
use crate::tui::utils::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Dashboard,
    Tasks,
    Employees,
}

impl Tab {
    fn titles() -> [&'static str; 3] {
        ["Dashboard", "Tasks", "Employees"]
    }

    fn index(self) -> usize {
        match self {
            Tab::Dashboard => 0,
            Tab::Tasks => 1,
            Tab::Employees => 2,
        }
    }

    fn next(self) -> Tab {
        match self {
            Tab::Dashboard => Tab::Tasks,
            Tab::Tasks => Tab::Employees,
            Tab::Employees => Tab::Dashboard,
        }
    }

    fn prev(self) -> Tab {
        match self {
            Tab::Dashboard => Tab::Employees,
            Tab::Tasks => Tab::Dashboard,
            Tab::Employees => Tab::Tasks,
        }
    }
}

/// Main dashboard application state.
pub struct DashboardApp {
    dir: PathBuf,
    user: String,
    store: Store,
    tab: Tab,
    /// Visible task ids, newest first, after the employee filter.
    task_view: Vec<u64>,
    list_state: ListState,
    filter_employee: Option<String>,
    show_detail: bool,
    confirm_delete: Option<u64>,
    status_message: String,
}

impl DashboardApp {
    /// Create the app, seeding the starter roster on first use.
    pub fn new(dir: &Path, user: &str) -> io::Result<Self> {
        let mut store = Store::load(dir);
        let seeded = store.seed_employees_if_empty()?;

        let mut app = DashboardApp {
            dir: dir.to_path_buf(),
            user: user.to_string(),
            store,
            tab: Tab::Dashboard,
            task_view: Vec::new(),
            list_state: ListState::default(),
            filter_employee: None,
            show_detail: false,
            confirm_delete: None,
            status_message: if seeded {
                "Seeded starter roster (9 employees)".to_string()
            } else {
                String::new()
            },
        };
        app.update_task_view();
        Ok(app)
    }

    /// Re-read both collections from disk and rebuild the task view.
    fn refresh(&mut self) {
        self.store = Store::load(&self.dir);
        self.update_task_view();
    }

    fn update_task_view(&mut self) {
        let tasks = self.store.tasks_by_date_desc();
        let filtered = filter_tasks(&tasks, self.filter_employee.as_deref(), None);
        self.task_view = filtered.iter().map(|t| t.id).collect();
        // Keep the selection within the new view.
        let selected = self.list_state.selected().unwrap_or(0);
        if self.task_view.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(selected.min(self.task_view.len() - 1)));
        }
    }

    fn selected_task(&self) -> Option<&Task> {
        let idx = self.list_state.selected()?;
        let id = *self.task_view.get(idx)?;
        self.store.get_task(id)
    }

    /// Cycle the employee filter: everyone, then each roster member in turn.
    fn cycle_filter(&mut self) {
        let names: Vec<String> = self.store.employees.iter().map(|e| e.name.clone()).collect();
        self.filter_employee = match &self.filter_employee {
            None => names.first().cloned(),
            Some(current) => {
                let pos = names.iter().position(|n| n == current);
                match pos {
                    Some(i) if i + 1 < names.len() => Some(names[i + 1].clone()),
                    _ => None,
                }
            }
        };
        self.update_task_view();
        self.status_message = match &self.filter_employee {
            Some(name) => format!("Filter: {name}"),
            None => "Filter: all employees".to_string(),
        };
    }

    fn export_view(&mut self) {
        let tasks = self.store.tasks_by_date_desc();
        let filtered = filter_tasks(&tasks, self.filter_employee.as_deref(), None);
        let path = self.dir.join("tasks.csv");
        match write_csv(&filtered, &path) {
            Ok(rows) => {
                self.status_message = format!("Exported {} task(s) to {}", rows, path.display());
            }
            Err(e) => {
                self.status_message = format!("Export failed: {e}");
            }
        }
    }

    fn delete_confirmed(&mut self, id: u64) {
        self.store.remove_task(id);
        if let Err(e) = self.store.save_tasks() {
            self.status_message = format!("Error saving: {e}");
        } else {
            self.status_message = format!("Deleted task {id}");
        }
        self.refresh();
    }

    /// Handle keyboard input. Returns true when the app should exit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                // Delete confirmation takes priority over everything else.
                if let Some(id) = self.confirm_delete {
                    match key.code {
                        KeyCode::Char('y') | KeyCode::Char('Y') => {
                            self.confirm_delete = None;
                            self.delete_confirmed(id);
                        }
                        _ => {
                            self.confirm_delete = None;
                            self.status_message = "Delete cancelled".to_string();
                        }
                    }
                    return Ok(false);
                }

                if self.show_detail {
                    if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                        self.show_detail = false;
                    }
                    return Ok(false);
                }

                self.status_message.clear();

                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(true)
                    }
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(true),

                    KeyCode::Tab | KeyCode::Right => {
                        self.tab = self.tab.next();
                    }
                    KeyCode::BackTab | KeyCode::Left => {
                        self.tab = self.tab.prev();
                    }

                    KeyCode::Up => {
                        if let Some(selected) = self.list_state.selected() {
                            if selected > 0 {
                                self.list_state.select(Some(selected - 1));
                            }
                        }
                    }
                    KeyCode::Down => {
                        if let Some(selected) = self.list_state.selected() {
                            if selected + 1 < self.task_view.len() {
                                self.list_state.select(Some(selected + 1));
                            }
                        }
                    }

                    KeyCode::Enter if self.tab == Tab::Tasks => {
                        if self.selected_task().is_some() {
                            self.show_detail = true;
                        }
                    }
                    KeyCode::Char('d') if self.tab == Tab::Tasks => {
                        if let Some(task) = self.selected_task() {
                            self.confirm_delete = Some(task.id);
                        }
                    }
                    KeyCode::Char('f') if self.tab == Tab::Tasks => {
                        self.cycle_filter();
                    }
                    KeyCode::Char('e') => {
                        self.export_view();
                    }
                    KeyCode::Char('r') => {
                        self.refresh();
                        self.status_message = "Reloaded".to_string();
                    }
                    KeyCode::Char('h') => {
                        self.status_message =
                            "Help: Tab: Switch view | Enter: Details | f: Filter | d: Delete | e: Export | r: Reload | q: Quit"
                                .to_string();
                    }

                    _ => {}
                }
            }
        }
        Ok(false)
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Body
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        match self.tab {
            Tab::Dashboard => self.render_dashboard(f, chunks[1]),
            Tab::Tasks => self.render_tasks(f, chunks[1]),
            Tab::Employees => self.render_employees(f, chunks[1]),
        }
        self.render_status_bar(f, chunks[2]);

        if self.show_detail {
            self.render_task_detail_popup(f);
        }
        if self.confirm_delete.is_some() {
            self.render_confirm_popup(f);
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled("TEAM TRACKER", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   "),
        ];
        for (i, title) in Tab::titles().iter().enumerate() {
            let style = if i == self.tab.index() {
                Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(*title, style));
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("  {}", self.user),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
        ));

        let header = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_dashboard(&self, f: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(area);

        let today = Local::now().date_naive();
        let s = summary(&self.store.tasks, today);

        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ])
            .split(rows[0]);

        self.render_card(f, cards[0], "Completion Rate", &format!("{}%", s.completion_rate));
        self.render_card(
            f,
            cards[1],
            "Avg. Completion Time",
            &format!("{} days", s.avg_completion_time),
        );
        self.render_card(f, cards[2], "Total Tasks", &s.total_tasks.to_string());
        self.render_card(f, cards[3], "Support Tickets", &s.total_tickets.to_string());

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[1]);

        self.render_leaderboard(f, panels[0]);
        self.render_aging(f, panels[1], today);
    }

    fn render_card(&self, f: &mut Frame, area: Rect, label: &str, value: &str) {
        let text = vec![
            Line::from(Span::styled(
                value.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                label.to_string(),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let card = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(card, area);
    }

    fn render_leaderboard(&self, f: &mut Frame, area: Rect) {
        let mut items: Vec<ListItem> = vec![ListItem::new(Line::from(Span::styled(
            format!(
                "{:<16} {:>9} {:>12} {:>6}",
                "Employee", "Completed", "In Progress", "Rate"
            ),
            Style::default().add_modifier(Modifier::BOLD),
        )))];
        for (name, stats) in leaderboard(&self.store.tasks) {
            items.push(ListItem::new(Line::from(format!(
                "{:<16} {:>9} {:>12} {:>5}%",
                truncate(&name, 16),
                stats.completed,
                stats.in_progress,
                stats.completion_rate()
            ))));
        }
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Leaderboard"));
        f.render_widget(list, area);
    }

    fn render_aging(&self, f: &mut Frame, area: Rect, today: chrono::NaiveDate) {
        let aging = task_aging(&self.store.tasks, today);
        let items: Vec<ListItem> = if aging.is_empty() {
            vec![ListItem::new("No open tasks")]
        } else {
            aging
                .iter()
                .map(|entry| {
                    ListItem::new(Line::from(vec![
                        Span::raw(format!("{}  ", entry.date)),
                        Span::styled(
                            format!("{} days", entry.age_days),
                            Style::default().fg(PROGRESS_AMBER),
                        ),
                    ]))
                })
                .collect()
        };
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Task Aging (oldest open)"),
        );
        f.render_widget(list, area);
    }

    fn status_color(status: Status) -> Color {
        match status {
            Status::Done => DONE_GREEN,
            Status::InProgress => PROGRESS_AMBER,
            Status::ToDo => TODO_GREY,
        }
    }

    fn render_tasks(&mut self, f: &mut Frame, area: Rect) {
        let title = match &self.filter_employee {
            Some(name) => format!("Tasks — {name}"),
            None => "Tasks — all employees".to_string(),
        };

        let items: Vec<ListItem> = self
            .task_view
            .iter()
            .filter_map(|&id| self.store.get_task(id))
            .map(|t| {
                let ticket = t.support_ticket.as_deref().unwrap_or("-");
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{:<5} {}  ", t.id, t.date)),
                    Span::raw(format!("{:<14} ", truncate(&t.assigned_to, 14))),
                    Span::styled(
                        format!("{:<12}", format_status(t.status)),
                        Style::default().fg(Self::status_color(t.status)),
                    ),
                    Span::raw(format!(
                        " {:>2} feature(s)  {:<12} {}",
                        t.features.len(),
                        truncate(ticket, 12),
                        truncate(&t.remarks, 30)
                    )),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(
                Style::default()
                    .bg(ACCENT_BLUE)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn render_employees(&self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .store
            .employees
            .iter()
            .map(|e| {
                let tasks = self.store.tasks_for(&e.name);
                let total = tasks.len();
                let in_progress =
                    tasks.iter().filter(|t| t.status == Status::InProgress).count();
                let completed = tasks.iter().filter(|t| t.status == Status::Done).count();
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<16}", truncate(&e.name, 16)),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("{:<28}", truncate(&e.email, 28)),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(format!("{:<12}  ", truncate(&e.role, 12))),
                    Span::raw(format!("total {total}  ")),
                    Span::styled(
                        format!("in progress {in_progress}  "),
                        Style::default().fg(PROGRESS_AMBER),
                    ),
                    Span::styled(
                        format!("completed {completed}"),
                        Style::default().fg(DONE_GREEN),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Employees"));
        f.render_widget(list, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            format!(
                "Tasks: {} | Tab: Switch view | Enter: Details | f: Filter | d: Delete | e: Export | h: Help",
                self.task_view.len()
            )
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(ACCENT_BLUE).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render_task_detail_popup(&self, f: &mut Frame) {
        let Some(task) = self.selected_task() else {
            return;
        };

        let popup_area = centered_rect(70, 70, f.area());
        f.render_widget(Clear, popup_area);

        let ticket = task.support_ticket.as_deref().unwrap_or("-");
        let mut lines = vec![
            Line::from(Span::styled(
                format!("Task #{} — {}", task.id, task.assigned_to),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("Date:     {}", task.date)),
            Line::from(vec![
                Span::raw("Status:   "),
                Span::styled(
                    format_status(task.status),
                    Style::default().fg(Self::status_color(task.status)),
                ),
            ]),
            Line::from(format!("Ticket:   {ticket}")),
            Line::from(format!(
                "Previous: {}",
                if task.previous.is_empty() { "-" } else { &task.previous }
            )),
            Line::from(format!(
                "Remarks:  {}",
                if task.remarks.is_empty() { "-" } else { &task.remarks }
            )),
            Line::from(""),
            Line::from("Features:"),
        ];
        if task.features.is_empty() {
            lines.push(Line::from("  -"));
        }
        for feature in &task.features {
            lines.push(Line::from(format!(
                "  {} — {} ({} - {})",
                feature.name,
                feature.description,
                feature.start.format("%Y-%m-%d %H:%M"),
                feature.end.format("%Y-%m-%d %H:%M")
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(format!(
            "Created by {} | Updated by {}",
            task.created_by.as_deref().unwrap_or("-"),
            task.updated_by.as_deref().unwrap_or("-")
        )));

        let popup = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Task Details (Press Enter to close)")
                    .title_alignment(Alignment::Center)
                    .border_style(Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD)),
            )
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(Color::Black));
        f.render_widget(popup, popup_area);
    }

    fn render_confirm_popup(&self, f: &mut Frame) {
        let Some(id) = self.confirm_delete else {
            return;
        };
        let detail = self
            .store
            .get_task(id)
            .map(|t| format!("{} — {}", t.date, t.assigned_to))
            .unwrap_or_default();

        let popup_area = centered_rect(50, 20, f.area());
        f.render_widget(Clear, popup_area);

        let lines = vec![
            Line::from(format!("Delete task {id}?")),
            Line::from(Span::styled(detail, Style::default().fg(Color::DarkGray))),
            Line::from(""),
            Line::from("This cannot be undone. y to confirm, any other key to cancel."),
        ];
        let popup = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Confirm Delete")
                    .title_alignment(Alignment::Center)
                    .border_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(Color::Black));
        f.render_widget(popup, popup_area);
    }

    /// Main event loop.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
