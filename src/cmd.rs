//! Command implementations for the CLI interface.
//!
//! This module contains all the command handlers, from session management
//! and task/employee CRUD to the dashboard report and the TUI entry point.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use std::io::Write;
use std::path::Path;

use chrono::{Local, TimeZone, Utc};

use crate::employee::Employee;
use crate::export::write_csv;
use crate::fields::Status;
use crate::metrics::{leaderboard, summary, task_aging};
use crate::session::SessionGate;
use crate::store::*;
use crate::task::Task;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive dashboard UI.
    Ui,

    /// Create an account and sign in.
    Signup {
        /// Account email.
        email: String,
        /// Password. Prompted for when omitted.
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in with an existing account.
    Login {
        /// Account email.
        email: String,
        /// Password. Prompted for when omitted.
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and clear the local session.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// Add a new task.
    Add {
        /// Assignee name.
        #[arg(long)]
        assigned_to: String,
        /// Task date: YYYY-MM-DD, "today", "tomorrow", or "yesterday". Defaults to today.
        #[arg(long)]
        date: Option<String>,
        /// Prior-context note carried over from earlier work.
        #[arg(long)]
        previous: Option<String>,
        /// Feature sub-record as 'name|description|start|end'. May be repeated.
        #[arg(long = "feature")]
        features: Vec<String>,
        /// Status: to-do | in-progress | done.
        #[arg(long, value_enum, default_value_t = Status::ToDo)]
        status: Status,
        /// Remarks or blockers.
        #[arg(long)]
        remarks: Option<String>,
        /// Support ticket reference.
        #[arg(long)]
        ticket: Option<String>,
    },

    /// List tasks, newest first, with optional filters.
    List {
        /// Filter by assignee name.
        #[arg(long)]
        employee: Option<String>,
        /// Filter by task date.
        #[arg(long)]
        date: Option<String>,
    },

    /// View a single task with its features.
    View {
        /// Task ID.
        id: u64,
    },

    /// Update fields on a task. The stored record is replaced wholesale.
    Update {
        /// Task ID.
        id: u64,
        #[arg(long)]
        assigned_to: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        previous: Option<String>,
        /// Add a feature sub-record. May be repeated.
        #[arg(long = "feature")]
        features: Vec<String>,
        /// Drop all existing features before adding any new ones.
        #[arg(long)]
        clear_features: bool,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long)]
        remarks: Option<String>,
        #[arg(long)]
        ticket: Option<String>,
        /// Clear the support ticket reference.
        #[arg(long)]
        clear_ticket: bool,
    },

    /// Delete a task. Asks for confirmation unless --yes is passed.
    Delete {
        /// Task ID.
        id: u64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Export the current task view to a CSV spreadsheet.
    Export {
        /// Output file path (default: tasks.csv).
        #[arg(long, short)]
        output: Option<String>,
        /// Filter by assignee name.
        #[arg(long)]
        employee: Option<String>,
        /// Filter by task date.
        #[arg(long)]
        date: Option<String>,
    },

    /// Manage employees.
    Employee {
        #[command(subcommand)]
        action: EmployeeAction,
    },

    /// Print the productivity dashboard report.
    Dashboard,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum EmployeeAction {
    /// Add a new employee.
    Add {
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        role: String,
    },
    /// List employees with their task stats, seeding the starter roster
    /// if the collection is empty.
    List,
}

/// Whether a command may run without a session.
pub fn is_public(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Signup { .. }
            | Commands::Login { .. }
            | Commands::Logout
            | Commands::Whoami
            | Commands::Completions { .. }
    )
}

/// Launch the terminal user interface.
pub fn cmd_ui(dir: &Path, user: &str) {
    if let Err(e) = run_tui(dir, user) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Create an account and sign in.
pub fn cmd_signup(dir: &Path, email: String, password: Option<String>) {
    let gate = SessionGate::new(dir);
    if let Some(current) = gate.current_user() {
        println!("Already signed in as {current}. Run 'tt logout' first.");
        return;
    }
    let password = password.unwrap_or_else(|| prompt_line("Password: "));
    if let Err(e) = gate.sign_up(&email, &password) {
        eprintln!("{e}");
        std::process::exit(1);
    }
    println!("Signed up and signed in as {email}");
}

/// Sign in with an existing account.
pub fn cmd_login(dir: &Path, email: String, password: Option<String>) {
    let gate = SessionGate::new(dir);
    if let Some(current) = gate.current_user() {
        println!("Already signed in as {current}. Run 'tt logout' first.");
        return;
    }
    let password = password.unwrap_or_else(|| prompt_line("Password: "));
    if let Err(e) = gate.sign_in(&email, &password) {
        eprintln!("{e}");
        std::process::exit(1);
    }
    println!("Signed in as {email}");
}

/// Sign out and clear the local session.
pub fn cmd_logout(dir: &Path) {
    if let Err(e) = SessionGate::new(dir).sign_out() {
        eprintln!("Failed to clear session: {e}");
        std::process::exit(1);
    }
    println!("Signed out.");
}

/// Show the signed-in user.
pub fn cmd_whoami(dir: &Path) {
    match SessionGate::new(dir).current_user() {
        Some(email) => println!("{email}"),
        None => println!("Not signed in."),
    }
}

/// Add a new task to the store.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    store: &mut Store,
    user: &str,
    assigned_to: String,
    date: Option<String>,
    previous: Option<String>,
    features: Vec<String>,
    status: Status,
    remarks: Option<String>,
    ticket: Option<String>,
) {
    let assigned_to = assigned_to.trim().to_string();
    if assigned_to.is_empty() {
        eprintln!("Assignee name cannot be empty.");
        std::process::exit(1);
    }

    let date = match date {
        Some(ref s) => match parse_date_input(s) {
            Some(d) => d,
            None => {
                eprintln!("Unrecognised date. Use YYYY-MM-DD, 'today', 'tomorrow', or 'yesterday'.");
                std::process::exit(1);
            }
        },
        None => Local::now().date_naive(),
    };

    let mut parsed_features = Vec::new();
    for spec in &features {
        match parse_feature_spec(spec) {
            Ok(f) => parsed_features.push(f),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }

    let now_utc = Utc::now().timestamp();
    let id = store.next_task_id();
    let task = Task {
        id,
        date,
        assigned_to,
        previous: previous.unwrap_or_default(),
        features: parsed_features,
        status,
        remarks: remarks.unwrap_or_default(),
        support_ticket: ticket.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
        created_by: Some(user.to_string()),
        created_at_utc: now_utc,
        updated_by: None,
        updated_at_utc: now_utc,
    };
    store.tasks.push(task);
    if let Err(e) = store.save_tasks() {
        eprintln!("Failed to save tasks: {e}");
        std::process::exit(1);
    }
    println!("Added task {id}");
}

/// List tasks newest first, with optional client-side filters.
pub fn cmd_list(store: &Store, employee: Option<String>, date: Option<String>) {
    let date = date.as_deref().map(|s| match parse_date_input(s) {
        Some(d) => d,
        None => {
            eprintln!("Unrecognised date. Use YYYY-MM-DD, 'today', 'tomorrow', or 'yesterday'.");
            std::process::exit(1);
        }
    });
    let tasks = store.tasks_by_date_desc();
    let filtered = filter_tasks(&tasks, employee.as_deref(), date);
    print_task_table(&filtered);
}

/// View detailed information about a single task.
pub fn cmd_view(store: &Store, id: u64) {
    let Some(task) = store.get_task(id) else {
        eprintln!("Task {id} not found.");
        std::process::exit(1);
    };
    println!("ID:           {}", task.id);
    println!("Date:         {}", task.date);
    println!("Assigned To:  {}", task.assigned_to);
    println!("Status:       {}", format_status(task.status));
    println!("Previous:     {}", if task.previous.is_empty() { "-" } else { &task.previous });
    println!("Remarks:      {}", if task.remarks.is_empty() { "-" } else { &task.remarks });
    println!("Ticket:       {}", task.support_ticket.as_deref().unwrap_or("-"));
    println!("Created By:   {}", task.created_by.as_deref().unwrap_or("-"));
    println!("Created UTC:  {}", format_audit_time(task.created_at_utc));
    println!("Updated By:   {}", task.updated_by.as_deref().unwrap_or("-"));
    println!("Updated UTC:  {}", format_audit_time(task.updated_at_utc));
    println!("Features:");
    if task.features.is_empty() {
        println!("  -");
    }
    for (i, f) in task.features.iter().enumerate() {
        println!(
            "  {}. {} — {} ({} - {})",
            i + 1,
            f.name,
            f.description,
            f.start.format("%Y-%m-%d %H:%M"),
            f.end.format("%Y-%m-%d %H:%M")
        );
    }
}

fn format_audit_time(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "-".to_string())
}

/// Update an existing task. The edited record replaces the stored one
/// wholesale and is stamped with the updater; concurrent edits race under
/// last-write-wins.
#[allow(clippy::too_many_arguments)]
pub fn cmd_update(
    store: &mut Store,
    user: &str,
    id: u64,
    assigned_to: Option<String>,
    date: Option<String>,
    previous: Option<String>,
    features: Vec<String>,
    clear_features: bool,
    status: Option<Status>,
    remarks: Option<String>,
    ticket: Option<String>,
    clear_ticket: bool,
) {
    let date = date.as_deref().map(|s| match parse_date_input(s) {
        Some(d) => d,
        None => {
            eprintln!("Unrecognised date. Use YYYY-MM-DD, 'today', 'tomorrow', or 'yesterday'.");
            std::process::exit(1);
        }
    });
    let mut parsed_features = Vec::new();
    for spec in &features {
        match parse_feature_spec(spec) {
            Ok(f) => parsed_features.push(f),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }

    let Some(t) = store.get_task_mut(id) else {
        eprintln!("Task {id} not found.");
        std::process::exit(1);
    };
    if let Some(a) = assigned_to {
        let a = a.trim().to_string();
        if a.is_empty() {
            eprintln!("Assignee name cannot be empty.");
            std::process::exit(1);
        }
        t.assigned_to = a;
    }
    if let Some(d) = date {
        t.date = d;
    }
    if let Some(p) = previous {
        t.previous = p;
    }
    if clear_features {
        t.features.clear();
    }
    t.features.extend(parsed_features);
    if let Some(s) = status {
        t.status = s;
    }
    if let Some(r) = remarks {
        t.remarks = r;
    }
    if clear_ticket {
        t.support_ticket = None;
    }
    if let Some(tk) = ticket {
        let tk = tk.trim().to_string();
        t.support_ticket = if tk.is_empty() { None } else { Some(tk) };
    }
    t.updated_by = Some(user.to_string());
    t.updated_at_utc = Utc::now().timestamp();

    if let Err(e) = store.save_tasks() {
        eprintln!("Failed to save tasks: {e}");
        std::process::exit(1);
    }
    println!("Updated task {id}");
}

/// Delete a task after explicit confirmation. Irreversible; there is no undo.
pub fn cmd_delete(store: &mut Store, id: u64, yes: bool) {
    let Some(task) = store.get_task(id) else {
        eprintln!("Task {id} not found.");
        std::process::exit(1);
    };
    if !yes {
        let prompt = format!(
            "Delete task {} ({}, {})? [y/N] ",
            task.id, task.date, task.assigned_to
        );
        if !confirm(&prompt) {
            println!("Aborted.");
            return;
        }
    }
    store.remove_task(id);
    if let Err(e) = store.save_tasks() {
        eprintln!("Failed to save tasks: {e}");
        std::process::exit(1);
    }
    println!("Deleted task {id}");
}

/// Export the current (filtered) task view to a CSV file.
pub fn cmd_export(
    store: &Store,
    output: Option<String>,
    employee: Option<String>,
    date: Option<String>,
) {
    let date = date.as_deref().map(|s| match parse_date_input(s) {
        Some(d) => d,
        None => {
            eprintln!("Unrecognised date. Use YYYY-MM-DD, 'today', 'tomorrow', or 'yesterday'.");
            std::process::exit(1);
        }
    });
    let output_path = output.unwrap_or_else(|| "tasks.csv".to_string());
    let tasks = store.tasks_by_date_desc();
    let filtered = filter_tasks(&tasks, employee.as_deref(), date);
    match write_csv(&filtered, Path::new(&output_path)) {
        Ok(rows) => println!("Exported {rows} task(s) to {output_path}"),
        Err(e) => {
            eprintln!("Failed to write {output_path}: {e}");
            std::process::exit(1);
        }
    }
}

/// Add a new employee record.
pub fn cmd_employee_add(store: &mut Store, name: String, email: String, role: String) {
    let name = name.trim().to_string();
    let email = email.trim().to_string();
    let role = role.trim().to_string();
    if name.is_empty() || email.is_empty() || role.is_empty() {
        eprintln!("Name, email, and role are all required.");
        std::process::exit(1);
    }
    let id = store.next_employee_id();
    store.employees.push(Employee { id, name: name.clone(), email, role });
    if let Err(e) = store.save_employees() {
        eprintln!("Failed to save employees: {e}");
        std::process::exit(1);
    }
    println!("Added employee {id} ({name})");
}

/// List employees with per-employee task stats, seeding the starter roster
/// into an empty collection first.
pub fn cmd_employee_list(store: &mut Store) {
    match store.seed_employees_if_empty() {
        Ok(true) => println!("Seeded starter roster ({} employees).", store.employees.len()),
        Ok(false) => {}
        Err(e) => {
            eprintln!("Failed to seed employees: {e}");
            std::process::exit(1);
        }
    }

    println!(
        "{:<5} {:<16} {:<26} {:<12} {:>6} {:>12} {:>10}",
        "ID", "Name", "Email", "Role", "Total", "In Progress", "Completed"
    );
    for employee in &store.employees {
        // One filtered pass per employee, like the per-employee queries the
        // employees view issues on mount.
        let tasks = store.tasks_for(&employee.name);
        let total = tasks.len();
        let in_progress = tasks.iter().filter(|t| t.status == Status::InProgress).count();
        let completed = tasks.iter().filter(|t| t.status == Status::Done).count();
        println!(
            "{:<5} {:<16} {:<26} {:<12} {:>6} {:>12} {:>10}",
            employee.id,
            truncate(&employee.name, 16),
            truncate(&employee.email, 26),
            truncate(&employee.role, 12),
            total,
            in_progress,
            completed
        );
    }
}

/// Print the productivity dashboard report.
pub fn cmd_dashboard(store: &Store) {
    let today = Local::now().date_naive();
    let s = summary(&store.tasks, today);

    println!("Dashboard ({today})");
    println!();
    println!("Completion Rate:      {}%", s.completion_rate);
    println!("Avg. Completion Time: {} days", s.avg_completion_time);
    println!("Total Tasks:          {}", s.total_tasks);
    println!("Support Tickets:      {}", s.total_tickets);

    println!();
    println!("Leaderboard");
    println!(
        "{:<16} {:>10} {:>12} {:>16}",
        "Employee", "Completed", "In Progress", "Completion Rate"
    );
    for (name, stats) in leaderboard(&store.tasks) {
        println!(
            "{:<16} {:>10} {:>12} {:>15}%",
            truncate(&name, 16),
            stats.completed,
            stats.in_progress,
            stats.completion_rate()
        );
    }

    println!();
    println!("Task Aging (open tasks, oldest first)");
    let aging = task_aging(&store.tasks, today);
    if aging.is_empty() {
        println!("  -");
    }
    for entry in aging {
        println!("  {}  {} days", entry.date, entry.age_days);
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Prompt on stderr and read one trimmed line from stdin.
fn prompt_line(prompt: &str) -> String {
    eprint!("{prompt}");
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        eprintln!("Failed to read input.");
        std::process::exit(1);
    }
    line.trim().to_string()
}

/// Ask a yes/no question, defaulting to no.
fn confirm(prompt: &str) -> bool {
    let answer = prompt_line(prompt).to_lowercase();
    answer == "y" || answer == "yes"
}
