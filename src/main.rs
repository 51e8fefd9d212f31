//! # TT - Team Task Tracker
//!
//! A task-tracking and employee-productivity dashboard for the terminal,
//! with a full CLI for automation and an interactive TUI dashboard.
//!
//! ## Key Features
//!
//! - **Daily Task Records**: Per-employee tasks with sub-feature breakdowns,
//! status transitions, remarks, and support-ticket references
//! - **Productivity Metrics**: Completion rate, task aging, and a per-employee
//! leaderboard, recomputed from the task list on every load
//! - **Employee Registry**: Create-only roster, seeded with a starter team on
//! first use
//! - **Sessions**: Local email+password accounts gate every data command
//! - **Local File Storage**: Task and employee collections as JSON files, with
//! CSV export for reporting
//!
//! ## Quick Start
//!
//! ```bash
//! # Create an account
//! tt signup lead@company.com
//!
//! # Log a task
//! tt add --assigned-to Parth --feature "Login page|Wire the form|2025-04-02T09:00|2025-04-02T11:30"
//!
//! # See the team dashboard
//! tt dashboard
//!
//! # Or interactively
//! tt ui
//! ```
//!
//! Data is stored locally in `~/.teamtrack/`. Two processes writing at once
//! race under last-write-wins; the second save replaces the collection file.

use std::path::PathBuf;

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod employee;
pub mod export;
pub mod fields;
pub mod metrics;
pub mod session;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use session::require_user;
use store::Store;

fn main() {
    let cli = Cli::parse();

    // Determine the data directory.
    let dir = cli.dir.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".teamtrack")
    });
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Failed to create data directory {}: {}", dir.display(), e);
        std::process::exit(1);
    }

    // Session commands and completions run without a store or a session.
    match cli.command {
        Commands::Signup { email, password } => return cmd_signup(&dir, email, password),
        Commands::Login { email, password } => return cmd_login(&dir, email, password),
        Commands::Logout => return cmd_logout(&dir),
        Commands::Whoami => return cmd_whoami(&dir),
        Commands::Completions { shell } => return cmd_completions(shell),
        _ => {}
    }
    debug_assert!(!is_public(&cli.command));

    // Everything else is a protected view.
    let user = require_user(&dir);
    let mut store = Store::load(&dir);

    match cli.command {
        Commands::Signup { .. }
        | Commands::Login { .. }
        | Commands::Logout
        | Commands::Whoami
        | Commands::Completions { .. } => unreachable!("public commands handled above"),

        Commands::Ui => cmd_ui(&dir, &user),

        Commands::Add {
            assigned_to,
            date,
            previous,
            features,
            status,
            remarks,
            ticket,
        } => cmd_add(
            &mut store,
            &user,
            assigned_to,
            date,
            previous,
            features,
            status,
            remarks,
            ticket,
        ),

        Commands::List { employee, date } => cmd_list(&store, employee, date),

        Commands::View { id } => cmd_view(&store, id),

        Commands::Update {
            id,
            assigned_to,
            date,
            previous,
            features,
            clear_features,
            status,
            remarks,
            ticket,
            clear_ticket,
        } => cmd_update(
            &mut store,
            &user,
            id,
            assigned_to,
            date,
            previous,
            features,
            clear_features,
            status,
            remarks,
            ticket,
            clear_ticket,
        ),

        Commands::Delete { id, yes } => cmd_delete(&mut store, id, yes),

        Commands::Export {
            output,
            employee,
            date,
        } => cmd_export(&store, output, employee, date),

        Commands::Employee { action } => match action {
            EmployeeAction::Add { name, email, role } => {
                cmd_employee_add(&mut store, name, email, role)
            }
            EmployeeAction::List => cmd_employee_list(&mut store),
        },

        Commands::Dashboard => cmd_dashboard(&store),
    }
}
