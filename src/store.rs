//! Document store and utility functions for the two collections.
//!
//! Tasks and employees live in separate JSON files under the data directory,
//! mirroring two document collections. Every mutation rewrites the owning
//! collection file wholesale (atomic temp + rename), so concurrent writers
//! race under last-write-wins; re-reading after a write is the only
//! consistency mechanism.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::employee::{starter_employees, Employee};
use crate::fields::Status;
use crate::task::{Feature, Task};

/// In-memory view of the two collections.
#[derive(Debug, Default)]
pub struct Store {
    pub tasks: Vec<Task>,
    pub employees: Vec<Employee>,
    dir: PathBuf,
}

impl Store {
    /// Load both collections from the data directory, starting empty for any
    /// file that is missing or unreadable.
    pub fn load(dir: &Path) -> Self {
        Store {
            tasks: load_collection(&dir.join("tasks.json")),
            employees: load_collection(&dir.join("employees.json")),
            dir: dir.to_path_buf(),
        }
    }

    pub fn save_tasks(&self) -> std::io::Result<()> {
        save_collection(&self.dir.join("tasks.json"), &self.tasks)
    }

    pub fn save_employees(&self) -> std::io::Result<()> {
        save_collection(&self.dir.join("employees.json"), &self.employees)
    }

    /// Next available task identifier.
    pub fn next_task_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Next available employee identifier.
    pub fn next_employee_id(&self) -> u64 {
        self.employees.iter().map(|e| e.id).max().unwrap_or(0) + 1
    }

    /// Get a task by ID.
    pub fn get_task(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by ID.
    pub fn get_task_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Remove a task by ID. Returns whether a record was removed.
    pub fn remove_task(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// All tasks sorted by date descending, newest first. Ties keep their
    /// relative order.
    pub fn tasks_by_date_desc(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().collect();
        tasks.sort_by(|a, b| b.date.cmp(&a.date));
        tasks
    }

    /// Tasks assigned to one employee, matched by name. Issued once per
    /// employee on the listing path.
    pub fn tasks_for(&self, name: &str) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.assigned_to == name).collect()
    }

    /// Seed the starter roster into an empty employees collection and persist
    /// it. Returns whether seeding happened; a populated collection is left
    /// untouched, so the seed never duplicates.
    pub fn seed_employees_if_empty(&mut self) -> std::io::Result<bool> {
        if !self.employees.is_empty() {
            return Ok(false);
        }
        self.employees = starter_employees(self.next_employee_id());
        self.save_employees()?;
        Ok(true)
    }
}

fn load_collection<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    if !path.exists() {
        return Vec::new();
    }
    let mut buf = String::new();
    match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
        Ok(_) => match serde_json::from_str(&buf) {
            Ok(records) => records,
            Err(e) => {
                eprintln!("Error parsing {}, starting empty: {e}", path.display());
                Vec::new()
            }
        },
        Err(e) => {
            eprintln!("Error reading {}, starting empty: {e}", path.display());
            Vec::new()
        }
    }
}

fn save_collection<T: Serialize>(path: &Path, records: &[T]) -> std::io::Result<()> {
    // Atomic-ish write via temp + rename.
    let tmp = path.with_extension("json.tmp");
    let mut f = File::create(&tmp)?;
    let data = serde_json::to_string_pretty(records)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    f.write_all(data.as_bytes())?;
    f.flush()?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Client-side task filter by employee and/or date. A `None` field matches
/// everything; relative order of the input is preserved.
pub fn filter_tasks<'a>(
    tasks: &[&'a Task],
    employee: Option<&str>,
    date: Option<NaiveDate>,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| {
            employee.map_or(true, |e| t.assigned_to == e)
                && date.map_or(true, |d| t.date == d)
        })
        .copied()
        .collect()
}

/// Parse a task date: YYYY-MM-DD, "today", "tomorrow", or "yesterday".
pub fn parse_date_input(s: &str) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    let today = Local::now().date_naive();
    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Parse a feature timestamp: `YYYY-MM-DDTHH:MM` (optionally with seconds,
/// or a space separator).
pub fn parse_time_input(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
        .ok()
}

/// Parse a `name|description|start|end` feature spec from the CLI.
pub fn parse_feature_spec(spec: &str) -> Result<Feature, String> {
    let parts: Vec<&str> = spec.splitn(4, '|').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Feature must be 'name|description|start|end', got '{spec}'"
        ));
    }
    let name = parts[0].trim();
    if name.is_empty() {
        return Err("Feature name cannot be empty".to_string());
    }
    let start = parse_time_input(parts[2])
        .ok_or_else(|| format!("Unrecognised start time '{}'. Use YYYY-MM-DDTHH:MM.", parts[2]))?;
    let end = parse_time_input(parts[3])
        .ok_or_else(|| format!("Unrecognised end time '{}'. Use YYYY-MM-DDTHH:MM.", parts[3]))?;
    Ok(Feature {
        name: name.to_string(),
        description: parts[1].trim().to_string(),
        start,
        end,
    })
}

/// Format a task status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::ToDo => "To Do",
        Status::InProgress => "In Progress",
        Status::Done => "Done",
    }
}

/// Print tasks in a formatted table.
pub fn print_task_table(tasks: &[&Task]) {
    println!(
        "{:<5} {:<11} {:<14} {:<12} {:<9} {:<14} {}",
        "ID", "Date", "Assigned To", "Status", "Features", "Ticket", "Remarks"
    );
    for t in tasks {
        let ticket = t.support_ticket.as_deref().unwrap_or("-");
        println!(
            "{:<5} {:<11} {:<14} {:<12} {:<9} {:<14} {}",
            t.id,
            t.date,
            truncate(&t.assigned_to, 14),
            format_status(t.status),
            t.features.len(),
            truncate(ticket, 14),
            truncate(&t.remarks, 40),
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: u64, assigned_to: &str, date: NaiveDate, status: Status) -> Task {
        Task {
            id,
            date,
            assigned_to: assigned_to.to_string(),
            previous: String::new(),
            features: Vec::new(),
            status,
            remarks: String::new(),
            support_ticket: None,
            created_by: None,
            created_at_utc: 0,
            updated_by: None,
            updated_at_utc: 0,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn temp_store() -> Store {
        let dir = std::env::temp_dir().join(format!(
            "teamtrack-store-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let _ = std::fs::remove_file(dir.join("tasks.json"));
        let _ = std::fs::remove_file(dir.join("employees.json"));
        Store::load(&dir)
    }

    #[test]
    fn filter_by_employee_preserves_order() {
        let tasks = vec![
            task(1, "Parth", d(2025, 1, 5), Status::ToDo),
            task(2, "Prem", d(2025, 1, 4), Status::ToDo),
            task(3, "Parth", d(2025, 1, 3), Status::Done),
            task(4, "Rishi", d(2025, 1, 2), Status::ToDo),
            task(5, "Mohit", d(2025, 1, 1), Status::ToDo),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let filtered = filter_tasks(&refs, Some("Parth"), None);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].id, 1);
        assert_eq!(filtered[1].id, 3);
    }

    #[test]
    fn filter_by_date_and_employee() {
        let tasks = vec![
            task(1, "Parth", d(2025, 1, 5), Status::ToDo),
            task(2, "Parth", d(2025, 1, 4), Status::ToDo),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let filtered = filter_tasks(&refs, Some("Parth"), Some(d(2025, 1, 4)));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 2);
        assert!(filter_tasks(&refs, None, None).len() == 2);
    }

    #[test]
    fn seeding_is_idempotent() {
        let mut store = temp_store();
        assert!(store.seed_employees_if_empty().unwrap());
        assert_eq!(store.employees.len(), 9);
        // Second read-all against the persisted collection sees nine, once.
        let mut reloaded = Store::load(store.dir.as_path());
        assert!(!reloaded.seed_employees_if_empty().unwrap());
        assert_eq!(reloaded.employees.len(), 9);
    }

    #[test]
    fn delete_removes_from_next_read_all() {
        let mut store = temp_store();
        store.tasks.push(task(1, "Parth", d(2025, 1, 5), Status::Done));
        store.tasks.push(task(2, "Prem", d(2025, 1, 6), Status::ToDo));
        store.save_tasks().unwrap();

        assert!(store.remove_task(1));
        store.save_tasks().unwrap();

        let reloaded = Store::load(store.dir.as_path());
        assert_eq!(reloaded.tasks.len(), 1);
        assert_eq!(reloaded.tasks[0].id, 2);
        // The other employee's tasks are untouched.
        assert_eq!(reloaded.tasks_for("Prem").len(), 1);
        assert!(reloaded.tasks_for("Parth").is_empty());
    }

    #[test]
    fn tasks_sorted_date_descending() {
        let mut store = temp_store();
        store.tasks.push(task(1, "Parth", d(2025, 1, 3), Status::ToDo));
        store.tasks.push(task(2, "Prem", d(2025, 1, 9), Status::ToDo));
        store.tasks.push(task(3, "Rishi", d(2025, 1, 6), Status::ToDo));
        let sorted = store.tasks_by_date_desc();
        let ids: Vec<u64> = sorted.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn feature_spec_parses_and_rejects() {
        let f = parse_feature_spec("Login page|Wire the form|2025-01-05T09:00|2025-01-05T11:30")
            .unwrap();
        assert_eq!(f.name, "Login page");
        assert_eq!(f.description, "Wire the form");
        assert!(f.end > f.start);

        assert!(parse_feature_spec("missing|fields").is_err());
        assert!(parse_feature_spec("x|y|not-a-time|2025-01-05T11:30").is_err());
        // End before start is accepted as entered.
        assert!(
            parse_feature_spec("x|y|2025-01-05T11:30|2025-01-05T09:00").is_ok()
        );
    }
}
