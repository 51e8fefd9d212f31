//! Spreadsheet export of the current task view.
//!
//! Produces a single-sheet CSV file with one row per task; features are
//! flattened into a single cell. There is no import path.

use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};

use crate::store::format_status;
use crate::task::Task;

/// Write the given task view to a CSV file. Returns the number of rows.
pub fn write_csv(tasks: &[&Task], path: &Path) -> std::io::Result<usize> {
    let mut content = String::new();
    content.push_str(
        "ID,Date,AssignedTo,Previous,Features,Status,Remarks,SupportTicket,CreatedBy,CreatedUTC,UpdatedBy,UpdatedUTC\n",
    );

    for task in tasks {
        let features = flatten_features(task);
        let ticket = task.support_ticket.as_deref().unwrap_or("-");
        let created_by = task.created_by.as_deref().unwrap_or("-");
        let updated_by = task.updated_by.as_deref().unwrap_or("-");
        let created = format_utc(task.created_at_utc);
        let updated = format_utc(task.updated_at_utc);

        let row = [
            task.id.to_string(),
            task.date.to_string(),
            task.assigned_to.clone(),
            task.previous.clone(),
            features,
            format_status(task.status).to_string(),
            task.remarks.clone(),
            ticket.to_string(),
            created_by.to_string(),
            created,
            updated_by.to_string(),
            updated,
        ];
        let escaped: Vec<String> = row.iter().map(|f| escape_csv(f)).collect();
        content.push_str(&escaped.join(","));
        content.push('\n');
    }

    fs::write(path, content)?;
    Ok(tasks.len())
}

/// Join a task's features into one cell: `name: description (start - end)`.
fn flatten_features(task: &Task) -> String {
    if task.features.is_empty() {
        return "-".to_string();
    }
    task.features
        .iter()
        .map(|f| {
            format!(
                "{}: {} ({} - {})",
                f.name,
                f.description,
                f.start.format("%Y-%m-%d %H:%M"),
                f.end.format("%Y-%m-%d %H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_utc(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "-".to_string())
}

/// Quote CSV fields that contain commas, quotes, or newlines.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Status;
    use crate::task::Feature;
    use chrono::{NaiveDate, NaiveDateTime};

    fn t(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
    }

    fn sample_task() -> Task {
        Task {
            id: 3,
            date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            assigned_to: "Parth".to_string(),
            previous: "Carried over login fixes".to_string(),
            features: vec![Feature {
                name: "Login page".to_string(),
                description: "Wire form, add validation".to_string(),
                start: t("2025-04-02T09:00"),
                end: t("2025-04-02T11:30"),
            }],
            status: Status::InProgress,
            remarks: "Blocked on \"review\"".to_string(),
            support_ticket: Some("TCK-12".to_string()),
            created_by: Some("lead@company.com".to_string()),
            created_at_utc: 1_743_580_800,
            updated_by: None,
            updated_at_utc: 1_743_580_800,
        }
    }

    #[test]
    fn writes_header_and_escaped_rows() {
        let path = std::env::temp_dir().join(format!(
            "teamtrack-export-{}.csv",
            std::process::id()
        ));
        let task = sample_task();
        let rows = write_csv(&[&task], &path).unwrap();
        assert_eq!(rows, 1);

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("ID,Date,AssignedTo"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("3,2025-04-02,Parth"));
        // Comma-bearing feature cell and quoted remarks survive escaping.
        assert!(row.contains("\"Login page: Wire form, add validation"));
        assert!(row.contains("\"Blocked on \"\"review\"\"\""));
        assert!(row.contains("TCK-12"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn empty_view_writes_header_only() {
        let path = std::env::temp_dir().join(format!(
            "teamtrack-export-empty-{}.csv",
            std::process::id()
        ));
        let rows = write_csv(&[], &path).unwrap();
        assert_eq!(rows, 0);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        let _ = std::fs::remove_file(&path);
    }
}
