//! Derived productivity metrics.
//!
//! Everything here is a pure function over a task slice with an explicit
//! `today` reference, recomputed on each load and never persisted.
//! "Average completion time" measures the age of Done tasks since their
//! recorded date, not the time from creation to completion; that literal
//! behavior is kept on purpose.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::fields::Status;
use crate::task::Task;

/// Number of entries the aging ranking keeps.
const AGING_LIMIT: usize = 7;

/// Headline numbers shown on the dashboard summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Percentage of tasks marked Done, rounded. 0 for an empty list.
    pub completion_rate: u32,
    /// Rounded mean age in days of Done tasks, measured from `today`.
    pub avg_completion_time: i64,
    pub total_tasks: usize,
    /// Tasks carrying a support ticket reference.
    pub total_tickets: usize,
}

/// Per-employee task counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmployeeStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
}

impl EmployeeStats {
    /// Completed share as a rounded percentage. 0 when the employee has no tasks.
    pub fn completion_rate(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            (100.0 * self.completed as f64 / self.total as f64).round() as u32
        }
    }
}

/// One row of the staleness ranking for open work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgingEntry {
    pub date: NaiveDate,
    pub age_days: i64,
}

/// Compute the headline summary over a task list.
pub fn summary(tasks: &[Task], today: NaiveDate) -> Summary {
    let done: Vec<&Task> = tasks.iter().filter(|t| t.status == Status::Done).collect();

    let completion_rate = if tasks.is_empty() {
        0
    } else {
        (100.0 * done.len() as f64 / tasks.len() as f64).round() as u32
    };

    let avg_completion_time = if done.is_empty() {
        0
    } else {
        let total_days: i64 = done.iter().map(|t| (today - t.date).num_days()).sum();
        (total_days as f64 / done.len() as f64).round() as i64
    };

    Summary {
        completion_rate,
        avg_completion_time,
        total_tasks: tasks.len(),
        total_tickets: tasks.iter().filter(|t| t.support_ticket.is_some()).count(),
    }
}

/// Group tasks by assignee name into per-employee counts.
pub fn employee_stats(tasks: &[Task]) -> BTreeMap<String, EmployeeStats> {
    let mut stats: BTreeMap<String, EmployeeStats> = BTreeMap::new();
    for task in tasks {
        let entry = stats.entry(task.assigned_to.clone()).or_default();
        entry.total += 1;
        match task.status {
            Status::Done => entry.completed += 1,
            Status::InProgress => entry.in_progress += 1,
            Status::ToDo => {}
        }
    }
    stats
}

/// Per-employee entries ranked by completed-task count, highest first.
pub fn leaderboard(tasks: &[Task]) -> Vec<(String, EmployeeStats)> {
    let mut entries: Vec<(String, EmployeeStats)> = employee_stats(tasks).into_iter().collect();
    entries.sort_by(|a, b| b.1.completed.cmp(&a.1.completed));
    entries
}

/// Rank open (not Done) tasks by age in days, oldest first, capped at seven.
pub fn task_aging(tasks: &[Task], today: NaiveDate) -> Vec<AgingEntry> {
    let mut aging: Vec<AgingEntry> = tasks
        .iter()
        .filter(|t| t.status != Status::Done)
        .map(|t| AgingEntry {
            date: t.date,
            age_days: (today - t.date).num_days(),
        })
        .collect();
    aging.sort_by(|a, b| b.age_days.cmp(&a.age_days));
    aging.truncate(AGING_LIMIT);
    aging
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn task(assigned_to: &str, days_ago: i64, status: Status, ticket: Option<&str>) -> Task {
        Task {
            id: 0,
            date: today() - Duration::days(days_ago),
            assigned_to: assigned_to.to_string(),
            previous: String::new(),
            features: Vec::new(),
            status,
            remarks: String::new(),
            support_ticket: ticket.map(str::to_string),
            created_by: None,
            created_at_utc: 0,
            updated_by: None,
            updated_at_utc: 0,
        }
    }

    #[test]
    fn empty_list_yields_zeroes() {
        let s = summary(&[], today());
        assert_eq!(s.completion_rate, 0);
        assert_eq!(s.avg_completion_time, 0);
        assert_eq!(s.total_tasks, 0);
        assert_eq!(s.total_tickets, 0);
        assert!(task_aging(&[], today()).is_empty());
        assert!(leaderboard(&[]).is_empty());
    }

    #[test]
    fn two_done_one_open_scenario() {
        let tasks = vec![
            task("Parth", 10, Status::Done, None),
            task("Prem", 20, Status::Done, None),
            task("Rishi", 5, Status::ToDo, None),
        ];
        let s = summary(&tasks, today());
        assert_eq!(s.completion_rate, 67);
        assert_eq!(s.avg_completion_time, 15);
        assert_eq!(s.total_tasks, 3);
    }

    #[test]
    fn completion_rate_stays_in_range() {
        let all_done: Vec<Task> = (0..4).map(|_| task("Parth", 1, Status::Done, None)).collect();
        assert_eq!(summary(&all_done, today()).completion_rate, 100);
        let none_done: Vec<Task> = (0..4).map(|_| task("Parth", 1, Status::ToDo, None)).collect();
        assert_eq!(summary(&none_done, today()).completion_rate, 0);
    }

    #[test]
    fn tickets_count_present_references_only() {
        let tasks = vec![
            task("Parth", 1, Status::ToDo, Some("TCK-12")),
            task("Prem", 2, Status::Done, None),
            task("Rishi", 3, Status::InProgress, Some("TCK-40")),
        ];
        assert_eq!(summary(&tasks, today()).total_tickets, 2);
    }

    #[test]
    fn employee_stats_group_by_name() {
        let tasks = vec![
            task("Parth", 1, Status::Done, None),
            task("Parth", 2, Status::InProgress, None),
            task("Parth", 3, Status::ToDo, None),
            task("Prem", 4, Status::Done, None),
        ];
        let stats = employee_stats(&tasks);
        let parth = stats["Parth"];
        assert_eq!(parth.total, 3);
        assert_eq!(parth.completed, 1);
        assert_eq!(parth.in_progress, 1);
        assert!(parth.completed + parth.in_progress <= parth.total);
        assert_eq!(stats["Prem"].completed, 1);
        assert_eq!(parth.completion_rate(), 33);
    }

    #[test]
    fn leaderboard_ranks_by_completed() {
        let tasks = vec![
            task("Prem", 1, Status::Done, None),
            task("Parth", 1, Status::Done, None),
            task("Parth", 2, Status::Done, None),
            task("Rishi", 1, Status::ToDo, None),
        ];
        let board = leaderboard(&tasks);
        assert_eq!(board[0].0, "Parth");
        assert_eq!(board[0].1.completed, 2);
        assert_eq!(board[1].0, "Prem");
    }

    #[test]
    fn aging_excludes_done_and_caps_at_seven() {
        let mut tasks: Vec<Task> = (1..=10)
            .map(|days| task("Parth", days, Status::ToDo, None))
            .collect();
        tasks.push(task("Parth", 99, Status::Done, None));

        let aging = task_aging(&tasks, today());
        assert_eq!(aging.len(), 7);
        // Oldest open task first, Done task at 99 days never appears.
        assert_eq!(aging[0].age_days, 10);
        assert!(aging.windows(2).all(|w| w[0].age_days >= w[1].age_days));
    }
}
