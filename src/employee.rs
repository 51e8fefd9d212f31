//! Employee records and the starter roster.

use serde::{Deserialize, Serialize};

/// A tracked employee. Create-only; no update or delete is exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Names seeded into an empty employees collection on first read.
pub const STARTER_ROSTER: [&str; 9] = [
    "Parth", "Nakshatra", "Prem", "Keshav", "Pranshu", "Rishi", "Mohit", "Harshit", "Shubham",
];

/// Build the seed records for the starter roster, role "Developer" and
/// email derived from the lowercased name.
pub fn starter_employees(first_id: u64) -> Vec<Employee> {
    STARTER_ROSTER
        .iter()
        .enumerate()
        .map(|(i, name)| Employee {
            id: first_id + i as u64,
            name: name.to_string(),
            email: format!("{}@company.com", name.to_lowercase()),
            role: "Developer".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_roster_derives_emails() {
        let seeded = starter_employees(1);
        assert_eq!(seeded.len(), 9);
        assert_eq!(seeded[0].name, "Parth");
        assert_eq!(seeded[0].email, "parth@company.com");
        assert_eq!(seeded[0].id, 1);
        assert_eq!(seeded[8].id, 9);
        assert!(seeded.iter().all(|e| e.role == "Developer"));
    }
}
