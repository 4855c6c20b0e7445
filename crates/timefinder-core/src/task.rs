//! Task model: priority, concentration demand, and stable priority ordering.

use serde::{Deserialize, Serialize};

/// Task priority. Ordinals drive the scheduling sort: high=3, medium=2, low=1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Ordinal used for descending priority sort.
    pub fn ordinal(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    /// Parse from a stored string. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// How much focus a task demands. Routes the task through the assigner:
/// `High` may only start in concentration-time slots, `Low` only outside
/// them, `Medium` prefers concentration time but falls back to any slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Concentration {
    High,
    Medium,
    Low,
}

impl Concentration {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "high" => Some(Concentration::High),
            "medium" => Some(Concentration::Medium),
            "low" => Some(Concentration::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Concentration::High => "high",
            Concentration::Medium => "medium",
            Concentration::Low => "low",
        }
    }
}

/// A pending task to be placed into the day.
///
/// Field names follow the original service's store format (camelCase flags).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub priority: Priority,
    /// Estimated duration in minutes. Must be positive; the storage layer
    /// filters out rows that violate this.
    #[serde(rename = "time")]
    pub duration_minutes: i64,
    pub concentration: Concentration,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_scheduled: bool,
}

/// Sort tasks by descending priority ordinal. The sort is stable, so tasks
/// with equal priority keep their input order.
pub fn sort_by_priority(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.priority.ordinal().cmp(&a.priority.ordinal()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, priority: Priority) -> Task {
        Task {
            id: id.to_string(),
            name: format!("Task {id}"),
            priority,
            duration_minutes: 30,
            concentration: Concentration::Medium,
            is_completed: false,
            is_scheduled: false,
        }
    }

    #[test]
    fn priority_ordinals() {
        assert_eq!(Priority::High.ordinal(), 3);
        assert_eq!(Priority::Medium.ordinal(), 2);
        assert_eq!(Priority::Low.ordinal(), 1);
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert_eq!(Priority::parse("high"), Some(Priority::High));
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(Concentration::parse("low"), Some(Concentration::Low));
        assert_eq!(Concentration::parse(""), None);
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let mut tasks = vec![
            task("a", Priority::Low),
            task("b", Priority::High),
            task("c", Priority::Medium),
            task("d", Priority::High),
        ];
        sort_by_priority(&mut tasks);

        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        // b before d: equal priorities keep input order.
        assert_eq!(ids, vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn task_serializes_with_store_field_names() {
        let t = task("t1", Priority::High);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["priority"], "high");
        assert_eq!(json["time"], 30);
        assert_eq!(json["isCompleted"], false);
        assert_eq!(json["isScheduled"], false);
    }
}
