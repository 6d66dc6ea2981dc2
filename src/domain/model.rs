use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// One record in the document-store walkthrough.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub age: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<Reaction>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub emoji: String,
}

impl Person {
    pub fn new(name: &str, age: i32) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            age,
            reactions: None,
        }
    }

    pub fn with_reactions(mut self, reactions: Vec<Reaction>) -> Self {
        self.reactions = Some(reactions);
        self
    }
}

/// One row of the relational walkthrough's `users` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
}

/// 單一操作的執行結果
#[derive(Debug, Clone)]
pub struct StepReport {
    pub operation: String,
    pub detail: String,
    pub duration: Duration,
}

/// 單一 Suite 的執行結果
#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub suite_name: String,
    pub steps: Vec<StepReport>,
    pub duration: Duration,
}

/// Collects one report line per operation as a suite walks its menu.
/// Each record is logged immediately and timed relative to the previous one.
#[derive(Debug)]
pub struct StepLog {
    steps: Vec<StepReport>,
    last: Instant,
}

impl StepLog {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            last: Instant::now(),
        }
    }

    pub fn record(&mut self, operation: &str, detail: impl Into<String>) {
        let detail = detail.into();
        tracing::info!("{}: {}", operation, detail);

        let now = Instant::now();
        self.steps.push(StepReport {
            operation: operation.to_string(),
            detail,
            duration: now.duration_since(self.last),
        });
        self.last = now;
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<StepReport> {
        self.steps
    }
}

impl Default for StepLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_log_records_in_order() {
        let mut log = StepLog::new();
        log.record("connect", "ok");
        log.record("insert", "inserted 1 document");

        let steps = log.into_steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].operation, "connect");
        assert_eq!(steps[1].operation, "insert");
        assert_eq!(steps[1].detail, "inserted 1 document");
    }

    #[test]
    fn test_person_serializes_without_missing_fields() {
        let person = Person::new("Alice", 25);
        let value = serde_json::to_value(&person).unwrap();

        assert_eq!(value["name"], "Alice");
        assert_eq!(value["age"], 25);
        // Absent id / reactions must not appear in the wire document
        assert!(value.get("_id").is_none());
        assert!(value.get("reactions").is_none());
    }

    #[test]
    fn test_person_reactions_round_trip() {
        let person = Person::new("Bob", 30).with_reactions(vec![Reaction {
            user_id: "user1".to_string(),
            emoji: "😃".to_string(),
        }]);
        let value = serde_json::to_value(&person).unwrap();
        assert_eq!(value["reactions"][0]["userId"], "user1");
    }
}
