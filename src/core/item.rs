use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Answer stored for a question added without one.
pub const NO_ANSWER: &str = "No answer provided.";

/// Answer stored for a generated question whose text had no `Question: Answer` split.
pub const NO_GENERATED_ANSWER: &str = "No answer generated.";

/// One entry of a list: a name in the pool, a to-do, a quiz question or a calendar task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Calendar day this task belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub is_picked: bool,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub picked_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            value: value.into(),
            answer: None,
            date: None,
            is_picked: false,
            picked_at: None,
        }
    }

    pub fn question(question: impl Into<String>, answer: impl Into<String>) -> Self {
        let answer = answer.into();
        let answer = if answer.trim().is_empty() {
            NO_ANSWER.to_string()
        } else {
            answer.trim().to_string()
        };
        Self {
            answer: Some(answer),
            ..Self::new(question)
        }
    }

    pub fn task(value: impl Into<String>, day: NaiveDate) -> Self {
        Self {
            date: Some(day),
            ..Self::new(value)
        }
    }

    /// Parse a generated `Question: Answer` line. Only the first colon splits.
    pub fn from_suggested_pair(line: &str) -> Self {
        let (question, answer) = match line.split_once(':') {
            Some((q, a)) => (q.trim(), a.trim()),
            None => (line.trim(), ""),
        };
        let answer = if answer.is_empty() {
            NO_GENERATED_ANSWER
        } else {
            answer
        };
        Self {
            answer: Some(answer.to_string()),
            ..Self::new(question)
        }
    }

    /// The answer compared against during an exam.
    pub fn answer_or_default(&self) -> &str {
        self.answer.as_deref().unwrap_or(NO_ANSWER)
    }

    pub fn mark_picked(&mut self, at: DateTime<Utc>) {
        self.is_picked = true;
        self.picked_at = Some(at);
    }

    pub fn unpick(&mut self) {
        self.is_picked = false;
        self.picked_at = None;
    }

    /// Copy with a fresh id and no pick history.
    pub fn fresh_copy(&self) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            is_picked: false,
            picked_at: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_without_answer_gets_placeholder() {
        let item = Item::question("Capital of France?", "   ");
        assert_eq!(item.answer.as_deref(), Some(NO_ANSWER));
    }

    #[test]
    fn suggested_pair_splits_on_first_colon_only() {
        let item = Item::from_suggested_pair("Time in Riyadh: UTC+3: no DST");
        assert_eq!(item.value, "Time in Riyadh");
        assert_eq!(item.answer.as_deref(), Some("UTC+3: no DST"));
    }

    #[test]
    fn suggested_pair_without_colon() {
        let item = Item::from_suggested_pair("  Lonely question ");
        assert_eq!(item.value, "Lonely question");
        assert_eq!(item.answer.as_deref(), Some(NO_GENERATED_ANSWER));
    }

    #[test]
    fn serializes_with_camel_case_and_millis() {
        let mut item = Item::new("Alice");
        item.mark_picked(DateTime::from_timestamp_millis(1_700_000_000_123).unwrap());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["isPicked"], true);
        assert_eq!(json["pickedAt"], 1_700_000_000_123i64);
        assert!(json.get("answer").is_none());
    }

    #[test]
    fn reads_item_without_optional_fields() {
        let json = r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","value":"Bob","isPicked":false}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.value, "Bob");
        assert!(item.picked_at.is_none());
        assert!(item.date.is_none());
    }

    #[test]
    fn any_string_is_an_id() {
        let json = r#"{"id":"1712345678901","value":"Dan","isPicked":true,"pickedAt":1712345678901}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "1712345678901");
        assert!(item.is_picked);
    }

    #[test]
    fn fresh_copy_drops_history() {
        let mut item = Item::new("Carol");
        item.mark_picked(Utc::now());
        let copy = item.fresh_copy();
        assert_ne!(copy.id, item.id);
        assert!(!copy.is_picked);
        assert!(copy.picked_at.is_none());
        assert_eq!(copy.value, "Carol");
    }
}
