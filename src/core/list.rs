use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::Item;
use super::settings::or_default;
use crate::error::{Error, Result};

/// Fixed id of the calendar list. There is only ever one.
pub const CALENDAR_LIST_ID: &str = "5f0ca1e4-da00-4c1a-9e6d-ca1e4da70001";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListType {
    #[default]
    Randomizer,
    Todo,
    QuestionTest,
    Calendar,
}

impl ListType {
    pub fn default_title(&self) -> &'static str {
        match self {
            Self::Randomizer => "New Amazing List",
            Self::Todo => "New To-Do List",
            Self::QuestionTest => "New Question Test",
            Self::Calendar => "Calendar",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<Item>,
    /// Highlighted calendar days.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub highlights: BTreeSet<NaiveDate>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, rename = "type", deserialize_with = "or_default")]
    pub kind: ListType,
}

impl List {
    pub fn new(kind: ListType, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: kind.default_title().to_string(),
            items: Vec::new(),
            highlights: BTreeSet::new(),
            created_at: now,
            kind,
        }
    }

    pub fn calendar(now: DateTime<Utc>) -> Self {
        Self {
            id: CALENDAR_LIST_ID.to_string(),
            ..Self::new(ListType::Calendar, now)
        }
    }

    pub fn is_calendar(&self) -> bool {
        self.id == CALENDAR_LIST_ID
    }

    /// Unpicked items in insertion order.
    pub fn available(&self) -> Vec<&Item> {
        self.items.iter().filter(|i| !i.is_picked).collect()
    }

    /// Picked items, most recently picked first.
    pub fn picked_history(&self) -> Vec<&Item> {
        let mut picked: Vec<&Item> = self.items.iter().filter(|i| i.is_picked).collect();
        picked.sort_by(|a, b| b.picked_at.cmp(&a.picked_at));
        picked
    }

    /// Completion percentage for to-do lists, 0 when empty.
    pub fn progress(&self) -> u8 {
        if self.items.is_empty() {
            return 0;
        }
        let done = self.items.iter().filter(|i| i.is_picked).count();
        ((done as f64 / self.items.len() as f64) * 100.0).round() as u8
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn rename(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn add_item(&mut self, value: &str) -> Result<String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::EmptyValue);
        }
        let item = Item::new(value);
        let id = item.id.clone();
        self.items.push(item);
        Ok(id)
    }

    pub fn add_question(&mut self, question: &str, answer: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::EmptyValue);
        }
        let item = Item::question(question, answer);
        let id = item.id.clone();
        self.items.push(item);
        Ok(id)
    }

    pub fn add_task(&mut self, day: NaiveDate, value: &str) -> Result<String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::EmptyValue);
        }
        let item = Item::task(value, day);
        let id = item.id.clone();
        self.items.push(item);
        Ok(id)
    }

    /// Update an item's text, and its answer when one is given.
    pub fn edit_item(&mut self, id: &str, value: &str, answer: Option<&str>) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::EmptyValue);
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::ItemNotFound(id.to_string()))?;
        item.value = value.to_string();
        if let Some(answer) = answer {
            item.answer = Some(answer.trim().to_string());
        }
        Ok(())
    }

    pub fn remove_item(&mut self, id: &str) -> Result<Item> {
        let pos = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| Error::ItemNotFound(id.to_string()))?;
        Ok(self.items.remove(pos))
    }

    /// Flip completion of a to-do or calendar task.
    pub fn toggle_item(&mut self, id: &str, now: DateTime<Utc>) -> Result<bool> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::ItemNotFound(id.to_string()))?;
        if item.is_picked {
            item.unpick();
        } else {
            item.mark_picked(now);
        }
        Ok(item.is_picked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn add_item_trims_and_rejects_empty() {
        let mut list = List::new(ListType::Randomizer, at(0));
        list.add_item("  Alice ").unwrap();
        assert_eq!(list.items[0].value, "Alice");
        assert!(matches!(list.add_item("   "), Err(Error::EmptyValue)));
        assert_eq!(list.items.len(), 1);
    }

    #[test]
    fn history_is_most_recent_first() {
        let mut list = List::new(ListType::Randomizer, at(0));
        let a = list.add_item("a").unwrap();
        let b = list.add_item("b").unwrap();
        list.add_item("c").unwrap();
        list.toggle_item(&a, at(10)).unwrap();
        list.toggle_item(&b, at(20)).unwrap();

        let history: Vec<&str> = list.picked_history().iter().map(|i| i.value.as_str()).collect();
        assert_eq!(history, vec!["b", "a"]);
        let available: Vec<&str> = list.available().iter().map(|i| i.value.as_str()).collect();
        assert_eq!(available, vec!["c"]);
    }

    #[test]
    fn toggle_clears_timestamp_when_reopened() {
        let mut list = List::new(ListType::Todo, at(0));
        let id = list.add_item("Write report").unwrap();
        assert!(list.toggle_item(&id, at(5)).unwrap());
        assert_eq!(list.item(&id).unwrap().picked_at, Some(at(5)));
        assert!(!list.toggle_item(&id, at(6)).unwrap());
        assert!(list.item(&id).unwrap().picked_at.is_none());
    }

    #[test]
    fn progress_rounds() {
        let mut list = List::new(ListType::Todo, at(0));
        assert_eq!(list.progress(), 0);
        let a = list.add_item("a").unwrap();
        list.add_item("b").unwrap();
        list.add_item("c").unwrap();
        list.toggle_item(&a, at(1)).unwrap();
        assert_eq!(list.progress(), 33);
    }

    #[test]
    fn edit_and_remove_unknown_item() {
        let mut list = List::new(ListType::QuestionTest, at(0));
        let id = list.add_question("2+2?", "4").unwrap();
        list.edit_item(&id, "2 + 2 = ?", Some(" four ")).unwrap();
        assert_eq!(list.item(&id).unwrap().answer.as_deref(), Some("four"));

        assert!(matches!(list.remove_item("missing"), Err(Error::ItemNotFound(_))));
        assert_eq!(list.remove_item(&id).unwrap().value, "2 + 2 = ?");
    }

    #[test]
    fn missing_type_reads_as_randomizer() {
        let json = r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","title":"Old","items":[],"createdAt":1700000000000}"#;
        let list: List = serde_json::from_str(json).unwrap();
        assert_eq!(list.kind, ListType::Randomizer);
        assert!(list.highlights.is_empty());
    }

    #[test]
    fn reads_list_with_plain_string_ids() {
        let json = r#"{"id":"list-1","title":"Team","items":[{"id":"a","value":"Ann","isPicked":false}],"createdAt":1700000000000,"type":"todo"}"#;
        let mut list: List = serde_json::from_str(json).unwrap();
        assert_eq!(list.id, "list-1");
        assert!(list.toggle_item("a", at(1)).unwrap());
        let added = list.add_item("Ben").unwrap();
        assert_ne!(added, "a");
    }

    #[test]
    fn unknown_type_reads_as_randomizer() {
        let json = r#"{"id":"x","title":"Odd","items":[],"createdAt":0,"type":"kanban"}"#;
        let list: List = serde_json::from_str(json).unwrap();
        assert_eq!(list.kind, ListType::Randomizer);
        assert_eq!(list.title, "Odd");
    }

    #[test]
    fn type_uses_kebab_case() {
        let list = List::new(ListType::QuestionTest, at(0));
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["type"], "question-test");
        assert_eq!(json["createdAt"], 0);
    }
}
