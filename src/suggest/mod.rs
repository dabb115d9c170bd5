pub mod anthropic;
pub mod keyring;

use serde::Deserialize;

use crate::core::item::Item;
use crate::core::list::{List, ListType};
use crate::error::{Error, Result};

/// Text-generation service turning a prompt into a list of suggested strings.
#[allow(async_fn_in_trait)]
pub trait Suggester {
    async fn suggest(&self, prompt: &str) -> Result<Vec<String>>;
}

/// Stand-in used when no API key is configured.
#[derive(Debug, Default)]
pub struct NoSuggester;

impl Suggester for NoSuggester {
    async fn suggest(&self, _prompt: &str) -> Result<Vec<String>> {
        Err(Error::Suggestion("no suggestion service configured".to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    /// Plain names or items for a picker or to-do list.
    Names,
    /// `Question: Answer` pairs for a question test.
    QuestionAnswer,
}

impl SuggestionKind {
    pub fn for_list(kind: ListType) -> Self {
        match kind {
            ListType::QuestionTest => Self::QuestionAnswer,
            _ => Self::Names,
        }
    }
}

/// An outstanding suggestion call, tagged so late answers can be recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub list_id: String,
    pub generation: u64,
    pub kind: SuggestionKind,
    pub prompt: String,
}

pub fn names_prompt(topic: &str, count: usize) -> String {
    format!(
        "Generate a list of {} relevant names or items for the topic: \"{}\". Provide just the names as a list.",
        count,
        topic.trim()
    )
}

pub fn questions_prompt(title: &str, count: usize) -> String {
    names_prompt(
        &format!("Questions and answers for: {}. Format as Question: Answer.", title.trim()),
        count,
    )
}

/// Build the prompt for `list`, or `None` when there is no usable topic.
pub fn prompt_for(list: &List, topic: Option<&str>, count: usize) -> Option<String> {
    match SuggestionKind::for_list(list.kind) {
        SuggestionKind::QuestionAnswer => {
            let title = list.title.trim();
            if title.is_empty() || title == ListType::QuestionTest.default_title() {
                return None;
            }
            Some(questions_prompt(title, count))
        }
        SuggestionKind::Names => {
            let topic = topic.unwrap_or(&list.title).trim();
            if topic.is_empty() {
                return None;
            }
            Some(names_prompt(topic, count))
        }
    }
}

/// Turn suggested strings into list items.
pub fn to_items(kind: SuggestionKind, suggestions: &[String]) -> Vec<Item> {
    suggestions
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| match kind {
            SuggestionKind::Names => Item::new(s),
            SuggestionKind::QuestionAnswer => Item::from_suggested_pair(s),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct SuggestionPayload {
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Strip markdown code fences a model may wrap JSON in.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parse `{"suggestions": [...]}`, also accepting a bare JSON array.
pub fn parse_suggestions(text: &str) -> Result<Vec<String>> {
    let json = strip_code_fences(text);
    if let Ok(payload) = serde_json::from_str::<SuggestionPayload>(json) {
        return Ok(payload.suggestions);
    }
    serde_json::from_str::<Vec<String>>(json)
        .map_err(|e| Error::Suggestion(format!("unparsable suggestions: {} (raw: {})", e, text)))
}
