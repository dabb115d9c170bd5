/// Errors surfaced by list, exam and merge operations and by the I/O edges.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("list not found: {0}")]
    ListNotFound(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("the calendar list cannot be deleted or merged away")]
    CalendarLocked,

    #[error("cannot merge a list with itself")]
    MergeSameList,

    #[error("merged list needs a title")]
    MissingTitle,

    #[error("value must not be empty")]
    EmptyValue,

    #[error("an exam needs at least {required} questions, list has {found}")]
    NotEnoughQuestions { required: usize, found: usize },

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("suggestion request failed: {0}")]
    Suggestion(String),

    #[error("keyring error: {0}")]
    Keyring(String),
}

pub type Result<T> = std::result::Result<T, Error>;
