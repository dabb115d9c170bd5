use chrono::NaiveDate;

use crate::core::list::ListType;
use crate::core::merge::MergeMode;
use crate::core::settings::Settings;
use crate::core::timer::TimerMode;
use crate::notify::NotificationPermission;

#[derive(Debug, Clone)]
pub enum Message {
    // Lists
    CreateList(ListType),
    SelectList(Option<String>),
    DeleteList(String),
    RenameList(String, String),

    // Items
    AddItem(String, String),
    AddQuestion {
        list_id: String,
        question: String,
        answer: String,
    },
    EditItem {
        list_id: String,
        item_id: String,
        value: String,
        answer: Option<String>,
    },
    RemoveItem(String, String),
    ToggleItem(String, String),

    // Picker
    Pick(String),
    ResetPool(String),
    /// Delayed refill after the last item was drawn.
    AutoReset(String),

    // Exam
    StartExam(String),
    SelectAnswer(String),
    /// Carries the exam sequence number it was scheduled for.
    ExamAdvance(u64),
    ExitExam,

    // Calendar
    CalendarPrevMonth,
    CalendarNextMonth,
    CalendarSelectDay(NaiveDate),
    AddCalendarTask(String),
    ToggleHighlight,

    // Merge
    MergeLists {
        first: String,
        second: String,
        mode: MergeMode,
        title: String,
    },

    // Settings
    UpdateSettings(Settings),

    // Suggestions
    RequestSuggestions {
        list_id: String,
        topic: Option<String>,
    },
    SuggestionsReady {
        list_id: String,
        generation: u64,
        suggestions: Vec<String>,
    },

    // Focus timer
    TimerSwitchMode(TimerMode),
    TimerSetCustom(u32, u32),
    TimerToggle,
    TimerReset,
    /// Carries the run it belongs to; ticks from a stopped run are dropped.
    TimerTick(u64),
    NotificationPermissionChanged(NotificationPermission),
}
