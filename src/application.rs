use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::calendar::{self, CalendarView, MonthGrid};
use crate::core::exam::{self, ExamSession};
use crate::core::item::Item;
use crate::core::list::{List, ListType};
use crate::core::merge;
use crate::core::picker::{self, PoolPolicy};
use crate::core::state::AppState;
use crate::core::timer::{FocusTimer, Tick};
use crate::error::{Error, Result};
use crate::localize::Localizer;
use crate::message::Message;
use crate::notify::NotificationPermission;
use crate::storage::{KeyValueStore, load_state, save_state};
use crate::suggest::{self, SuggestionKind, SuggestionRequest};

/// Work `update` hands back to the runtime.
#[derive(Debug)]
pub enum Effect {
    /// Feed `Message` back in after the delay.
    After(Duration, Message),
    Suggest(SuggestionRequest),
    Notify { title: String, body: String },
    RequestNotificationPermission,
}

/// Waits between a user action and its follow-up message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    pub auto_reset: Duration,
    pub exam_advance: Duration,
    pub timer_tick: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            auto_reset: Duration::from_secs(2),
            exam_advance: Duration::from_millis(1500),
            timer_tick: Duration::from_secs(1),
        }
    }
}

impl Delays {
    pub fn immediate() -> Self {
        Self {
            auto_reset: Duration::ZERO,
            exam_advance: Duration::ZERO,
            timer_tick: Duration::ZERO,
        }
    }
}

pub struct Picklist {
    state: AppState,
    store: Box<dyn KeyValueStore + Send + Sync>,
    rng: StdRng,
    delays: Delays,
    suggestion_count: usize,
    // Screen state, not persisted
    last_pick: Option<Item>,
    exam: Option<ExamSession>,
    exam_seq: u64,
    calendar: CalendarView,
    timer: FocusTimer,
    timer_run: u64,
    permission: NotificationPermission,
    suggestion_generations: HashMap<String, u64>,
}

impl Picklist {
    pub fn new(store: Box<dyn KeyValueStore + Send + Sync>) -> Self {
        let state = load_state(store.as_ref());
        log::info!("Loaded {} lists", state.lists.len());
        Self {
            state,
            store,
            rng: StdRng::from_entropy(),
            delays: Delays::default(),
            suggestion_count: 10,
            last_pick: None,
            exam: None,
            exam_seq: 0,
            calendar: CalendarView::default(),
            timer: FocusTimer::default(),
            timer_run: 0,
            permission: NotificationPermission::Default,
            suggestion_generations: HashMap::new(),
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_delays(mut self, delays: Delays) -> Self {
        self.delays = delays;
        self
    }

    pub fn with_suggestion_count(mut self, count: usize) -> Self {
        self.suggestion_count = count;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn last_pick(&self) -> Option<&Item> {
        self.last_pick.as_ref()
    }

    pub fn exam(&self) -> Option<&ExamSession> {
        self.exam.as_ref()
    }

    pub fn calendar_view(&self) -> &CalendarView {
        &self.calendar
    }

    pub fn timer(&self) -> &FocusTimer {
        &self.timer
    }

    pub fn permission(&self) -> NotificationPermission {
        self.permission
    }

    /// Grid for the displayed month of the calendar list.
    pub fn calendar_grid(&self) -> Option<MonthGrid> {
        let list = self.state.calendar()?;
        self.calendar.grid(list, calendar::today())
    }

    /// Tasks of the calendar list on the selected day.
    pub fn selected_day_tasks(&self) -> Vec<&Item> {
        self.state
            .calendar()
            .map(|list| calendar::tasks_for_day(list, self.calendar.selected_day))
            .unwrap_or_default()
    }

    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::CreateList(kind) => {
                let (next, id) = self.state.create_list(kind, Utc::now());
                log::info!("Created {:?} list {}", kind, id);
                self.commit(next);
            }

            Message::SelectList(id) => match self.state.select(id.as_deref()) {
                Ok(next) => {
                    self.last_pick = None;
                    self.commit(next);
                }
                Err(e) => log::warn!("Cannot select list: {}", e),
            },

            Message::DeleteList(id) => match self.state.delete_list(&id) {
                Ok(next) => {
                    self.suggestion_generations.remove(&id);
                    if self.exam.as_ref().is_some_and(|e| e.list_id == id) {
                        self.close_exam();
                    }
                    log::info!("Deleted list {}", id);
                    self.commit(next);
                }
                Err(e) => log::warn!("Cannot delete list {}: {}", id, e),
            },

            Message::RenameList(id, title) => {
                self.apply_to_list(&id, |list| {
                    list.rename(&title);
                    Ok(())
                });
            }

            Message::AddItem(list_id, value) => {
                self.apply_to_list(&list_id, |list| list.add_item(&value).map(|_| ()));
            }

            Message::AddQuestion {
                list_id,
                question,
                answer,
            } => {
                self.apply_to_list(&list_id, |list| {
                    list.add_question(&question, &answer).map(|_| ())
                });
            }

            Message::EditItem {
                list_id,
                item_id,
                value,
                answer,
            } => {
                self.apply_to_list(&list_id, |list| {
                    list.edit_item(&item_id, &value, answer.as_deref())
                });
            }

            Message::RemoveItem(list_id, item_id) => {
                self.apply_to_list(&list_id, |list| list.remove_item(&item_id).map(|_| ()));
            }

            Message::ToggleItem(list_id, item_id) => {
                let now = Utc::now();
                self.apply_to_list(&list_id, |list| list.toggle_item(&item_id, now).map(|_| ()));
            }

            Message::Pick(list_id) => {
                let Some(list) = self.state.list(&list_id) else {
                    log::warn!("Pick on unknown list {}", list_id);
                    return effects;
                };
                let auto_reset = self.state.settings.auto_reset_pool;
                let policy = PoolPolicy::from_auto_reset(auto_reset);
                match picker::pick(list, policy, &mut self.rng, Utc::now()) {
                    Some(picked) => {
                        log::debug!("Picked \"{}\" from {}", picked.winner.value, list_id);
                        if picked.pool_exhausted() && auto_reset {
                            effects.push(Effect::After(
                                self.delays.auto_reset,
                                Message::AutoReset(list_id.clone()),
                            ));
                        }
                        self.last_pick = Some(picked.winner);
                        self.replace_list(picked.list);
                    }
                    None => log::info!("Nothing left to pick in {}", list_id),
                }
            }

            Message::ResetPool(list_id) => {
                if let Some(list) = self.state.list(&list_id) {
                    let next = picker::reset(list);
                    self.last_pick = None;
                    self.replace_list(next);
                }
            }

            Message::AutoReset(list_id) => {
                if !self.state.settings.auto_reset_pool {
                    return effects;
                }
                // Only refill a pool that is still spent.
                let spent = self
                    .state
                    .list(&list_id)
                    .filter(|l| !l.items.is_empty() && l.available().is_empty())
                    .map(picker::reset);
                if let Some(next) = spent {
                    log::debug!("Auto-resetting pool of {}", list_id);
                    self.replace_list(next);
                }
            }

            Message::StartExam(list_id) => {
                let Some(list) = self.state.list(&list_id) else {
                    log::warn!("Exam on unknown list {}", list_id);
                    return effects;
                };
                match exam::start_exam(list, &mut self.rng) {
                    Ok(session) => {
                        self.exam_seq += 1;
                        self.exam = Some(session);
                    }
                    Err(e) => log::warn!("Cannot start exam: {}", e),
                }
            }

            Message::SelectAnswer(option) => {
                if let Some(correct) = self.exam.as_mut().and_then(|s| s.select(&option)) {
                    log::debug!("Exam answer correct: {}", correct);
                    effects.push(Effect::After(
                        self.delays.exam_advance,
                        Message::ExamAdvance(self.exam_seq),
                    ));
                }
            }

            Message::ExamAdvance(seq) => {
                if seq != self.exam_seq {
                    return effects;
                }
                if let Some(session) = self.exam.as_mut() {
                    session.advance();
                    if session.is_finished() {
                        log::info!(
                            "Exam finished: {}/{} ({}%)",
                            session.score(),
                            session.total(),
                            session.percentage()
                        );
                    }
                }
            }

            Message::ExitExam => self.close_exam(),

            Message::CalendarPrevMonth => self.calendar.prev_month(),
            Message::CalendarNextMonth => self.calendar.next_month(),
            Message::CalendarSelectDay(day) => self.calendar.select_day(day),

            Message::AddCalendarTask(value) => {
                let day = self.calendar.selected_day;
                if let Some(id) = self.state.calendar().map(|l| l.id.clone()) {
                    self.apply_to_list(&id, |list| list.add_task(day, &value).map(|_| ()));
                }
            }

            Message::ToggleHighlight => {
                let day = self.calendar.selected_day;
                if let Some(list) = self.state.calendar() {
                    let next = calendar::toggle_highlight(list, day);
                    self.replace_list(next);
                }
            }

            Message::MergeLists {
                first,
                second,
                mode,
                title,
            } => match merge::merge(&self.state, &first, &second, mode, &title, Utc::now()) {
                Ok((next, _)) => {
                    if mode == merge::MergeMode::Replace {
                        self.suggestion_generations.remove(&first);
                        self.suggestion_generations.remove(&second);
                    }
                    self.last_pick = None;
                    self.commit(next);
                }
                Err(e) => log::warn!("Merge rejected: {}", e),
            },

            Message::UpdateSettings(settings) => {
                let next = self.state.with_settings(settings);
                self.commit(next);
            }

            Message::RequestSuggestions { list_id, topic } => {
                let Some(list) = self.state.list(&list_id) else {
                    log::warn!("Suggestions for unknown list {}", list_id);
                    return effects;
                };
                let Some(prompt) =
                    suggest::prompt_for(list, topic.as_deref(), self.suggestion_count)
                else {
                    log::info!("No topic to suggest for in {}", list_id);
                    return effects;
                };
                let generation = self
                    .suggestion_generations
                    .entry(list_id.clone())
                    .or_insert(0);
                *generation += 1;
                effects.push(Effect::Suggest(SuggestionRequest {
                    list_id,
                    generation: *generation,
                    kind: SuggestionKind::for_list(list.kind),
                    prompt,
                }));
            }

            Message::SuggestionsReady {
                list_id,
                generation,
                suggestions,
            } => {
                if self.suggestion_generations.get(&list_id) != Some(&generation) {
                    log::debug!("Dropping stale suggestions for {}", list_id);
                    return effects;
                }
                let Some(kind) = self
                    .state
                    .list(&list_id)
                    .map(|l| SuggestionKind::for_list(l.kind))
                else {
                    return effects;
                };
                let items = suggest::to_items(kind, &suggestions);
                if items.is_empty() {
                    log::info!("No usable suggestions for {}", list_id);
                    return effects;
                }
                log::info!("Adding {} suggestions to {}", items.len(), list_id);
                self.apply_to_list(&list_id, |list| {
                    list.items.extend(items);
                    Ok(())
                });
            }

            Message::TimerSwitchMode(mode) => {
                self.timer.switch_mode(mode);
                self.timer_run += 1;
            }

            Message::TimerSetCustom(minutes, seconds) => {
                if self.timer.set_custom(minutes, seconds) {
                    self.timer_run += 1;
                } else {
                    log::warn!("Ignoring zero-length custom timer");
                }
            }

            Message::TimerToggle => {
                if self.permission == NotificationPermission::Default {
                    effects.push(Effect::RequestNotificationPermission);
                }
                self.timer_run += 1;
                if self.timer.toggle() {
                    effects.push(Effect::After(
                        self.delays.timer_tick,
                        Message::TimerTick(self.timer_run),
                    ));
                }
            }

            Message::TimerReset => {
                self.timer.reset();
                self.timer_run += 1;
            }

            Message::TimerTick(run) => {
                if run != self.timer_run {
                    return effects;
                }
                match self.timer.tick() {
                    Tick::Running(_) => {
                        effects.push(Effect::After(self.delays.timer_tick, Message::TimerTick(run)))
                    }
                    Tick::Finished => {
                        log::info!("Focus timer finished");
                        if self.permission == NotificationPermission::Granted {
                            let l10n = Localizer::new(self.state.settings.language);
                            effects.push(Effect::Notify {
                                title: l10n.text("timer-finished"),
                                body: l10n.text("timer-finished-body"),
                            });
                        }
                    }
                    Tick::Idle => {}
                }
            }

            Message::NotificationPermissionChanged(permission) => {
                self.permission = permission;
            }
        }

        effects
    }

    fn close_exam(&mut self) {
        self.exam = None;
        self.exam_seq += 1;
    }

    /// Edit a copy of one list and swap it in. Failures are logged and leave
    /// the state untouched.
    fn apply_to_list(&mut self, id: &str, edit: impl FnOnce(&mut List) -> Result<()>) {
        let result = self
            .state
            .list(id)
            .cloned()
            .ok_or_else(|| Error::ListNotFound(id.to_string()))
            .and_then(|mut list| {
                edit(&mut list)?;
                self.state.with_list(list)
            });
        match result {
            Ok(next) => self.commit(next),
            Err(e) => log::warn!("List {} unchanged: {}", id, e),
        }
    }

    fn replace_list(&mut self, list: List) {
        match self.state.with_list(list) {
            Ok(next) => self.commit(next),
            Err(e) => log::warn!("Failed to replace list: {}", e),
        }
    }

    fn commit(&mut self, next: AppState) {
        self.state = next;
        save_state(self.store.as_ref(), &self.state);
    }
}

/// Summary line for one list, as shown in the sidebar.
pub fn list_summary(list: &List) -> String {
    match list.kind {
        ListType::Todo => format!("{} [{}%]", list.title, list.progress()),
        ListType::Calendar => format!("{} ({} tasks)", list.title, list.items.len()),
        _ => format!(
            "{} ({}/{} left)",
            list.title,
            list.available().len(),
            list.items.len()
        ),
    }
}
