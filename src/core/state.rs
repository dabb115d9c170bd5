use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::list::{CALENDAR_LIST_ID, List, ListType};
use super::settings::{Settings, or_default};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    Welcome,
    Randomizer,
    Todo,
    Calendar,
    QuestionTest,
}

impl From<ListType> for ViewMode {
    fn from(kind: ListType) -> Self {
        match kind {
            ListType::Randomizer => Self::Randomizer,
            ListType::Todo => Self::Todo,
            ListType::QuestionTest => Self::QuestionTest,
            ListType::Calendar => Self::Calendar,
        }
    }
}

/// Everything that is persisted: the list collection, the active selection,
/// settings and the current screen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppState {
    pub lists: Vec<List>,
    /// Cleared when the referenced list is deleted.
    pub active_list_id: Option<String>,
    pub settings: Settings,
    #[serde(deserialize_with = "or_default")]
    pub view_mode: ViewMode,
}

impl AppState {
    pub fn list(&self, id: &str) -> Option<&List> {
        self.lists.iter().find(|l| l.id == id)
    }

    pub fn active_list(&self) -> Option<&List> {
        self.active_list_id.as_deref().and_then(|id| self.list(id))
    }

    pub fn calendar(&self) -> Option<&List> {
        self.list(CALENDAR_LIST_ID)
    }

    /// Make sure exactly one list carries the calendar id. A calendar-typed
    /// list saved under another id is adopted as the calendar; any further
    /// ones are folded into it, tasks and highlights included. Returns
    /// whether anything changed.
    pub fn ensure_calendar(&mut self, now: DateTime<Utc>) -> bool {
        let mut renamed: Vec<String> = Vec::new();
        let mut changed = false;

        if self.calendar().is_none() {
            match self.lists.iter().position(|l| l.kind == ListType::Calendar) {
                Some(idx) => {
                    let stray = &mut self.lists[idx];
                    log::info!("Adopting list {} as the calendar", stray.id);
                    renamed.push(std::mem::replace(
                        &mut stray.id,
                        CALENDAR_LIST_ID.to_string(),
                    ));
                }
                None => self.lists.push(List::calendar(now)),
            }
            changed = true;
        }

        let (strays, lists): (Vec<List>, Vec<List>) = std::mem::take(&mut self.lists)
            .into_iter()
            .partition(|l| l.kind == ListType::Calendar && !l.is_calendar());
        self.lists = lists;
        if !strays.is_empty() {
            log::warn!("Folding {} extra calendar lists into the calendar", strays.len());
            if let Some(calendar) = self.lists.iter_mut().find(|l| l.is_calendar()) {
                for stray in strays {
                    renamed.push(stray.id);
                    calendar.items.extend(stray.items);
                    calendar.highlights.extend(stray.highlights);
                }
            }
            changed = true;
        }

        if self
            .active_list_id
            .as_ref()
            .is_some_and(|id| renamed.contains(id))
        {
            self.active_list_id = Some(CALENDAR_LIST_ID.to_string());
        }
        if self.active_list_id.is_some() && self.active_list().is_none() {
            self.active_list_id = None;
            changed = true;
        }
        changed
    }

    /// Create a list of `kind` at the front and make it active. A calendar
    /// request selects the existing calendar instead.
    pub fn create_list(&self, kind: ListType, now: DateTime<Utc>) -> (AppState, String) {
        let mut next = self.clone();
        let id = if kind == ListType::Calendar {
            next.ensure_calendar(now);
            CALENDAR_LIST_ID.to_string()
        } else {
            let list = List::new(kind, now);
            let id = list.id.clone();
            next.lists.insert(0, list);
            id
        };
        next.active_list_id = Some(id.clone());
        next.view_mode = kind.into();
        (next, id)
    }

    /// Swap in a new version of an existing list.
    pub fn with_list(&self, list: List) -> Result<AppState> {
        let mut next = self.clone();
        let slot = next
            .lists
            .iter_mut()
            .find(|l| l.id == list.id)
            .ok_or_else(|| Error::ListNotFound(list.id.clone()))?;
        *slot = list;
        Ok(next)
    }

    pub fn delete_list(&self, id: &str) -> Result<AppState> {
        if id == CALENDAR_LIST_ID {
            return Err(Error::CalendarLocked);
        }
        if self.list(id).is_none() {
            return Err(Error::ListNotFound(id.to_string()));
        }
        let mut next = self.clone();
        next.lists.retain(|l| l.id != id);
        if next.active_list_id.as_deref() == Some(id) {
            next.active_list_id = None;
            next.view_mode = ViewMode::Welcome;
        }
        Ok(next)
    }

    pub fn select(&self, id: Option<&str>) -> Result<AppState> {
        let mut next = self.clone();
        match id {
            Some(id) => {
                let kind = self
                    .list(id)
                    .ok_or_else(|| Error::ListNotFound(id.to_string()))?
                    .kind;
                next.active_list_id = Some(id.to_string());
                next.view_mode = kind.into();
            }
            None => {
                next.active_list_id = None;
                next.view_mode = ViewMode::Welcome;
            }
        }
        Ok(next)
    }

    pub fn with_settings(&self, settings: Settings) -> AppState {
        AppState {
            settings,
            ..self.clone()
        }
    }
}
