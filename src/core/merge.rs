use chrono::{DateTime, Utc};

use super::item::Item;
use super::list::List;
use super::state::AppState;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Keep both sources next to the merged list.
    Add,
    /// Remove both sources.
    Replace,
}

/// Concatenate `first` then `second` into a new list. Every item is copied with
/// a fresh id and no pick history; highlights are unioned; the type comes from
/// `first`.
pub fn merge_lists(first: &List, second: &List, title: &str, now: DateTime<Utc>) -> List {
    let items: Vec<Item> = first
        .items
        .iter()
        .chain(&second.items)
        .map(Item::fresh_copy)
        .collect();

    let mut merged = List::new(first.kind, now);
    merged.title = title.trim().to_string();
    merged.items = items;
    merged.highlights = first.highlights.union(&second.highlights).copied().collect();
    merged
}

/// Merge two lists of `state` and make the result the active list.
pub fn merge(
    state: &AppState,
    first: &str,
    second: &str,
    mode: MergeMode,
    title: &str,
    now: DateTime<Utc>,
) -> Result<(AppState, String)> {
    if first == second {
        return Err(Error::MergeSameList);
    }
    if title.trim().is_empty() {
        return Err(Error::MissingTitle);
    }
    let a = state
        .list(first)
        .ok_or_else(|| Error::ListNotFound(first.to_string()))?;
    let b = state
        .list(second)
        .ok_or_else(|| Error::ListNotFound(second.to_string()))?;
    if a.is_calendar() || b.is_calendar() {
        return Err(Error::CalendarLocked);
    }
    if a.kind != b.kind {
        log::warn!(
            "Merging lists of different types ({:?} + {:?}), keeping {:?}",
            a.kind,
            b.kind,
            a.kind
        );
    }

    let merged = merge_lists(a, b, title, now);
    let id = merged.id.clone();
    log::info!("Merged {} items into \"{}\"", merged.items.len(), merged.title);

    let mut next = state.clone();
    next.lists.insert(0, merged);
    if mode == MergeMode::Replace {
        next.lists.retain(|l| l.id != first && l.id != second);
    }
    next.active_list_id = Some(id.clone());
    next.view_mode = a.kind.into();
    Ok((next, id))
}
