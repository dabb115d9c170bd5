use chrono::{DateTime, Utc};
use rand::Rng;

use super::item::Item;
use super::list::List;

/// What to do when a pick is requested and nothing is left in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolPolicy {
    Manual,
    AutoReset,
}

impl PoolPolicy {
    pub fn from_auto_reset(enabled: bool) -> Self {
        if enabled { Self::AutoReset } else { Self::Manual }
    }
}

/// Result of a successful draw.
#[derive(Debug, Clone)]
pub struct Picked {
    pub list: List,
    pub winner: Item,
    /// The pool had to be refilled before this draw.
    pub was_reset: bool,
}

impl Picked {
    /// No unpicked items remain after this draw.
    pub fn pool_exhausted(&self) -> bool {
        self.list.items.iter().all(|i| i.is_picked)
    }
}

/// Draw one unpicked item uniformly at random and mark it picked at `now`.
///
/// Returns `None` for an empty list, or for an exhausted pool under
/// [`PoolPolicy::Manual`].
pub fn pick<R: Rng + ?Sized>(
    list: &List,
    policy: PoolPolicy,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Option<Picked> {
    if list.items.is_empty() {
        return None;
    }

    let mut was_reset = false;
    let mut next = if list.available().is_empty() {
        match policy {
            PoolPolicy::Manual => return None,
            PoolPolicy::AutoReset => {
                log::debug!("Pool of {} exhausted, resetting before draw", list.id);
                was_reset = true;
                reset(list)
            }
        }
    } else {
        list.clone()
    };

    let unpicked: Vec<usize> = next
        .items
        .iter()
        .enumerate()
        .filter(|(_, i)| !i.is_picked)
        .map(|(idx, _)| idx)
        .collect();

    let chosen = unpicked[rng.gen_range(0..unpicked.len())];
    next.items[chosen].mark_picked(now);
    let winner = next.items[chosen].clone();

    Some(Picked {
        list: next,
        winner,
        was_reset,
    })
}

/// Return every item to the pool. Order and membership are unchanged.
pub fn reset(list: &List) -> List {
    let mut next = list.clone();
    for item in &mut next.items {
        item.unpick();
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::list::ListType;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn list_of(values: &[&str]) -> List {
        let mut list = List::new(ListType::Randomizer, now());
        for v in values {
            list.add_item(v).unwrap();
        }
        list
    }

    #[test]
    fn forced_first_index_picks_first_unpicked() {
        let mut list = list_of(&["X", "Y", "Z"]);
        let z = list.items[2].id.clone();
        list.toggle_item(&z, now()).unwrap();

        let mut rng = StepRng::new(0, 0);
        let picked = pick(&list, PoolPolicy::Manual, &mut rng, now()).unwrap();

        assert_eq!(picked.winner.value, "X");
        assert_eq!(picked.winner.picked_at, Some(now()));
        assert!(picked.list.items[0].is_picked);
        assert!(!picked.list.items[1].is_picked);
        assert!(picked.list.items[2].is_picked);
        assert!(!picked.was_reset);
        // Input is untouched.
        assert!(!list.items[0].is_picked);
    }

    #[test]
    fn every_pick_removes_exactly_one_from_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut list = list_of(&["a", "b", "c", "d", "e", "f"]);
        while !list.available().is_empty() {
            let before = list.available().len();
            let picked = pick(&list, PoolPolicy::Manual, &mut rng, now()).unwrap();
            assert_eq!(picked.list.available().len(), before - 1);
            let newly: Vec<_> = picked
                .list
                .items
                .iter()
                .zip(&list.items)
                .filter(|(after, before)| after.is_picked && !before.is_picked)
                .collect();
            assert_eq!(newly.len(), 1);
            assert_eq!(newly[0].0.id, picked.winner.id);
            list = picked.list;
        }
    }

    #[test]
    fn empty_pool_manual_is_noop() {
        let list = list_of(&["only"]);
        let mut rng = StdRng::seed_from_u64(1);
        let exhausted = pick(&list, PoolPolicy::Manual, &mut rng, now()).unwrap();
        assert!(exhausted.pool_exhausted());
        assert!(pick(&exhausted.list, PoolPolicy::Manual, &mut rng, now()).is_none());
    }

    #[test]
    fn empty_pool_auto_reset_draws_again() {
        let list = list_of(&["a", "b"]);
        let mut rng = StdRng::seed_from_u64(3);
        let first = pick(&list, PoolPolicy::AutoReset, &mut rng, now()).unwrap();
        let second = pick(&first.list, PoolPolicy::AutoReset, &mut rng, now()).unwrap();
        let third = pick(&second.list, PoolPolicy::AutoReset, &mut rng, now()).unwrap();
        assert!(third.was_reset);
        assert_eq!(third.list.available().len(), 1);
    }

    #[test]
    fn empty_list_has_no_winner() {
        let list = list_of(&[]);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(pick(&list, PoolPolicy::AutoReset, &mut rng, now()).is_none());
    }

    #[test]
    fn reset_is_idempotent_and_keeps_order() {
        let mut rng = StdRng::seed_from_u64(11);
        let list = list_of(&["a", "b", "c"]);
        let picked = pick(&list, PoolPolicy::Manual, &mut rng, now()).unwrap().list;

        let once = reset(&picked);
        let twice = reset(&once);
        assert_eq!(once, twice);
        assert!(once.items.iter().all(|i| !i.is_picked && i.picked_at.is_none()));
        let ids: Vec<_> = once.items.iter().map(|i| &i.id).collect();
        let original: Vec<_> = list.items.iter().map(|i| &i.id).collect();
        assert_eq!(ids, original);
    }
}
