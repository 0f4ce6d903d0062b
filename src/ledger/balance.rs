//! Balance replay over the event logs.

use chrono::{DateTime, Utc};

use crate::models::{ConsumptionEvent, ReplenishmentEvent};

/// Balance derived purely from events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayedBalance {
    pub remaining_times: u32,
    pub total_times: u32,
}

enum Entry {
    Consumed(u32),
    Granted(u32),
}

/// Replay events in the order their balance updates were applied, flooring
/// at zero after each consumption. Events stamped with the same student
/// version fall back to `recorded_at`, grants first.
pub fn replay(
    consumptions: &[ConsumptionEvent],
    replenishments: &[ReplenishmentEvent],
) -> ReplayedBalance {
    let mut entries: Vec<(u64, DateTime<Utc>, Entry)> = replenishments
        .iter()
        .map(|e| (e.applied_version, e.recorded_at, Entry::Granted(e.times)))
        .chain(
            consumptions
                .iter()
                .map(|e| (e.applied_version, e.recorded_at, Entry::Consumed(e.times))),
        )
        .collect();
    entries.sort_by_key(|(version, at, _)| (*version, *at));

    entries
        .into_iter()
        .fold(ReplayedBalance::default(), |mut balance, (_, _, entry)| {
            match entry {
                Entry::Granted(times) => {
                    balance.remaining_times = balance.remaining_times.saturating_add(times);
                    balance.total_times = balance.total_times.saturating_add(times);
                }
                Entry::Consumed(times) => {
                    balance.remaining_times = balance.remaining_times.saturating_sub(times);
                }
            }
            balance
        })
}
