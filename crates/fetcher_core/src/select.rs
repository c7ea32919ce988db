use crate::FetcherState;

/// Picks the candidate with the strictly greatest `last_tick_sec`.
///
/// On ties the first candidate encountered wins. Returns `None` when there are
/// no candidates.
pub fn select_most_recent<I>(candidates: I) -> Option<FetcherState>
where
    I: IntoIterator<Item = FetcherState>,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(best) if candidate.last_tick_sec <= best.last_tick_sec => Some(best),
        _ => Some(candidate),
    })
}

/// Returns the most recent candidate, or `fallback` when there is none.
pub fn most_recent_or<I>(candidates: I, fallback: FetcherState) -> FetcherState
where
    I: IntoIterator<Item = FetcherState>,
{
    select_most_recent(candidates).unwrap_or(fallback)
}
