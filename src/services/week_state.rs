use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

pub const FIRST_WEEK: u32 = 1;
pub const LAST_WEEK: u32 = 18;

/// Weeks offered by the week selector.
pub fn selectable_weeks() -> impl Iterator<Item = u32> {
    FIRST_WEEK..=LAST_WEEK
}

/// Numeric coercion of a selector value. No range check is applied.
///
/// Floats are accepted only when they hold a whole number that fits in a `u32`.
pub fn coerce_week(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    trimmed.parse::<u32>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|w| w.is_finite() && *w >= 0.0 && w.fract() == 0.0 && *w <= u32::MAX as f64)
            .map(|w| w as u32)
    })
}

/// Identifies one refresh: the week it was issued for and the selection generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekTicket {
    pub week: u32,
    pub generation: u64,
}

/// The selected week, shared by every view of one dashboard.
///
/// Every `set` bumps the generation, so a fetch started under an older ticket
/// can tell that its result is stale.
#[derive(Debug, Clone)]
pub struct WeekState {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    week: AtomicU32,
    generation: AtomicU64,
}

impl WeekState {
    pub fn new(week: u32) -> Self {
        Self {
            inner: Arc::new(Inner {
                week: AtomicU32::new(week),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn week(&self) -> u32 {
        self.inner.week.load(Ordering::Acquire)
    }

    /// Select a week and return the ticket that refreshes for it must carry.
    pub fn set(&self, week: u32) -> WeekTicket {
        // week is stored before the generation is published
        self.inner.week.store(week, Ordering::Release);
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!("Week set to {} (generation {})", week, generation);
        WeekTicket { week, generation }
    }

    pub fn ticket(&self) -> WeekTicket {
        let generation = self.inner.generation.load(Ordering::Acquire);
        WeekTicket {
            week: self.week(),
            generation,
        }
    }

    pub fn is_current(&self, ticket: &WeekTicket) -> bool {
        self.inner.generation.load(Ordering::Acquire) == ticket.generation
    }
}

impl Default for WeekState {
    fn default() -> Self {
        Self::new(FIRST_WEEK)
    }
}
