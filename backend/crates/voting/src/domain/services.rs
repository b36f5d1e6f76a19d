//! Domain Services
//!
//! Pure throttle evaluation plus the calendar it is evaluated against.

use chrono::{Datelike, Days, Local, NaiveDate};
use parking_lot::Mutex;

use crate::domain::entities::ActionState;
use crate::domain::value_objects::{ActionAllowance, DenialReason, ThrottleConfig};

/// Evaluate how many actions a session may still perform on `today`
///
/// Blackout days win over everything else: the whole site is read-only
/// regardless of the session's own count.
pub fn evaluate_allowance(
    state: &ActionState,
    config: &ThrottleConfig,
    today: NaiveDate,
) -> ActionAllowance {
    if config.is_blackout(today.weekday()) {
        return ActionAllowance {
            remaining: 0,
            denial: Some(DenialReason::BlackoutDay),
        };
    }

    let used = state.count_on(today);
    if used >= config.max_actions_per_day {
        return ActionAllowance {
            remaining: 0,
            denial: Some(DenialReason::DailyLimitReached),
        };
    }

    ActionAllowance {
        remaining: config.max_actions_per_day - used,
        denial: None,
    }
}

/// Source of "today" for the throttle
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Server-local calendar date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually driven calendar, for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        *self.today.lock() = today;
    }

    pub fn advance_days(&self, days: u64) {
        let mut today = self.today.lock();
        if let Some(next) = today.checked_add_days(Days::new(days)) {
            *today = next;
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock()
    }
}
