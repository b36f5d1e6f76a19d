//! Domain Value Objects

use std::collections::HashSet;
use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

pub use kernel::id::SessionId;

/// Catalog-assigned game identifier, starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(u32);

impl GameId {
    pub const FIRST: GameId = GameId(1);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Following id, `None` once the sequence is exhausted
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for GameId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Process-wide throttle settings, read-only after startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Always greater than zero
    pub max_actions_per_day: u32,
    pub blackout_days: HashSet<Weekday>,
}

impl ThrottleConfig {
    pub fn new(max_actions_per_day: u32, blackout_days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            max_actions_per_day,
            blackout_days: blackout_days.into_iter().collect(),
        }
    }

    pub fn is_blackout(&self, day: Weekday) -> bool {
        self.blackout_days.contains(&day)
    }
}

/// Why a session may not act right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Today is a configured blackout weekday (site-wide read-only)
    BlackoutDay,
    /// This session used up today's actions
    DailyLimitReached,
}

impl DenialReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenialReason::BlackoutDay => "Site is in read-only mode today.",
            DenialReason::DailyLimitReached => "You have used all of today's actions.",
        }
    }
}

/// Outcome of evaluating a session against the throttle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionAllowance {
    pub remaining: u32,
    pub denial: Option<DenialReason>,
}

impl ActionAllowance {
    pub fn is_permitted(&self) -> bool {
        self.denial.is_none()
    }
}
