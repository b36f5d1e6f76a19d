//! Domain Entities

use chrono::NaiveDate;

use crate::domain::value_objects::GameId;

/// One votable, ownable catalog entry
///
/// Records are owned by the catalog; everything else works on snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub id: GameId,
    pub title: String,
    pub vote_count: u32,
    pub owned: bool,
}

impl GameRecord {
    /// A freshly added game carries the adder's vote and is not owned yet
    pub fn new(id: GameId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            vote_count: 1,
            owned: false,
        }
    }
}

/// Per-session record of today's mutating actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionState {
    pub last_action_date: Option<NaiveDate>,
    pub action_count_today: u32,
}

impl ActionState {
    /// Actions already spent on `today` (earlier days do not count)
    pub fn count_on(&self, today: NaiveDate) -> u32 {
        if self.last_action_date == Some(today) {
            self.action_count_today
        } else {
            0
        }
    }

    /// Account for one successful action performed on `today`
    pub fn record(&mut self, today: NaiveDate) {
        if self.last_action_date == Some(today) {
            self.action_count_today = self.action_count_today.saturating_add(1);
        } else {
            self.last_action_date = Some(today);
            self.action_count_today = 1;
        }
    }
}
