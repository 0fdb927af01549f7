//! Weekday dispatch between entry scan and exit check.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::config::Schedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    Entry,
    ExitCheck,
    Idle,
}

impl RunMode {
    /// Entry wins if both weekdays are configured to the same day.
    pub fn for_weekday(weekday: Weekday, schedule: &Schedule) -> Self {
        if weekday == schedule.entry_weekday {
            RunMode::Entry
        } else if weekday == schedule.exit_weekday {
            RunMode::ExitCheck
        } else {
            RunMode::Idle
        }
    }
}
