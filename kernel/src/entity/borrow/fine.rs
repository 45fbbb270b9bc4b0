use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::entity::DueAt;

/// Rupees charged for each whole day a copy stays out past its due date.
pub const FINE_PER_DAY: i64 = 5;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Fine(i64);

impl Fine {
    /// `settled_at` is the return date for closed loans and the current time otherwise.
    pub fn assess(due_at: &DueAt, settled_at: OffsetDateTime) -> Self {
        let overdue_days = (settled_at - *due_at.as_ref()).whole_days();
        Self(overdue_days.max(0) * FINE_PER_DAY)
    }

    pub fn amount(&self) -> i64 {
        self.0
    }
}
