use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Exceptional closure of the shared schedule, inserted when an event-space
/// booking is confirmed so the space stops accepting other reservations.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ScheduleClosure {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl ScheduleClosure {
    pub fn new(
        date: NaiveDate,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
        reason: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            start_time,
            end_time,
            reason,
            created_at: Utc::now(),
        }
    }
}
