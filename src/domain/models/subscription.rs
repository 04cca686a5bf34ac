use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::YearMonth;

/// A user's billing relationship with a named service over a month range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    id: Uuid,
    service_name: String,
    /// Price in minor currency units.
    price: i64,
    user_id: Uuid,
    start_date: YearMonth,
    /// `None` while the subscription is still active.
    end_date: Option<YearMonth>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Builds an unsaved subscription. The id stays nil and the timestamps
    /// stay at the epoch until a repository stores it.
    pub fn new(
        service_name: impl Into<String>,
        price: i64,
        user_id: Uuid,
        start_date: YearMonth,
    ) -> Self {
        Self {
            id: Uuid::nil(),
            service_name: service_name.into(),
            price,
            user_id,
            start_date,
            end_date: None,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }

    pub fn with_end_date(mut self, end_date: Option<YearMonth>) -> Self {
        self.end_date = end_date;
        self
    }

    /// Targets an existing record, for full-replace updates.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Reconstitutes from persisted data (used by adapters).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: Uuid,
        service_name: String,
        price: i64,
        user_id: Uuid,
        start_date: YearMonth,
        end_date: Option<YearMonth>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            service_name,
            price,
            user_id,
            start_date,
            end_date,
            created_at,
            updated_at,
        }
    }

    /// Assigns identity and creation timestamps. Only repositories call this.
    pub fn stamp_created(mut self, id: Uuid, now: DateTime<Utc>) -> Self {
        self.id = id;
        self.created_at = now;
        self.updated_at = now;
        self
    }

    /// Keeps `created_at` from the stored record and refreshes `updated_at`.
    pub fn stamp_updated(mut self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = now;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn start_date(&self) -> YearMonth {
        self.start_date
    }

    pub fn end_date(&self) -> Option<YearMonth> {
        self.end_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_persisted(&self) -> bool {
        !self.id.is_nil()
    }

    pub fn is_active(&self) -> bool {
        self.end_date.is_none()
    }

    pub fn summary(&self) -> String {
        let period = match self.end_date {
            Some(end) => format!("{} to {}", self.start_date, end),
            None => format!("since {}", self.start_date),
        };
        format!("{} ({}, {})", self.service_name, self.price, period)
    }
}
