use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Subscription, YearMonth};

/// Optional predicates for the total cost query, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostFilter {
    user_id: Option<Uuid>,
    service_name: Option<String>,
    start_date: Option<YearMonth>,
    end_date: Option<YearMonth>,
}

impl CostFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Case-insensitive substring match on the service name.
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    /// Keeps subscriptions starting in or after this month.
    pub fn with_start_date(mut self, start_date: YearMonth) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Keeps subscriptions ending in or before this month, plus open-ended ones.
    pub fn with_end_date(mut self, end_date: YearMonth) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    pub fn start_date(&self) -> Option<YearMonth> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<YearMonth> {
        self.end_date
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.service_name.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// In-process evaluation of the same predicates the SQL store applies.
    pub fn matches(&self, subscription: &Subscription) -> bool {
        if let Some(user_id) = self.user_id {
            if subscription.user_id() != user_id {
                return false;
            }
        }

        if let Some(ref needle) = self.service_name {
            let haystack = subscription.service_name().to_lowercase();
            if !haystack.contains(&needle.to_lowercase()) {
                return false;
            }
        }

        if let Some(start) = self.start_date {
            if subscription.start_date() < start {
                return false;
            }
        }

        if let Some(end) = self.end_date {
            // Open-ended subscriptions satisfy any upper bound.
            if let Some(sub_end) = subscription.end_date() {
                if sub_end > end {
                    return false;
                }
            }
        }

        true
    }
}
