use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CostFilter, DomainError, Subscription, YearMonth};

/// Body of `POST /api/subscriptions` and `PUT /api/subscriptions/{id}`.
///
/// Name and price default so the service reports them as validation errors
/// instead of the JSON layer rejecting the body.
#[derive(Debug, Deserialize)]
pub struct SubscriptionRequest {
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub price: i64,
    pub user_id: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl SubscriptionRequest {
    pub fn into_model(self) -> Result<Subscription, DomainError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DomainError::invalid_input(format!("invalid user_id format: {}", e)))?;
        let start_date = parse_month("start_date", &self.start_date)?;
        let end_date = self
            .end_date
            .as_deref()
            .map(|raw| parse_month("end_date", raw))
            .transpose()?;

        Ok(Subscription::new(self.service_name, self.price, user_id, start_date)
            .with_end_date(end_date))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(subscription: Subscription) -> Self {
        Self {
            id: subscription.id().to_string(),
            service_name: subscription.service_name().to_string(),
            price: subscription.price(),
            user_id: subscription.user_id().to_string(),
            start_date: subscription.start_date().to_string(),
            end_date: subscription.end_date().map(|m| m.to_string()),
            created_at: subscription.created_at().to_rfc3339(),
            updated_at: subscription.updated_at().to_rfc3339(),
        }
    }
}

/// Raw pagination query; unparsable values fall back to the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListParams {
    pub fn limit(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn offset(&self) -> i64 {
        self.offset
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListSubscriptionsResponse {
    pub items: Vec<SubscriptionResponse>,
    pub limit: u64,
    pub offset: u64,
    /// Number of items in this page.
    pub total: usize,
}

/// Query of `GET /api/subscriptions/cost`. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct CostParams {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl CostParams {
    pub fn into_filter(self) -> Result<CostFilter, DomainError> {
        let mut filter = CostFilter::new();

        if let Some(raw) = non_empty(self.user_id) {
            let user_id = Uuid::parse_str(&raw)
                .map_err(|_| DomainError::invalid_input("invalid user_id format"))?;
            filter = filter.with_user_id(user_id);
        }
        if let Some(name) = non_empty(self.service_name) {
            filter = filter.with_service_name(name);
        }
        if let Some(raw) = non_empty(self.start_date) {
            filter = filter.with_start_date(parse_month("start_date", &raw)?);
        }
        if let Some(raw) = non_empty(self.end_date) {
            filter = filter.with_end_date(parse_month("end_date", &raw)?);
        }

        Ok(filter)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CostResponse {
    pub total_cost: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_month(field: &str, raw: &str) -> Result<YearMonth, DomainError> {
    YearMonth::parse_mm_yyyy(raw).map_err(|_| {
        DomainError::invalid_input(format!("invalid {} format, expected MM-YYYY", field))
    })
}
