use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::SubscriptionRepository;
use crate::domain::{CostFilter, DomainError, Subscription};

pub const DEFAULT_LIST_LIMIT: u64 = 10;

/// One page of a listing together with the window it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionPage {
    pub items: Vec<Subscription>,
    pub limit: u64,
    pub offset: u64,
}

/// Enforces subscription invariants before delegating to the repository.
///
/// Holds no state of its own, so one instance can be shared across tasks.
pub struct SubscriptionService {
    subscription_repo: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionService {
    pub fn new(subscription_repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscription_repo }
    }

    pub async fn create(&self, subscription: Subscription) -> Result<Subscription, DomainError> {
        Self::validate_fields(&subscription)?;

        let created = self.subscription_repo.create(&subscription).await?;
        info!(
            "Created subscription {} for user {}: {}",
            created.id(),
            created.user_id(),
            created.summary()
        );
        Ok(created)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Subscription, DomainError> {
        Self::require_id(id)?;
        debug!("Fetching subscription {}", id);

        self.subscription_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Subscription not found: {}", id)))
    }

    /// Full replace of the caller-owned fields; not a partial patch.
    pub async fn update(&self, subscription: Subscription) -> Result<Subscription, DomainError> {
        Self::require_id(subscription.id())?;
        Self::validate_fields(&subscription)?;

        let updated = self.subscription_repo.update(&subscription).await?;
        info!("Updated subscription {}", updated.id());
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        Self::require_id(id)?;

        self.subscription_repo.delete(id).await?;
        info!("Deleted subscription {}", id);
        Ok(())
    }

    /// Lists newest first. Bad pagination input is clamped, never rejected.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Subscription>, DomainError> {
        Ok(self.list_page(limit, offset).await?.items)
    }

    /// Same as [`list`](Self::list), also reporting the clamped window used.
    pub async fn list_page(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<SubscriptionPage, DomainError> {
        let (limit, offset) = normalize_page(limit, offset);
        debug!("Listing subscriptions (limit={}, offset={})", limit, offset);

        let items = self.subscription_repo.list(limit, offset).await?;
        Ok(SubscriptionPage {
            items,
            limit,
            offset,
        })
    }

    pub async fn total_cost(&self, filter: &CostFilter) -> Result<i64, DomainError> {
        debug!("Computing total cost for {:?}", filter);
        self.subscription_repo.total_cost(filter).await
    }

    fn require_id(id: Uuid) -> Result<(), DomainError> {
        if id.is_nil() {
            warn!("Rejected subscription request without id");
            return Err(DomainError::validation("id", "id is required"));
        }
        Ok(())
    }

    fn validate_fields(subscription: &Subscription) -> Result<(), DomainError> {
        let result = if subscription.service_name().is_empty() {
            Err(DomainError::validation("service_name", "service_name is required"))
        } else if subscription.price() <= 0 {
            Err(DomainError::validation("price", "price must be positive"))
        } else if subscription.user_id().is_nil() {
            Err(DomainError::validation("user_id", "user_id is required"))
        } else if subscription.start_date().is_zero() {
            Err(DomainError::validation("start_date", "start_date is required"))
        } else {
            Ok(())
        };

        if let Err(ref e) = result {
            warn!("Rejected subscription: {}", e);
        }
        result
    }
}

/// Non-positive limits fall back to the default; negative offsets become 0.
pub fn normalize_page(limit: i64, offset: i64) -> (u64, u64) {
    let limit = if limit <= 0 {
        DEFAULT_LIST_LIMIT
    } else {
        limit as u64
    };
    let offset = offset.max(0) as u64;
    (limit, offset)
}
