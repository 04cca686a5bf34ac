use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CostFilter, DomainError, Subscription};

/// Persistence for subscriptions.
///
/// Implementations assign ids and timestamps, and report a missing row as
/// `DomainError::NotFound` rather than a storage failure.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Stores a new subscription and returns it with id and timestamps set.
    async fn create(&self, subscription: &Subscription) -> Result<Subscription, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>, DomainError>;

    /// Replaces every caller-owned field of an existing row.
    async fn update(&self, subscription: &Subscription) -> Result<Subscription, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;

    /// Newest first, by `created_at`.
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Subscription>, DomainError>;

    /// Sum of `price` over matching rows; 0 when nothing matches.
    async fn total_cost(&self, filter: &CostFilter) -> Result<i64, DomainError>;
}
