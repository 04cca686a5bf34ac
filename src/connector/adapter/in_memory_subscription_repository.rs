use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::application::SubscriptionRepository;
use crate::domain::{CostFilter, DomainError, Subscription};

/// Non-durable subscription storage for tests and `--memory-storage` runs.
pub struct InMemorySubscriptionRepository {
    subscriptions: Arc<Mutex<HashMap<Uuid, Subscription>>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self {
            subscriptions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySubscriptionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(&self, subscription: &Subscription) -> Result<Subscription, DomainError> {
        let created = subscription
            .clone()
            .stamp_created(Uuid::new_v4(), Utc::now());

        let mut subscriptions = self.subscriptions.lock().await;
        subscriptions.insert(created.id(), created.clone());
        debug!("Stored subscription {} in memory", created.id());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>, DomainError> {
        let subscriptions = self.subscriptions.lock().await;
        Ok(subscriptions.get(&id).cloned())
    }

    async fn update(&self, subscription: &Subscription) -> Result<Subscription, DomainError> {
        let mut subscriptions = self.subscriptions.lock().await;
        let existing = subscriptions.get_mut(&subscription.id()).ok_or_else(|| {
            DomainError::not_found(format!("Subscription not found: {}", subscription.id()))
        })?;

        let updated = subscription
            .clone()
            .stamp_updated(existing.created_at(), Utc::now());
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut subscriptions = self.subscriptions.lock().await;
        subscriptions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(format!("Subscription not found: {}", id)))
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Subscription>, DomainError> {
        let subscriptions = self.subscriptions.lock().await;

        let mut all: Vec<&Subscription> = subscriptions.values().collect();
        // Newest first, id as tie-break to keep pages stable
        all.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        });

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(all.into_iter().skip(offset).take(limit).cloned().collect())
    }

    async fn total_cost(&self, filter: &CostFilter) -> Result<i64, DomainError> {
        let subscriptions = self.subscriptions.lock().await;
        subscriptions
            .values()
            .filter(|s| filter.matches(s))
            .try_fold(0i64, |acc, s| acc.checked_add(s.price()))
            .ok_or_else(|| {
                DomainError::storage("Failed to compute total cost: sum out of range for BIGINT")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::YearMonth;

    fn sample(name: &str, price: i64) -> Subscription {
        Subscription::new(name, price, Uuid::new_v4(), YearMonth::new(2024, 1).unwrap())
    }

    #[tokio::test]
    async fn test_create_assigns_identity() {
        let repo = InMemorySubscriptionRepository::new();
        let created = repo.create(&sample("Netflix", 999)).await.unwrap();

        assert!(created.is_persisted());
        assert_eq!(created.created_at(), created.updated_at());
        assert_eq!(repo.find_by_id(created.id()).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_report_not_found() {
        let repo = InMemorySubscriptionRepository::new();
        let ghost = sample("Ghost", 1).with_id(Uuid::new_v4());

        assert!(repo.update(&ghost).await.unwrap_err().is_not_found());
        assert!(repo.delete(ghost.id()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let repo = InMemorySubscriptionRepository::new();
        let created = repo.create(&sample("Netflix", 999)).await.unwrap();

        let replacement = sample("Netflix 4K", 1499).with_id(created.id());
        let updated = repo.update(&replacement).await.unwrap();

        assert_eq!(updated.created_at(), created.created_at());
        assert!(updated.updated_at() >= created.updated_at());
        assert_eq!(updated.price(), 1499);
    }

    #[tokio::test]
    async fn test_list_pages_newest_first() {
        let repo = InMemorySubscriptionRepository::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(repo.create(&sample(&format!("s{}", i), 1)).await.unwrap());
        }

        let all = repo.list(10, 0).await.unwrap();
        assert_eq!(all.len(), 5);
        for pair in all.windows(2) {
            assert!(pair[0].created_at() >= pair[1].created_at());
        }

        let page = repo.list(2, 1).await.unwrap();
        assert_eq!(page, all[1..3].to_vec());
        assert!(repo.list(10, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_total_cost_overflow_is_a_storage_error() {
        let repo = InMemorySubscriptionRepository::new();
        repo.create(&sample("a", i64::MAX)).await.unwrap();
        repo.create(&sample("b", i64::MAX)).await.unwrap();

        let err = repo.total_cost(&CostFilter::new()).await.unwrap_err();
        assert!(err.is_storage_error(), "got {:?}", err);

        let one = repo
            .total_cost(&CostFilter::new().with_service_name("a"))
            .await
            .unwrap();
        assert_eq!(one, i64::MAX);
    }
}
