use anyhow::Result;
use uuid::Uuid;

use crate::{cancellable, Subscription, YearMonth};

use super::super::Container;

pub struct SubscriptionController<'a> {
    container: &'a Container,
}

impl<'a> SubscriptionController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn create(
        &self,
        service_name: String,
        price: i64,
        user_id: Uuid,
        start_date: YearMonth,
        end_date: Option<YearMonth>,
    ) -> Result<String> {
        let subscription =
            Subscription::new(service_name, price, user_id, start_date).with_end_date(end_date);
        let service = self.container.subscription_service();
        let created = cancellable(
            &self.container.shutdown_token(),
            service.create(subscription),
        )
        .await?;

        Ok(format!(
            "Created subscription {}\n\n{}",
            created.id(),
            format_subscription(&created)
        ))
    }

    pub async fn get(&self, id: Uuid) -> Result<String> {
        let service = self.container.subscription_service();
        let subscription =
            cancellable(&self.container.shutdown_token(), service.get_by_id(id)).await?;
        Ok(format_subscription(&subscription))
    }

    pub async fn update(
        &self,
        id: Uuid,
        service_name: String,
        price: i64,
        user_id: Uuid,
        start_date: YearMonth,
        end_date: Option<YearMonth>,
    ) -> Result<String> {
        let subscription = Subscription::new(service_name, price, user_id, start_date)
            .with_end_date(end_date)
            .with_id(id);
        let service = self.container.subscription_service();
        let updated = cancellable(
            &self.container.shutdown_token(),
            service.update(subscription),
        )
        .await?;

        Ok(format!(
            "Updated subscription {}\n\n{}",
            updated.id(),
            format_subscription(&updated)
        ))
    }

    pub async fn delete(&self, id: Uuid) -> Result<String> {
        let service = self.container.subscription_service();
        cancellable(&self.container.shutdown_token(), service.delete(id)).await?;
        Ok("Subscription deleted successfully.".to_string())
    }
}

pub(crate) fn format_subscription(subscription: &Subscription) -> String {
    let mut output = format!(
        "  {} ({})\n",
        subscription.service_name(),
        subscription.id()
    );
    output.push_str(&format!("    User:   {}\n", subscription.user_id()));
    output.push_str(&format!("    Price:  {}\n", subscription.price()));
    let end = subscription
        .end_date()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "active".to_string());
    output.push_str(&format!(
        "    Period: {} .. {}\n",
        subscription.start_date(),
        end
    ));
    output.push_str(&format!(
        "    Created: {}, Updated: {}\n",
        subscription.created_at().to_rfc3339(),
        subscription.updated_at().to_rfc3339()
    ));
    output
}
