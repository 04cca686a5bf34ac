use anyhow::Result;

use crate::{cancellable, Subscription};

use super::super::Container;
use super::subscription_controller::format_subscription;

pub struct ListSubscriptionsController<'a> {
    container: &'a Container,
}

impl<'a> ListSubscriptionsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<String> {
        let service = self.container.subscription_service();
        let subscriptions = cancellable(
            &self.container.shutdown_token(),
            service.list(limit, offset),
        )
        .await?;
        Ok(self.format_subscription_list(&subscriptions))
    }

    fn format_subscription_list(&self, subscriptions: &[Subscription]) -> String {
        if subscriptions.is_empty() {
            return "No subscriptions found.".to_string();
        }

        let mut output = format!("Subscriptions ({}):\n\n", subscriptions.len());
        for subscription in subscriptions {
            output.push_str(&format_subscription(subscription));
            output.push('\n');
        }

        output
    }
}
