use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{CostController, ListSubscriptionsController, SubscriptionController};

pub struct Router<'a> {
    subscription_controller: SubscriptionController<'a>,
    list_subscriptions_controller: ListSubscriptionsController<'a>,
    cost_controller: CostController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            subscription_controller: SubscriptionController::new(container),
            list_subscriptions_controller: ListSubscriptionsController::new(container),
            cost_controller: CostController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Create {
                service_name,
                price,
                user_id,
                start_date,
                end_date,
            } => {
                self.subscription_controller
                    .create(service_name, price, user_id, start_date, end_date)
                    .await
            }
            Commands::Get { id } => self.subscription_controller.get(id).await,
            Commands::Update {
                id,
                service_name,
                price,
                user_id,
                start_date,
                end_date,
            } => {
                self.subscription_controller
                    .update(id, service_name, price, user_id, start_date, end_date)
                    .await
            }
            Commands::Delete { id } => self.subscription_controller.delete(id).await,
            Commands::List { limit, offset } => {
                self.list_subscriptions_controller.list(limit, offset).await
            }
            Commands::Cost {
                user_id,
                service_name,
                start_date,
                end_date,
            } => {
                self.cost_controller
                    .total(user_id, service_name, start_date, end_date)
                    .await
            }
            Commands::Serve { .. } => {
                anyhow::bail!("the serve command is handled by the HTTP server, not the router")
            }
        }
    }
}
