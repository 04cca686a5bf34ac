pub mod cost_controller;
pub mod list_subscriptions_controller;
pub mod subscription_controller;

pub use cost_controller::CostController;
pub use list_subscriptions_controller::ListSubscriptionsController;
pub use subscription_controller::SubscriptionController;
