pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{cancellable, SubscriptionRepository, SubscriptionService};

pub use cli::Commands;

pub use connector::{
    CostParam, CostQuery, DuckdbSubscriptionRepository, InMemorySubscriptionRepository,
};

pub use domain::{CostFilter, DomainError, Subscription, YearMonth};
