use anyhow::Result;
use uuid::Uuid;

use crate::{cancellable, CostFilter, YearMonth};

use super::super::Container;

pub struct CostController<'a> {
    container: &'a Container,
}

impl<'a> CostController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn total(
        &self,
        user_id: Option<Uuid>,
        service_name: Option<String>,
        start_date: Option<YearMonth>,
        end_date: Option<YearMonth>,
    ) -> Result<String> {
        let mut filter = CostFilter::new();
        if let Some(user_id) = user_id {
            filter = filter.with_user_id(user_id);
        }
        if let Some(name) = service_name {
            filter = filter.with_service_name(name);
        }
        if let Some(start) = start_date {
            filter = filter.with_start_date(start);
        }
        if let Some(end) = end_date {
            filter = filter.with_end_date(end);
        }

        let service = self.container.subscription_service();
        let total = cancellable(
            &self.container.shutdown_token(),
            service.total_cost(&filter),
        )
        .await?;
        Ok(format!("Total cost: {}", total))
    }
}
