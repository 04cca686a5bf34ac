use chrono::NaiveDate;
use duckdb::types::ToSqlOutput;
use duckdb::ToSql;

use crate::domain::{CostFilter, DomainError, YearMonth};

/// A bound parameter of the cost query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostParam {
    Text(String),
    Date(NaiveDate),
}

impl ToSql for CostParam {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        match self {
            CostParam::Text(s) => s.to_sql(),
            CostParam::Date(d) => d.to_sql(),
        }
    }
}

/// The aggregate cost statement with its positional parameters.
///
/// Predicates are appended in a fixed order (user_id, service_name,
/// start_date, end_date) and each one is present iff its filter field is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostQuery {
    predicates: Vec<&'static str>,
    params: Vec<CostParam>,
}

impl CostQuery {
    const BASE: &'static str =
        "SELECT CAST(COALESCE(SUM(price), 0) AS BIGINT) FROM subscriptions";

    pub fn from_filter(filter: &CostFilter) -> Result<Self, DomainError> {
        let mut query = Self {
            predicates: Vec::new(),
            params: Vec::new(),
        };

        if let Some(user_id) = filter.user_id() {
            query.push("user_id = ?", CostParam::Text(user_id.to_string()));
        }

        if let Some(name) = filter.service_name() {
            query.push(
                "service_name ILIKE ? ESCAPE '\\'",
                CostParam::Text(format!("%{}%", escape_like(name))),
            );
        }

        if let Some(start) = filter.start_date() {
            query.push("start_date >= ?", CostParam::Date(month_to_date(start)?));
        }

        if let Some(end) = filter.end_date() {
            // Open-ended subscriptions satisfy any upper bound.
            query.push(
                "(end_date IS NULL OR end_date <= ?)",
                CostParam::Date(month_to_date(end)?),
            );
        }

        Ok(query)
    }

    fn push(&mut self, predicate: &'static str, param: CostParam) {
        self.predicates.push(predicate);
        self.params.push(param);
    }

    pub fn sql(&self) -> String {
        if self.predicates.is_empty() {
            Self::BASE.to_string()
        } else {
            format!("{} WHERE {}", Self::BASE, self.predicates.join(" AND "))
        }
    }

    pub fn params(&self) -> &[CostParam] {
        &self.params
    }
}

fn month_to_date(month: YearMonth) -> Result<NaiveDate, DomainError> {
    month
        .first_day()
        .ok_or_else(|| DomainError::invalid_input("cost filter month is not set"))
}

/// Escapes LIKE wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn month(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_empty_filter_has_no_where_clause() {
        let query = CostQuery::from_filter(&CostFilter::new()).unwrap();
        assert_eq!(
            query.sql(),
            "SELECT CAST(COALESCE(SUM(price), 0) AS BIGINT) FROM subscriptions"
        );
        assert!(query.params().is_empty());
    }

    #[test]
    fn test_all_predicates_in_fixed_order() {
        let user = Uuid::new_v4();
        let filter = CostFilter::new()
            .with_end_date(month(2024, 6))
            .with_service_name("net")
            .with_start_date(month(2024, 1))
            .with_user_id(user);

        let query = CostQuery::from_filter(&filter).unwrap();
        assert_eq!(
            query.sql(),
            "SELECT CAST(COALESCE(SUM(price), 0) AS BIGINT) FROM subscriptions WHERE \
             user_id = ? AND service_name ILIKE ? ESCAPE '\\' AND start_date >= ? \
             AND (end_date IS NULL OR end_date <= ?)"
        );
        assert_eq!(
            query.params(),
            &[
                CostParam::Text(user.to_string()),
                CostParam::Text("%net%".to_string()),
                CostParam::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                CostParam::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
            ]
        );
    }

    #[test]
    fn test_single_predicates() {
        let query = CostQuery::from_filter(&CostFilter::new().with_start_date(month(2024, 2)))
            .unwrap();
        assert!(query.sql().ends_with("WHERE start_date >= ?"));
        assert_eq!(query.params().len(), 1);

        let query =
            CostQuery::from_filter(&CostFilter::new().with_end_date(month(2024, 2))).unwrap();
        assert!(query
            .sql()
            .ends_with("WHERE (end_date IS NULL OR end_date <= ?)"));
        assert_eq!(query.params().len(), 1);
    }

    #[test]
    fn test_service_name_wildcards_are_escaped() {
        let query =
            CostQuery::from_filter(&CostFilter::new().with_service_name("50%_off\\")).unwrap();
        assert_eq!(
            query.params(),
            &[CostParam::Text("%50\\%\\_off\\\\%".to_string())]
        );
    }
}
