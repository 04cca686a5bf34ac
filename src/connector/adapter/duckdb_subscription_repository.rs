use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use duckdb::{params, params_from_iter, Connection, InterruptHandle, Row};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::CostQuery;
use crate::application::SubscriptionRepository;
use crate::domain::{CostFilter, DomainError, Subscription, YearMonth};

const SELECT_COLUMNS: &str = "SELECT id, service_name, price, user_id, start_date, end_date, \
                              created_at, updated_at FROM subscriptions";

pub struct DuckdbSubscriptionRepository {
    conn: Arc<Mutex<Connection>>,
    interrupt: Arc<InterruptHandle>,
}

/// Interrupts the running statement unless disarmed first.
///
/// Held across the blocking call so that dropping the caller's future
/// (cancellation) aborts the statement instead of letting it run on.
struct InterruptOnDrop {
    handle: Option<Arc<InterruptHandle>>,
}

impl InterruptOnDrop {
    fn disarm(mut self) {
        self.handle = None;
    }
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Interrupting in-flight DuckDB statement");
            handle.interrupt();
        }
    }
}

impl DuckdbSubscriptionRepository {
    pub fn new(db_path: &Path) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::storage(format!("Failed to open DuckDB database: {}", e)))?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DomainError::storage(format!("Failed to open DuckDB in-memory DB: {}", e))
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, DomainError> {
        Self::initialize_schema(&conn)?;
        let interrupt = conn.interrupt_handle();

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            interrupt,
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DomainError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS subscriptions (
                id TEXT PRIMARY KEY,
                service_name TEXT NOT NULL,
                price BIGINT NOT NULL,
                user_id TEXT NOT NULL,
                start_date DATE NOT NULL,
                end_date DATE,
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_subscriptions_user
            ON subscriptions(user_id);
            "#,
        )
        .map_err(|e| DomainError::storage(format!("Failed to initialize schema: {}", e)))?;

        debug!("DuckDB subscriptions schema initialized");
        Ok(())
    }

    /// Runs `op` against the connection on the blocking pool.
    ///
    /// The connection lock is held until the statement finishes. If the
    /// returned future is dropped first, the statement is interrupted.
    async fn run<T, F>(&self, op: F) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, DomainError> + Send + 'static,
    {
        let conn = self.conn.clone().lock_owned().await;
        let guard = InterruptOnDrop {
            handle: Some(self.interrupt.clone()),
        };

        let result = tokio::task::spawn_blocking(move || op(&conn))
            .await
            .map_err(|e| DomainError::storage(format!("DuckDB task failed: {}", e)))?;

        guard.disarm();
        result
    }

    fn row_to_subscription(row: &Row<'_>) -> duckdb::Result<Subscription> {
        let id: String = row.get(0)?;
        let user_id: String = row.get(3)?;
        let start_date: NaiveDate = row.get(4)?;
        let end_date: Option<NaiveDate> = row.get(5)?;

        Ok(Subscription::reconstitute(
            parse_uuid(&id, 0)?,
            row.get(1)?,
            row.get(2)?,
            parse_uuid(&user_id, 3)?,
            YearMonth::from(start_date),
            end_date.map(YearMonth::from),
            from_micros(row.get(6)?, 6)?,
            from_micros(row.get(7)?, 7)?,
        ))
    }
}

fn parse_uuid(raw: &str, column: usize) -> duckdb::Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| {
        duckdb::Error::FromSqlConversionFailure(column, duckdb::types::Type::Text, Box::new(e))
    })
}

fn to_micros(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

fn from_micros(micros: i64, column: usize) -> duckdb::Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        duckdb::Error::FromSqlConversionFailure(
            column,
            duckdb::types::Type::BigInt,
            format!("timestamp out of range: {} micros", micros).into(),
        )
    })
}

/// Current time truncated to the precision stored in the table.
fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn month_to_date(month: YearMonth, field: &'static str) -> Result<NaiveDate, DomainError> {
    month
        .first_day()
        .ok_or_else(|| DomainError::validation(field, format!("{} is required", field)))
}

/// Maps a driver error, reporting interrupted statements as cancellations.
fn db_error(context: &'static str) -> impl Fn(duckdb::Error) -> DomainError {
    move |e| {
        if e.to_string().contains("Interrupted") {
            DomainError::Cancelled
        } else {
            DomainError::storage(format!("{}: {}", context, e))
        }
    }
}

#[async_trait]
impl SubscriptionRepository for DuckdbSubscriptionRepository {
    async fn create(&self, subscription: &Subscription) -> Result<Subscription, DomainError> {
        let created = subscription
            .clone()
            .stamp_created(Uuid::new_v4(), now_micros());
        let start_date = month_to_date(created.start_date(), "start_date")?;
        let end_date = created
            .end_date()
            .map(|m| month_to_date(m, "end_date"))
            .transpose()?;

        let row = created.clone();
        self.run(move |conn| {
            conn.execute(
                r#"
                INSERT INTO subscriptions (id, service_name, price, user_id, start_date, end_date, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    row.id().to_string(),
                    row.service_name(),
                    row.price(),
                    row.user_id().to_string(),
                    start_date,
                    end_date,
                    to_micros(row.created_at()),
                    to_micros(row.updated_at()),
                ],
            )
            .map_err(db_error("Failed to create subscription"))
        })
        .await?;

        debug!("Inserted subscription {}", created.id());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>, DomainError> {
        self.run(move |conn| {
            let mut stmt = conn
                .prepare(&format!("{} WHERE id = ?1", SELECT_COLUMNS))
                .map_err(db_error("Failed to prepare statement"))?;

            match stmt.query_row(params![id.to_string()], Self::row_to_subscription) {
                Ok(subscription) => Ok(Some(subscription)),
                Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(db_error("Failed to query subscription")(e)),
            }
        })
        .await
    }

    async fn update(&self, subscription: &Subscription) -> Result<Subscription, DomainError> {
        let now = now_micros();
        let start_date = month_to_date(subscription.start_date(), "start_date")?;
        let end_date = subscription
            .end_date()
            .map(|m| month_to_date(m, "end_date"))
            .transpose()?;

        let row = subscription.clone();
        let created_at = self
            .run(move |conn| {
                let mut stmt = conn
                    .prepare(
                        r#"
                        UPDATE subscriptions
                        SET service_name = ?2, price = ?3, user_id = ?4, start_date = ?5, end_date = ?6, updated_at = ?7
                        WHERE id = ?1
                        RETURNING created_at
                        "#,
                    )
                    .map_err(db_error("Failed to prepare statement"))?;

                let result = stmt.query_row(
                    params![
                        row.id().to_string(),
                        row.service_name(),
                        row.price(),
                        row.user_id().to_string(),
                        start_date,
                        end_date,
                        to_micros(now),
                    ],
                    |r| from_micros(r.get(0)?, 0),
                );

                match result {
                    Ok(created_at) => Ok(created_at),
                    Err(duckdb::Error::QueryReturnedNoRows) => Err(DomainError::not_found(
                        format!("Subscription not found: {}", row.id()),
                    )),
                    Err(e) => Err(db_error("Failed to update subscription")(e)),
                }
            })
            .await?;

        debug!("Updated subscription {}", subscription.id());
        Ok(subscription.clone().stamp_updated(created_at, now))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let affected = self
            .run(move |conn| {
                conn.execute("DELETE FROM subscriptions WHERE id = ?1", params![id.to_string()])
                    .map_err(db_error("Failed to delete subscription"))
            })
            .await?;

        if affected == 0 {
            return Err(DomainError::not_found(format!(
                "Subscription not found: {}",
                id
            )));
        }

        debug!("Deleted subscription {}", id);
        Ok(())
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Subscription>, DomainError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        self.run(move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "{} ORDER BY created_at DESC, id LIMIT ?1 OFFSET ?2",
                    SELECT_COLUMNS
                ))
                .map_err(db_error("Failed to prepare statement"))?;

            let rows = stmt
                .query_map(params![limit, offset], Self::row_to_subscription)
                .map_err(db_error("Failed to query subscriptions"))?;

            let mut subscriptions = Vec::new();
            for row in rows {
                subscriptions.push(row.map_err(db_error("Failed to read row"))?);
            }
            Ok(subscriptions)
        })
        .await
    }

    async fn total_cost(&self, filter: &CostFilter) -> Result<i64, DomainError> {
        let query = CostQuery::from_filter(filter)?;
        debug!("Cost query: {}", query.sql());

        self.run(move |conn| {
            let mut stmt = conn
                .prepare(&query.sql())
                .map_err(db_error("Failed to prepare statement"))?;

            stmt.query_row(params_from_iter(query.params()), |row| row.get::<_, i64>(0))
                .map_err(db_error("Failed to compute total cost"))
        })
        .await
    }
}
