//! Postgres repository implementation using Diesel.
//!
//! Referential rules live in the schema: foreign keys cascade on delete
//! (contact references are set null), check constraints reject negative
//! slots and shifts that end before they start, and a unique constraint on
//! `(user_account_id, shift_id)` rejects duplicate sign-ups. Database errors
//! are mapped onto [`RepositoryError`] variants by kind.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::NaiveTime;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::db::repository::{
    ErrorContext, OrganizationRepository, RepositoryError, RepositoryResult, ShiftFilter,
    ShiftHelperRepository, ShiftRepository,
};
use crate::models::*;

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// Unset or unparsable numeric variables fall back to the defaults.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    // Metrics counters
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        log::info!(
            "Postgres repository ready (pool max={}, min={})",
            config.max_pool_size,
            config.min_pool_size
        );

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation on the blocking pool, retrying
    /// retryable failures with exponential backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            log::warn!("{}; retrying", err);
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::warn!("{}; retrying", e);
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }

    pub async fn is_healthy(&self) -> bool {
        self.health_check().await.unwrap_or(false)
    }

    /// Returns `(is_healthy, latency_ms, error_message)`.
    pub async fn health_check_detailed(&self) -> (bool, Option<u64>, Option<String>) {
        let start = Instant::now();
        let result = self.health_check().await;
        let latency = Some(start.elapsed().as_millis() as u64);
        match result {
            Ok(true) => (true, latency, None),
            Ok(false) => (
                false,
                latency,
                Some("Health check returned false".to_string()),
            ),
            Err(e) => (false, latency, Some(e.to_string())),
        }
    }
}

/// Map a diesel error, tagging it with the operation that raised it.
fn db_error(operation: &'static str) -> impl Fn(diesel::result::Error) -> RepositoryError {
    move |err| RepositoryError::from(err).with_operation(operation)
}

fn load_contacts(
    conn: &mut PgConnection,
    ids: &[Option<i64>],
) -> RepositoryResult<HashMap<i64, ContactPerson>> {
    let ids: Vec<i64> = ids.iter().flatten().copied().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = contact_persons::table
        .filter(contact_persons::id.eq_any(ids))
        .select(ContactPersonRow::as_select())
        .load::<ContactPersonRow>(conn)
        .map_err(db_error("load_contacts"))?;
    Ok(rows.into_iter().map(|row| (row.id, row.into())).collect())
}

fn find_shift(conn: &mut PgConnection, op: &'static str, id: ShiftId) -> RepositoryResult<ShiftRow> {
    shifts::table
        .find(id.value())
        .select(ShiftRow::as_select())
        .first::<ShiftRow>(conn)
        .optional()
        .map_err(db_error(op))?
        .ok_or_else(|| RepositoryError::missing(op, "shift", id))
}

fn find_task(conn: &mut PgConnection, op: &'static str, id: i64) -> RepositoryResult<TaskRow> {
    tasks::table
        .find(id)
        .select(TaskRow::as_select())
        .first::<TaskRow>(conn)
        .optional()
        .map_err(db_error(op))?
        .ok_or_else(|| RepositoryError::missing(op, "task", id))
}

fn shift_order() -> (
    diesel::helper_types::Asc<shifts::starting_time>,
    diesel::helper_types::Asc<shifts::ending_time>,
    diesel::helper_types::Asc<shifts::id>,
) {
    (
        shifts::starting_time.asc(),
        shifts::ending_time.asc(),
        shifts::id.asc(),
    )
}

fn validation_error(op: &'static str, err: ShiftValidationError) -> RepositoryError {
    RepositoryError::from(err).with_operation(op)
}

#[async_trait]
impl ShiftRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(db_error("health_check"))
        })
        .await
    }

    async fn store_shift(&self, shift: NewShift) -> RepositoryResult<Shift> {
        shift
            .validate()
            .map_err(|e| validation_error("store_shift", e))?;
        let values = ShiftValuesRow::from(&shift);
        self.with_conn(move |conn| {
            diesel::insert_into(shifts::table)
                .values(&values)
                .returning(ShiftRow::as_returning())
                .get_result::<ShiftRow>(conn)
                .map(Shift::from)
                .map_err(db_error("store_shift"))
        })
        .await
    }

    async fn update_shift(&self, shift: Shift) -> RepositoryResult<Shift> {
        shift
            .validate()
            .map_err(|e| validation_error("update_shift", e).with_entity("shift", shift.id))?;
        let id = shift.id;
        let values = ShiftValuesRow::from(&shift);
        self.with_conn(move |conn| {
            diesel::update(shifts::table.find(id.value()))
                .set(&values)
                .returning(ShiftRow::as_returning())
                .get_result::<ShiftRow>(conn)
                .optional()
                .map_err(db_error("update_shift"))?
                .map(Shift::from)
                .ok_or_else(|| RepositoryError::missing("update_shift", "shift", id))
        })
        .await
    }

    async fn get_shift(&self, shift_id: ShiftId) -> RepositoryResult<Shift> {
        self.with_conn(move |conn| find_shift(conn, "get_shift", shift_id).map(Shift::from))
            .await
    }

    async fn get_shift_detail(&self, shift_id: ShiftId) -> RepositoryResult<ShiftDetail> {
        const OP: &str = "get_shift_detail";
        self.with_conn(move |conn| {
            let shift = find_shift(conn, OP, shift_id)?;
            let task = find_task(conn, OP, shift.task_id)?;
            let facility = facilities::table
                .find(shift.facility_id)
                .select(FacilityRow::as_select())
                .first::<FacilityRow>(conn)
                .map_err(db_error(OP))?;
            let workplace = match shift.workplace_id {
                Some(id) => Some(
                    workplaces::table
                        .find(id)
                        .select(WorkplaceRow::as_select())
                        .first::<WorkplaceRow>(conn)
                        .map_err(db_error(OP))?,
                ),
                None => None,
            };

            let contacts = load_contacts(
                conn,
                &[
                    shift.shift_contact_id,
                    task.shift_contact_id,
                    workplace.as_ref().and_then(|w| w.shift_contact_id),
                    facility.shift_contact_id,
                ],
            )?;
            let contact_for = |id: Option<i64>| id.and_then(|id| contacts.get(&id).cloned());

            let shift_contact = contact_for(shift.shift_contact_id);
            let task_contact = contact_for(task.shift_contact_id);
            let facility_contact = contact_for(facility.shift_contact_id);
            let workplace = workplace.map(|w| {
                let contact = contact_for(w.shift_contact_id);
                Related::new(Workplace::from(w), contact)
            });

            Ok(ShiftDetail {
                shift: shift.into(),
                shift_contact,
                task: Related::new(task.into(), task_contact),
                workplace,
                facility: Related::new(facility.into(), facility_contact),
            })
        })
        .await
    }

    async fn list_shifts(&self, filter: &ShiftFilter) -> RepositoryResult<Vec<Shift>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut query = shifts::table.select(ShiftRow::as_select()).into_boxed();
            if let Some(facility) = filter.facility {
                query = query.filter(shifts::facility_id.eq(facility.value()));
            }
            if let Some(date) = filter.on_date {
                let day_start = date.and_time(NaiveTime::MIN);
                query = query.filter(shifts::ending_time.gt(day_start));
                if let Some(next_day) = date.succ_opt() {
                    query = query
                        .filter(shifts::starting_time.lt(next_day.and_time(NaiveTime::MIN)));
                }
            }
            if let Some(now) = filter.open_at {
                query = query.filter(shifts::ending_time.ge(now));
            }
            query
                .order(shift_order())
                .load::<ShiftRow>(conn)
                .map(|rows| rows.into_iter().map(Shift::from).collect())
                .map_err(db_error("list_shifts"))
        })
        .await
    }

    async fn delete_shift(&self, shift_id: ShiftId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(shifts::table.find(shift_id.value()))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(db_error("delete_shift"))
        })
        .await
    }
}

#[async_trait]
impl ShiftHelperRepository for PostgresRepository {
    async fn join_shift(
        &self,
        user_account_id: UserAccountId,
        shift_id: ShiftId,
    ) -> RepositoryResult<ShiftHelper> {
        let row = NewShiftHelperRow {
            user_account_id: user_account_id.value(),
            shift_id: shift_id.value(),
        };
        self.with_conn(move |conn| {
            diesel::insert_into(shift_helpers::table)
                .values(&row)
                .returning(ShiftHelperRow::as_returning())
                .get_result::<ShiftHelperRow>(conn)
                .map(ShiftHelper::from)
                .map_err(db_error("join_shift"))
        })
        .await
    }

    async fn get_shift_helper(&self, helper_id: ShiftHelperId) -> RepositoryResult<ShiftHelper> {
        self.with_conn(move |conn| {
            shift_helpers::table
                .find(helper_id.value())
                .select(ShiftHelperRow::as_select())
                .first::<ShiftHelperRow>(conn)
                .optional()
                .map_err(db_error("get_shift_helper"))?
                .map(ShiftHelper::from)
                .ok_or_else(|| RepositoryError::missing("get_shift_helper", "shift_helper", helper_id))
        })
        .await
    }

    async fn get_shift_helper_detail(
        &self,
        helper_id: ShiftHelperId,
    ) -> RepositoryResult<ShiftHelperDetail> {
        const OP: &str = "get_shift_helper_detail";
        self.with_conn(move |conn| {
            let helper = shift_helpers::table
                .find(helper_id.value())
                .select(ShiftHelperRow::as_select())
                .first::<ShiftHelperRow>(conn)
                .optional()
                .map_err(db_error(OP))?
                .ok_or_else(|| RepositoryError::missing(OP, "shift_helper", helper_id))?;
            let account = user_accounts::table
                .find(helper.user_account_id)
                .select(UserAccountRow::as_select())
                .first::<UserAccountRow>(conn)
                .map_err(db_error(OP))?;
            let shift = find_shift(conn, OP, ShiftId::new(helper.shift_id))?;
            let task = find_task(conn, OP, shift.task_id)?;
            Ok(ShiftHelperDetail {
                helper: helper.into(),
                user_account: account.into(),
                task: task.into(),
            })
        })
        .await
    }

    async fn list_helpers_for_shift(&self, shift_id: ShiftId) -> RepositoryResult<Vec<ShiftHelper>> {
        self.with_conn(move |conn| {
            shift_helpers::table
                .filter(shift_helpers::shift_id.eq(shift_id.value()))
                .order((shift_helpers::joined_shift_at.asc(), shift_helpers::id.asc()))
                .select(ShiftHelperRow::as_select())
                .load::<ShiftHelperRow>(conn)
                .map(|rows| rows.into_iter().map(ShiftHelper::from).collect())
                .map_err(db_error("list_helpers_for_shift"))
        })
        .await
    }

    async fn list_shifts_for_user(
        &self,
        user_account_id: UserAccountId,
    ) -> RepositoryResult<Vec<Shift>> {
        self.with_conn(move |conn| {
            shifts::table
                .inner_join(shift_helpers::table)
                .filter(shift_helpers::user_account_id.eq(user_account_id.value()))
                .order(shift_order())
                .select(ShiftRow::as_select())
                .load::<ShiftRow>(conn)
                .map(|rows| rows.into_iter().map(Shift::from).collect())
                .map_err(db_error("list_shifts_for_user"))
        })
        .await
    }

    async fn count_helpers(&self, shift_id: ShiftId) -> RepositoryResult<usize> {
        self.with_conn(move |conn| {
            let count = shift_helpers::table
                .filter(shift_helpers::shift_id.eq(shift_id.value()))
                .count()
                .get_result::<i64>(conn)
                .map_err(db_error("count_helpers"))?;
            usize::try_from(count).map_err(|e| {
                RepositoryError::internal_with_context(
                    e.to_string(),
                    ErrorContext::new("count_helpers").with_entity_id(shift_id),
                )
            })
        })
        .await
    }

    async fn leave_shift(
        &self,
        user_account_id: UserAccountId,
        shift_id: ShiftId,
    ) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(
                shift_helpers::table
                    .filter(shift_helpers::user_account_id.eq(user_account_id.value()))
                    .filter(shift_helpers::shift_id.eq(shift_id.value())),
            )
            .execute(conn)
            .map(|n| n > 0)
            .map_err(db_error("leave_shift"))
        })
        .await
    }
}

#[async_trait]
impl OrganizationRepository for PostgresRepository {
    async fn store_contact(&self, contact: NewContactPerson) -> RepositoryResult<ContactPerson> {
        let row = NewContactPersonRow::from(contact);
        self.with_conn(move |conn| {
            diesel::insert_into(contact_persons::table)
                .values(&row)
                .returning(ContactPersonRow::as_returning())
                .get_result::<ContactPersonRow>(conn)
                .map(ContactPerson::from)
                .map_err(db_error("store_contact"))
        })
        .await
    }

    async fn get_contact(&self, contact_id: ContactPersonId) -> RepositoryResult<ContactPerson> {
        self.with_conn(move |conn| {
            contact_persons::table
                .find(contact_id.value())
                .select(ContactPersonRow::as_select())
                .first::<ContactPersonRow>(conn)
                .optional()
                .map_err(db_error("get_contact"))?
                .map(ContactPerson::from)
                .ok_or_else(|| RepositoryError::missing("get_contact", "contact_person", contact_id))
        })
        .await
    }

    async fn delete_contact(&self, contact_id: ContactPersonId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(contact_persons::table.find(contact_id.value()))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(db_error("delete_contact"))
        })
        .await
    }

    async fn store_facility(&self, facility: NewFacility) -> RepositoryResult<Facility> {
        let row = NewFacilityRow::from(facility);
        self.with_conn(move |conn| {
            diesel::insert_into(facilities::table)
                .values(&row)
                .returning(FacilityRow::as_returning())
                .get_result::<FacilityRow>(conn)
                .map(Facility::from)
                .map_err(db_error("store_facility"))
        })
        .await
    }

    async fn get_facility(&self, facility_id: FacilityId) -> RepositoryResult<Facility> {
        self.with_conn(move |conn| {
            facilities::table
                .find(facility_id.value())
                .select(FacilityRow::as_select())
                .first::<FacilityRow>(conn)
                .optional()
                .map_err(db_error("get_facility"))?
                .map(Facility::from)
                .ok_or_else(|| RepositoryError::missing("get_facility", "facility", facility_id))
        })
        .await
    }

    async fn list_facilities(&self) -> RepositoryResult<Vec<Facility>> {
        self.with_conn(|conn| {
            facilities::table
                .order((facilities::name.asc(), facilities::id.asc()))
                .select(FacilityRow::as_select())
                .load::<FacilityRow>(conn)
                .map(|rows| rows.into_iter().map(Facility::from).collect())
                .map_err(db_error("list_facilities"))
        })
        .await
    }

    async fn delete_facility(&self, facility_id: FacilityId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(facilities::table.find(facility_id.value()))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(db_error("delete_facility"))
        })
        .await
    }

    async fn store_workplace(&self, workplace: NewWorkplace) -> RepositoryResult<Workplace> {
        let row = NewWorkplaceRow::from(workplace);
        self.with_conn(move |conn| {
            diesel::insert_into(workplaces::table)
                .values(&row)
                .returning(WorkplaceRow::as_returning())
                .get_result::<WorkplaceRow>(conn)
                .map(Workplace::from)
                .map_err(db_error("store_workplace"))
        })
        .await
    }

    async fn get_workplace(&self, workplace_id: WorkplaceId) -> RepositoryResult<Workplace> {
        self.with_conn(move |conn| {
            workplaces::table
                .find(workplace_id.value())
                .select(WorkplaceRow::as_select())
                .first::<WorkplaceRow>(conn)
                .optional()
                .map_err(db_error("get_workplace"))?
                .map(Workplace::from)
                .ok_or_else(|| RepositoryError::missing("get_workplace", "workplace", workplace_id))
        })
        .await
    }

    async fn delete_workplace(&self, workplace_id: WorkplaceId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(workplaces::table.find(workplace_id.value()))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(db_error("delete_workplace"))
        })
        .await
    }

    async fn store_task(&self, task: NewTask) -> RepositoryResult<Task> {
        let row = NewTaskRow::from(task);
        self.with_conn(move |conn| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(conn)
                .map(Task::from)
                .map_err(db_error("store_task"))
        })
        .await
    }

    async fn get_task(&self, task_id: TaskId) -> RepositoryResult<Task> {
        self.with_conn(move |conn| find_task(conn, "get_task", task_id.value()).map(Task::from))
            .await
    }

    async fn delete_task(&self, task_id: TaskId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(tasks::table.find(task_id.value()))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(db_error("delete_task"))
        })
        .await
    }

    async fn store_user_account(&self, account: NewUserAccount) -> RepositoryResult<UserAccount> {
        if account.username.trim().is_empty() {
            return Err(RepositoryError::validation_with_context(
                "username must not be empty",
                ErrorContext::new("store_user_account").with_entity("user_account"),
            ));
        }
        let row = NewUserAccountRow::from(account);
        self.with_conn(move |conn| {
            diesel::insert_into(user_accounts::table)
                .values(&row)
                .returning(UserAccountRow::as_returning())
                .get_result::<UserAccountRow>(conn)
                .map(UserAccount::from)
                .map_err(db_error("store_user_account"))
        })
        .await
    }

    async fn get_user_account(&self, account_id: UserAccountId) -> RepositoryResult<UserAccount> {
        self.with_conn(move |conn| {
            user_accounts::table
                .find(account_id.value())
                .select(UserAccountRow::as_select())
                .first::<UserAccountRow>(conn)
                .optional()
                .map_err(db_error("get_user_account"))?
                .map(UserAccount::from)
                .ok_or_else(|| {
                    RepositoryError::missing("get_user_account", "user_account", account_id)
                })
        })
        .await
    }

    async fn delete_user_account(&self, account_id: UserAccountId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(user_accounts::table.find(account_id.value()))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(db_error("delete_user_account"))
        })
        .await
    }
}
