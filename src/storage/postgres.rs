//! PostgreSQL storage backend using sqlx.
//!
//! Provides [`PostgresStore`], which implements every persistence port on top
//! of a `sqlx::PgPool`. Each record type lives in its own table (see
//! `migrations/`); enumerations are stored as their canonical strings and the
//! expense lifecycle as a nullable `deleted_at` column.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! crewbook = { version = "0.1", features = ["postgres"] }
//! ```

use crate::core::codec::UnknownVariant;
use crate::core::entity::{ChildRecord, Entity, RecordId};
use crate::core::error::StorageError;
use crate::core::model::{
    Attendance, Customer, Earning, Expense, Job, Lifecycle, Material, Personnel, PersonnelPayment,
    User,
};
use crate::core::service::{
    AttendanceQuery, AttendanceStore, ChildStore, ChildTransaction, DataService, ExpenseStore,
    LifecycleFilter, NameDirectory, StoreResult, UserStore,
};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::str::FromStr;

const BACKEND: &str = "PostgreSQL";

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Map a sqlx failure onto the port's error classes
fn storage_error(context: &str, err: sqlx::Error) -> StorageError {
    let message = format!("{}: {}", context, err);
    match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StorageError::ConnectionError {
            backend: BACKEND.to_string(),
            message,
        },
        sqlx::Error::Database(db_err)
            if matches!(db_err.code().as_deref(), Some("23503") | Some("23505")) =>
        {
            StorageError::IntegrityError { message }
        }
        _ => StorageError::QueryError {
            backend: BACKEND.to_string(),
            message,
        },
    }
}

/// Like [`storage_error`], but failures to open or finish a transaction that
/// are not connection faults report as transaction errors
fn transaction_error(context: &str, err: sqlx::Error) -> StorageError {
    match storage_error(context, err) {
        StorageError::QueryError { message, .. } => StorageError::TransactionError { message },
        other => other,
    }
}

fn decode_enum<E>(row: &PgRow, column: &str) -> Result<E, sqlx::Error>
where
    E: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn decode_optional_enum<E>(row: &PgRow, column: &str) -> Result<Option<E>, sqlx::Error>
where
    E: FromStr<Err = UnknownVariant>,
{
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|value| value.parse())
        .transpose()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Column layout of one table
///
/// `COLUMNS` excludes `id` and lists columns in the order `bind_columns`
/// binds them.
pub trait PgRecord: Entity {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;

    fn select_sql(filter: &str) -> String {
        format!(
            "SELECT id, {} FROM {} {}",
            Self::COLUMNS.join(", "),
            Self::TABLE,
            filter
        )
    }

    fn insert_sql() -> String {
        let placeholders: Vec<String> = (1..=Self::COLUMNS.len()).map(|i| format!("${}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING id, {}",
            Self::TABLE,
            Self::COLUMNS.join(", "),
            placeholders.join(", "),
            Self::COLUMNS.join(", ")
        )
    }

    fn update_sql() -> String {
        let assignments: Vec<String> = Self::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ${}", column, i + 1))
            .collect();
        format!(
            "UPDATE {} SET {} WHERE id = ${} RETURNING id, {}",
            Self::TABLE,
            assignments.join(", "),
            Self::COLUMNS.len() + 1,
            Self::COLUMNS.join(", ")
        )
    }
}

impl PgRecord for Customer {
    const TABLE: &'static str = "customers";
    const COLUMNS: &'static [&'static str] = &["name", "contact_info", "address", "job_description"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            contact_info: row.try_get("contact_info")?,
            address: row.try_get("address")?,
            job_description: row.try_get("job_description")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.name.as_str())
            .bind(self.contact_info.as_deref())
            .bind(self.address.as_deref())
            .bind(self.job_description.as_deref())
    }
}

impl PgRecord for Personnel {
    const TABLE: &'static str = "personnel";
    const COLUMNS: &'static [&'static str] = &["full_name", "note", "note_updated_at"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            note: row.try_get("note")?,
            note_updated_at: row.try_get("note_updated_at")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.full_name.as_str())
            .bind(self.note.as_deref())
            .bind(self.note_updated_at)
    }
}

impl PgRecord for Job {
    const TABLE: &'static str = "jobs";
    const COLUMNS: &'static [&'static str] = &[
        "customer_id",
        "location",
        "description",
        "date",
        "income",
        "income_payment_method",
        "income_gold_type",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            location: row.try_get("location")?,
            description: row.try_get("description")?,
            date: row.try_get("date")?,
            income: row.try_get("income")?,
            income_payment_method: decode_optional_enum(row, "income_payment_method")?,
            income_gold_type: decode_optional_enum(row, "income_gold_type")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.customer_id)
            .bind(self.location.as_str())
            .bind(self.description.as_str())
            .bind(self.date)
            .bind(self.income)
            .bind(self.income_payment_method.map(|m| m.as_str()))
            .bind(self.income_gold_type.map(|g| g.as_str()))
    }
}

impl PgRecord for Earning {
    const TABLE: &'static str = "earnings";
    const COLUMNS: &'static [&'static str] =
        &["job_id", "personnel_id", "payment", "days_worked", "payment_method"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            job_id: row.try_get("job_id")?,
            personnel_id: row.try_get("personnel_id")?,
            payment: row.try_get("payment")?,
            days_worked: row.try_get("days_worked")?,
            payment_method: decode_optional_enum(row, "payment_method")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.job_id)
            .bind(self.personnel_id)
            .bind(self.payment)
            .bind(self.days_worked)
            .bind(self.payment_method.map(|m| m.as_str()))
    }
}

impl PgRecord for Material {
    const TABLE: &'static str = "materials";
    const COLUMNS: &'static [&'static str] = &["job_id", "name", "unit", "quantity", "unit_price"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            job_id: row.try_get("job_id")?,
            name: row.try_get("name")?,
            unit: row.try_get("unit")?,
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.job_id)
            .bind(self.name.as_str())
            .bind(self.unit.as_deref())
            .bind(self.quantity)
            .bind(self.unit_price)
    }
}

impl PgRecord for Attendance {
    const TABLE: &'static str = "attendance";
    const COLUMNS: &'static [&'static str] =
        &["personnel_id", "job_id", "date", "daily_wage", "location", "description"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            personnel_id: row.try_get("personnel_id")?,
            job_id: row.try_get("job_id")?,
            date: row.try_get("date")?,
            daily_wage: row.try_get("daily_wage")?,
            location: row.try_get("location")?,
            description: row.try_get("description")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.personnel_id)
            .bind(self.job_id)
            .bind(self.date)
            .bind(self.daily_wage)
            .bind(self.location.as_deref())
            .bind(self.description.as_deref())
    }
}

impl PgRecord for PersonnelPayment {
    const TABLE: &'static str = "personnel_payments";
    const COLUMNS: &'static [&'static str] =
        &["personnel_id", "amount", "date", "job_id", "payer", "payment_method"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            personnel_id: row.try_get("personnel_id")?,
            amount: row.try_get("amount")?,
            date: row.try_get("date")?,
            job_id: row.try_get("job_id")?,
            payer: decode_enum(row, "payer")?,
            payment_method: decode_enum(row, "payment_method")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.personnel_id)
            .bind(self.amount)
            .bind(self.date)
            .bind(self.job_id)
            .bind(self.payer.as_str())
            .bind(self.payment_method.as_str())
    }
}

impl PgRecord for Expense {
    const TABLE: &'static str = "expenses";
    const COLUMNS: &'static [&'static str] = &[
        "description",
        "amount",
        "date",
        "payment_method",
        "payer",
        "status",
        "deleted_at",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            description: row.try_get("description")?,
            amount: row.try_get("amount")?,
            date: row.try_get("date")?,
            payment_method: decode_enum(row, "payment_method")?,
            payer: decode_enum(row, "payer")?,
            status: decode_enum(row, "status")?,
            lifecycle: Lifecycle::from_deleted_at(row.try_get("deleted_at")?),
        })
    }

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.description.as_str())
            .bind(self.amount)
            .bind(self.date)
            .bind(self.payment_method.as_str())
            .bind(self.payer.as_str())
            .bind(self.status.as_str())
            .bind(self.lifecycle.deleted_at())
    }
}

impl PgRecord for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["name", "username", "password", "role"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            username: row.try_get("username")?,
            password: row.try_get("password")?,
            role: decode_enum(row, "role")?,
        })
    }

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.name.as_str())
            .bind(self.username.as_str())
            .bind(self.password.as_str())
            .bind(self.role.as_str())
    }
}

fn rows_to<T: PgRecord>(rows: Vec<PgRow>, context: &str) -> StoreResult<Vec<T>> {
    rows.iter()
        .map(|row| T::from_row(row).map_err(|e| storage_error(context, e)))
        .collect()
}

// ---------------------------------------------------------------------------
// PostgresStore
// ---------------------------------------------------------------------------

/// Storage backend implementing every port on PostgreSQL
///
/// # Example
///
/// ```rust,ignore
/// let store = PostgresStore::connect("postgres://localhost/crewbook", 5).await?;
/// store.ensure_schema().await?;
/// let app = ServerBuilder::new().with_backend(store).build()?;
/// ```
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| storage_error("Failed to connect", e))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations (idempotent, safe on every startup)
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::QueryError {
                backend: BACKEND.to_string(),
                message: format!("Failed to apply migrations: {}", e),
            })?;
        tracing::info!("PostgreSQL schema is up to date");
        Ok(())
    }

    /// Insert a login account
    pub async fn add_user(&self, user: User) -> StoreResult<User> {
        self.insert(&user).await
    }

    async fn insert<T: PgRecord>(&self, entity: &T) -> StoreResult<T> {
        let sql = T::insert_sql();
        let row = entity
            .bind_columns(sqlx::query(&sql))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to insert row", e))?;
        T::from_row(&row).map_err(|e| storage_error("Failed to decode inserted row", e))
    }

    async fn fetch_where<T: PgRecord>(&self, filter: &str, id: RecordId) -> StoreResult<Vec<T>> {
        let sql = T::select_sql(filter);
        let rows = sqlx::query(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to query rows", e))?;
        rows_to(rows, "Failed to decode row")
    }

    async fn fetch_all<T: PgRecord>(&self, filter: &str) -> StoreResult<Vec<T>> {
        let sql = T::select_sql(filter);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to query rows", e))?;
        rows_to(rows, "Failed to decode row")
    }

    async fn names(&self, sql: &str, ids: &[RecordId]) -> StoreResult<HashMap<RecordId, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query(sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to load names", e))?;
        rows.iter()
            .map(|row| -> Result<(RecordId, String), sqlx::Error> {
                Ok((row.try_get("id")?, row.try_get("name")?))
            })
            .collect::<Result<HashMap<_, _>, _>>()
            .map_err(|e| storage_error("Failed to decode names", e))
    }
}

#[async_trait]
impl<T: PgRecord> DataService<T> for PostgresStore {
    async fn create(&self, entity: T) -> StoreResult<T> {
        self.insert(&entity).await
    }

    async fn get(&self, id: RecordId) -> StoreResult<Option<T>> {
        Ok(self.fetch_where("WHERE id = $1", id).await?.into_iter().next())
    }

    async fn list(&self) -> StoreResult<Vec<T>> {
        self.fetch_all("ORDER BY id").await
    }

    async fn update(&self, id: RecordId, entity: T) -> StoreResult<Option<T>> {
        let sql = T::update_sql();
        let row = entity
            .bind_columns(sqlx::query(&sql))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to update row", e))?;
        row.map(|row| T::from_row(&row))
            .transpose()
            .map_err(|e| storage_error("Failed to decode updated row", e))
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete row", e))?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Child transactions
// ---------------------------------------------------------------------------

#[async_trait]
impl<C: ChildRecord + PgRecord> ChildStore<C> for PostgresStore {
    async fn children_of(&self, parent_id: RecordId) -> StoreResult<Vec<C>> {
        self.fetch_where("WHERE job_id = $1 ORDER BY id", parent_id).await
    }

    async fn all_children(&self) -> StoreResult<Vec<C>> {
        self.fetch_all("ORDER BY id").await
    }

    async fn begin(&self) -> StoreResult<Box<dyn ChildTransaction<C>>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| transaction_error("Failed to open transaction", e))?;
        Ok(Box::new(PgChildTransaction {
            tx,
            _marker: PhantomData,
        }))
    }
}

/// Wraps a sqlx transaction; dropping it uncommitted rolls back
struct PgChildTransaction<C> {
    tx: Transaction<'static, Postgres>,
    _marker: PhantomData<fn() -> C>,
}

#[async_trait]
impl<C: ChildRecord + PgRecord> ChildTransaction<C> for PgChildTransaction<C> {
    async fn take_children(&mut self, parent_id: RecordId) -> StoreResult<Option<Vec<C>>> {
        // Concurrent replaces of one job queue on the parent row
        let parent = sqlx::query("SELECT id FROM jobs WHERE id = $1 FOR UPDATE")
            .bind(parent_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| storage_error("Failed to lock parent job", e))?;
        if parent.is_none() {
            return Ok(None);
        }

        let sql = format!(
            "DELETE FROM {} WHERE job_id = $1 RETURNING id, {}",
            C::TABLE,
            C::COLUMNS.join(", ")
        );
        let rows = sqlx::query(&sql)
            .bind(parent_id)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| storage_error("Failed to delete children", e))?;
        rows_to(rows, "Failed to decode deleted child").map(Some)
    }

    async fn insert_child(&mut self, child: C) -> StoreResult<C> {
        let sql = C::insert_sql();
        let row = child
            .bind_columns(sqlx::query(&sql))
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| storage_error("Failed to insert child", e))?;
        C::from_row(&row).map_err(|e| storage_error("Failed to decode inserted child", e))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| transaction_error("Failed to commit transaction", e))
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| transaction_error("Failed to roll back transaction", e))
    }
}

// ---------------------------------------------------------------------------
// Remaining ports
// ---------------------------------------------------------------------------

fn lifecycle_clause(filter: LifecycleFilter) -> &'static str {
    match filter {
        LifecycleFilter::Active => "deleted_at IS NULL",
        LifecycleFilter::Deleted => "deleted_at IS NOT NULL",
        LifecycleFilter::Any => "TRUE",
    }
}

#[async_trait]
impl ExpenseStore for PostgresStore {
    async fn insert_expense(&self, expense: Expense) -> StoreResult<Expense> {
        self.insert(&expense).await
    }

    async fn find_expense(&self, id: RecordId, filter: LifecycleFilter) -> StoreResult<Option<Expense>> {
        let clause = format!("WHERE id = $1 AND {}", lifecycle_clause(filter));
        Ok(self.fetch_where(&clause, id).await?.into_iter().next())
    }

    async fn list_expenses(&self, filter: LifecycleFilter) -> StoreResult<Vec<Expense>> {
        let order = match filter {
            LifecycleFilter::Active => "ORDER BY date DESC, id DESC",
            LifecycleFilter::Deleted => "ORDER BY deleted_at DESC, id DESC",
            LifecycleFilter::Any => "ORDER BY id",
        };
        self.fetch_all(&format!("WHERE {} {}", lifecycle_clause(filter), order))
            .await
    }

    async fn save_expense(&self, expense: &Expense) -> StoreResult<bool> {
        let updated: Option<Expense> = DataService::update(self, expense.id, expense.clone()).await?;
        Ok(updated.is_some())
    }

    async fn remove_expense(&self, id: RecordId) -> StoreResult<bool> {
        DataService::<Expense>::delete(self, id).await
    }
}

#[async_trait]
impl AttendanceStore for PostgresStore {
    async fn query_attendance(&self, query: &AttendanceQuery) -> StoreResult<Vec<Attendance>> {
        let sql = Attendance::select_sql(
            "WHERE date >= $1 AND date < $2 \
             AND ($3::BIGINT IS NULL OR personnel_id = $3) \
             AND ($4::BIGINT IS NULL OR job_id = $4) \
             ORDER BY date DESC, id DESC",
        );
        let rows = sqlx::query(&sql)
            .bind(query.from)
            .bind(query.until)
            .bind(query.personnel_id)
            .bind(query.job_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to query attendance", e))?;
        rows_to(rows, "Failed to decode attendance")
    }
}

#[async_trait]
impl NameDirectory for PostgresStore {
    async fn personnel_names(&self, ids: &[RecordId]) -> StoreResult<HashMap<RecordId, String>> {
        self.names("SELECT id, full_name AS name FROM personnel WHERE id = ANY($1)", ids)
            .await
    }

    async fn job_names(&self, ids: &[RecordId]) -> StoreResult<HashMap<RecordId, String>> {
        self.names("SELECT id, description AS name FROM jobs WHERE id = ANY($1)", ids)
            .await
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn find_by_credentials(&self, username: &str, password: &str) -> StoreResult<Option<User>> {
        let sql = User::select_sql("WHERE username = $1 AND password = $2");
        let row = sqlx::query(&sql)
            .bind(username)
            .bind(password)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to look up user", e))?;
        row.map(|row| User::from_row(&row))
            .transpose()
            .map_err(|e| storage_error("Failed to decode user", e))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.fetch_all("ORDER BY id").await
    }
}
