//! Persistence ports
//!
//! The core talks to storage only through these traits. Every backend in
//! [`crate::storage`] implements all of them; [`Repositories`] bundles one
//! backend into the trait objects the services and handlers hold.

use crate::core::entity::{ChildRecord, Entity, RecordId};
use crate::core::error::StorageError;
use crate::core::model::{
    Attendance, Customer, Earning, Expense, Job, Material, Personnel, PersonnelPayment, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Result type returned by every port method
pub type StoreResult<T> = Result<T, StorageError>;

/// Single-row CRUD for one record type
///
/// Ids on records passed to `create` are ignored; the store assigns them.
#[async_trait]
pub trait DataService<T: Entity>: Send + Sync {
    async fn create(&self, entity: T) -> StoreResult<T>;

    async fn get(&self, id: RecordId) -> StoreResult<Option<T>>;

    /// All rows, ordered by id
    async fn list(&self) -> StoreResult<Vec<T>>;

    /// Replace the row with this id; `None` when it does not exist
    async fn update(&self, id: RecordId, entity: T) -> StoreResult<Option<T>>;

    /// Remove the row; `false` when it did not exist
    async fn delete(&self, id: RecordId) -> StoreResult<bool>;
}

/// Child sets owned by a parent job
#[async_trait]
pub trait ChildStore<C: ChildRecord>: Send + Sync {
    /// Current children of `parent_id`, ordered by id
    async fn children_of(&self, parent_id: RecordId) -> StoreResult<Vec<C>>;

    /// Every child row of this kind
    async fn all_children(&self) -> StoreResult<Vec<C>>;

    /// Open a write transaction over this child table
    async fn begin(&self) -> StoreResult<Box<dyn ChildTransaction<C>>>;
}

/// An open transaction over one child table
///
/// Nothing written through the transaction is visible to other readers until
/// `commit`. Dropping it without committing discards every write.
#[async_trait]
pub trait ChildTransaction<C: ChildRecord>: Send {
    /// Lock the parent job and delete every child of `parent_id`, returning
    /// the removed rows
    ///
    /// Returns `None` when the parent job does not exist at the time of the
    /// call. Nothing is deleted in that case.
    async fn take_children(&mut self, parent_id: RecordId) -> StoreResult<Option<Vec<C>>>;

    /// Insert one child, returning it with its assigned id
    async fn insert_child(&mut self, child: C) -> StoreResult<C>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// Which lifecycle states a ledger read should see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleFilter {
    Active,
    Deleted,
    Any,
}

impl LifecycleFilter {
    pub fn admits(self, expense: &Expense) -> bool {
        match self {
            LifecycleFilter::Active => !expense.lifecycle.is_deleted(),
            LifecycleFilter::Deleted => expense.lifecycle.is_deleted(),
            LifecycleFilter::Any => true,
        }
    }
}

/// Expense rows, including soft-deleted ones
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn insert_expense(&self, expense: Expense) -> StoreResult<Expense>;

    async fn find_expense(&self, id: RecordId, filter: LifecycleFilter) -> StoreResult<Option<Expense>>;

    /// Active rows newest first; deleted rows by deletion time, newest first
    async fn list_expenses(&self, filter: LifecycleFilter) -> StoreResult<Vec<Expense>>;

    /// Persist every field, including the lifecycle; `false` when the row is gone
    async fn save_expense(&self, expense: &Expense) -> StoreResult<bool>;

    /// Remove the row whatever its lifecycle; `false` when it did not exist
    async fn remove_expense(&self, id: RecordId) -> StoreResult<bool>;
}

/// Attendance filter with a half-open date window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceQuery {
    pub from: DateTime<Utc>,
    /// Exclusive upper bound
    pub until: DateTime<Utc>,
    pub personnel_id: Option<RecordId>,
    pub job_id: Option<RecordId>,
}

impl AttendanceQuery {
    pub fn matches(&self, record: &Attendance) -> bool {
        record.date >= self.from
            && record.date < self.until
            && self.personnel_id.is_none_or(|id| record.personnel_id == id)
            && self.job_id.is_none_or(|id| record.job_id == id)
    }
}

#[async_trait]
pub trait AttendanceStore: DataService<Attendance> {
    /// Matching rows, newest first
    async fn query_attendance(&self, query: &AttendanceQuery) -> StoreResult<Vec<Attendance>>;
}

/// Display names for report keys
#[async_trait]
pub trait NameDirectory: Send + Sync {
    async fn personnel_names(&self, ids: &[RecordId]) -> StoreResult<HashMap<RecordId, String>>;

    /// Job descriptions keyed by job id
    async fn job_names(&self, ids: &[RecordId]) -> StoreResult<HashMap<RecordId, String>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_credentials(&self, username: &str, password: &str) -> StoreResult<Option<User>>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;
}

/// A backend implementing every port
pub trait Backend:
    DataService<Customer>
    + DataService<Personnel>
    + DataService<Job>
    + DataService<PersonnelPayment>
    + DataService<Material>
    + AttendanceStore
    + ChildStore<Earning>
    + ChildStore<Material>
    + ExpenseStore
    + NameDirectory
    + UserStore
    + Clone
    + 'static
{
}

impl<B> Backend for B where
    B: DataService<Customer>
        + DataService<Personnel>
        + DataService<Job>
        + DataService<PersonnelPayment>
        + DataService<Material>
        + AttendanceStore
        + ChildStore<Earning>
        + ChildStore<Material>
        + ExpenseStore
        + NameDirectory
        + UserStore
        + Clone
        + 'static
{
}

/// One backend viewed through each of its ports
#[derive(Clone)]
pub struct Repositories {
    pub customers: Arc<dyn DataService<Customer>>,
    pub personnel: Arc<dyn DataService<Personnel>>,
    pub jobs: Arc<dyn DataService<Job>>,
    pub payments: Arc<dyn DataService<PersonnelPayment>>,
    pub attendance: Arc<dyn AttendanceStore>,
    pub earnings: Arc<dyn ChildStore<Earning>>,
    pub materials: Arc<dyn ChildStore<Material>>,
    /// Single material rows, for edits outside a bulk replace
    pub material_rows: Arc<dyn DataService<Material>>,
    pub expenses: Arc<dyn ExpenseStore>,
    pub names: Arc<dyn NameDirectory>,
    pub users: Arc<dyn UserStore>,
}

impl Repositories {
    pub fn from_backend<B: Backend>(backend: B) -> Self {
        Self {
            customers: Arc::new(backend.clone()),
            personnel: Arc::new(backend.clone()),
            jobs: Arc::new(backend.clone()),
            payments: Arc::new(backend.clone()),
            attendance: Arc::new(backend.clone()),
            earnings: Arc::new(backend.clone()),
            materials: Arc::new(backend.clone()),
            material_rows: Arc::new(backend.clone()),
            expenses: Arc::new(backend.clone()),
            names: Arc::new(backend.clone()),
            users: Arc::new(backend),
        }
    }
}
