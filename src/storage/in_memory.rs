//! In-memory implementation of every persistence port
//!
//! Useful for tests and development. All tables live behind one async
//! `RwLock`; a child transaction holds the write half for its whole lifetime
//! and edits a working copy, so concurrent replaces serialize and an aborted
//! transaction leaves nothing behind.

use crate::core::entity::{ChildRecord, Entity, RecordId};
use crate::core::error::StorageError;
use crate::core::model::{
    Attendance, Customer, Earning, Expense, Job, Material, Personnel, PersonnelPayment, User,
};
use crate::core::service::{
    AttendanceQuery, AttendanceStore, ChildStore, ChildTransaction, DataService, ExpenseStore,
    LifecycleFilter, NameDirectory, StoreResult, UserStore,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

const BACKEND: &str = "in-memory";

#[derive(Debug, Default)]
pub struct Tables {
    customers: BTreeMap<RecordId, Customer>,
    personnel: BTreeMap<RecordId, Personnel>,
    jobs: BTreeMap<RecordId, Job>,
    earnings: BTreeMap<RecordId, Earning>,
    materials: BTreeMap<RecordId, Material>,
    attendance: BTreeMap<RecordId, Attendance>,
    expenses: BTreeMap<RecordId, Expense>,
    payments: BTreeMap<RecordId, PersonnelPayment>,
    users: BTreeMap<RecordId, User>,
    sequences: HashMap<&'static str, RecordId>,
}

impl Tables {
    fn next_id(&mut self, resource: &'static str) -> RecordId {
        let next = self.sequences.entry(resource).or_insert(0);
        *next += 1;
        *next
    }
}

/// Maps a record type to its table
pub trait InMemoryTable: Entity {
    fn table(tables: &Tables) -> &BTreeMap<RecordId, Self>;

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<RecordId, Self>;

    /// Referential checks run before the row is inserted or replaced
    fn before_write(_tables: &Tables, _row: &Self) -> StoreResult<()> {
        Ok(())
    }

    /// Referential checks and cascades run before the row is removed
    fn before_delete(_tables: &mut Tables, _id: RecordId) -> StoreResult<()> {
        Ok(())
    }
}

fn require_job(tables: &Tables, job_id: RecordId) -> StoreResult<()> {
    if tables.jobs.contains_key(&job_id) {
        Ok(())
    } else {
        Err(StorageError::IntegrityError {
            message: format!("job {} does not exist", job_id),
        })
    }
}

macro_rules! in_memory_table {
    ($type:ty, $field:ident) => {
        impl InMemoryTable for $type {
            fn table(tables: &Tables) -> &BTreeMap<RecordId, Self> {
                &tables.$field
            }

            fn table_mut(tables: &mut Tables) -> &mut BTreeMap<RecordId, Self> {
                &mut tables.$field
            }
        }
    };
    ($type:ty, $field:ident, job_child) => {
        impl InMemoryTable for $type {
            fn table(tables: &Tables) -> &BTreeMap<RecordId, Self> {
                &tables.$field
            }

            fn table_mut(tables: &mut Tables) -> &mut BTreeMap<RecordId, Self> {
                &mut tables.$field
            }

            fn before_write(tables: &Tables, row: &Self) -> StoreResult<()> {
                require_job(tables, row.parent_id())
            }
        }
    };
}

in_memory_table!(Personnel, personnel);
in_memory_table!(Earning, earnings, job_child);
in_memory_table!(Material, materials, job_child);
in_memory_table!(Attendance, attendance);
in_memory_table!(PersonnelPayment, payments);

impl InMemoryTable for Customer {
    fn table(tables: &Tables) -> &BTreeMap<RecordId, Self> {
        &tables.customers
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<RecordId, Self> {
        &mut tables.customers
    }

    fn before_delete(tables: &mut Tables, id: RecordId) -> StoreResult<()> {
        if tables.jobs.values().any(|job| job.customer_id == id) {
            return Err(StorageError::IntegrityError {
                message: format!("customer {} still has jobs", id),
            });
        }
        Ok(())
    }
}

impl InMemoryTable for Job {
    fn table(tables: &Tables) -> &BTreeMap<RecordId, Self> {
        &tables.jobs
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<RecordId, Self> {
        &mut tables.jobs
    }

    fn before_delete(tables: &mut Tables, id: RecordId) -> StoreResult<()> {
        tables.earnings.retain(|_, earning| earning.job_id != id);
        tables.materials.retain(|_, material| material.job_id != id);
        Ok(())
    }
}

/// Step of a child transaction at which an injected fault fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    Begin,
    Take,
    Insert,
    Commit,
}

#[derive(Debug)]
struct Fault {
    point: FaultPoint,
    transient: bool,
    skip: usize,
    remaining: usize,
}

/// Scripted store failures for exercising rollback and retry
#[derive(Debug, Default)]
struct FaultInjector {
    faults: Mutex<Vec<Fault>>,
}

impl FaultInjector {
    fn trip(&self, point: FaultPoint) -> StoreResult<()> {
        let Ok(mut faults) = self.faults.lock() else {
            return Ok(());
        };
        let Some(fault) = faults.iter_mut().find(|f| f.point == point && f.remaining > 0) else {
            return Ok(());
        };
        if fault.skip > 0 {
            fault.skip -= 1;
            return Ok(());
        }
        fault.remaining -= 1;

        let message = format!("injected failure at {:?}", point);
        tracing::debug!(?point, transient = fault.transient, "Injected store fault");
        Err(match (fault.transient, point) {
            (true, _) => StorageError::ConnectionError {
                backend: BACKEND.to_string(),
                message,
            },
            (false, FaultPoint::Begin | FaultPoint::Commit) => {
                StorageError::TransactionError { message }
            }
            (false, FaultPoint::Take | FaultPoint::Insert) => StorageError::QueryError {
                backend: BACKEND.to_string(),
                message,
            },
        })
    }
}

/// In-memory store implementing every port
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    faults: Arc<FaultInjector>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a login account
    pub async fn add_user(&self, mut user: User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|existing| existing.username == user.username) {
            return Err(StorageError::IntegrityError {
                message: format!("username '{}' is taken", user.username),
            });
        }
        user.id = tables.next_id(User::resource_name());
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Fail child transactions at `point`: let `skip` hits pass, then fail the
    /// next `times` hits. Transient faults surface as connection errors;
    /// permanent ones as transaction errors at begin/commit and query errors
    /// elsewhere.
    pub fn inject_fault(&self, point: FaultPoint, transient: bool, skip: usize, times: usize) {
        if let Ok(mut faults) = self.faults.faults.lock() {
            faults.push(Fault {
                point,
                transient,
                skip,
                remaining: times,
            });
        }
    }

    pub fn clear_faults(&self) {
        if let Ok(mut faults) = self.faults.faults.lock() {
            faults.clear();
        }
    }
}

#[async_trait]
impl<T: InMemoryTable> DataService<T> for InMemoryStore {
    async fn create(&self, mut entity: T) -> StoreResult<T> {
        let mut tables = self.tables.write().await;
        T::before_write(&tables, &entity)?;
        entity.set_id(tables.next_id(T::resource_name()));
        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn get(&self, id: RecordId) -> StoreResult<Option<T>> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<T>> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).values().cloned().collect())
    }

    async fn update(&self, id: RecordId, mut entity: T) -> StoreResult<Option<T>> {
        let mut tables = self.tables.write().await;
        if !T::table(&tables).contains_key(&id) {
            return Ok(None);
        }
        T::before_write(&tables, &entity)?;
        let table = T::table_mut(&mut tables);
        match table.get_mut(&id) {
            Some(slot) => {
                entity.set_id(id);
                *slot = entity.clone();
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: RecordId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !T::table(&tables).contains_key(&id) {
            return Ok(false);
        }
        T::before_delete(&mut tables, id)?;
        Ok(T::table_mut(&mut tables).remove(&id).is_some())
    }
}

#[async_trait]
impl<C: ChildRecord + InMemoryTable> ChildStore<C> for InMemoryStore {
    async fn children_of(&self, parent_id: RecordId) -> StoreResult<Vec<C>> {
        let tables = self.tables.read().await;
        Ok(C::table(&tables)
            .values()
            .filter(|child| child.parent_id() == parent_id)
            .cloned()
            .collect())
    }

    async fn all_children(&self) -> StoreResult<Vec<C>> {
        let tables = self.tables.read().await;
        Ok(C::table(&tables).values().cloned().collect())
    }

    async fn begin(&self) -> StoreResult<Box<dyn ChildTransaction<C>>> {
        self.faults.trip(FaultPoint::Begin)?;
        let guard = self.tables.clone().write_owned().await;
        let working = C::table(&guard).clone();
        let next_id = guard.sequences.get(C::resource_name()).copied().unwrap_or(0);
        Ok(Box::new(InMemoryChildTransaction {
            guard,
            working,
            next_id,
            faults: self.faults.clone(),
        }))
    }
}

struct InMemoryChildTransaction<C> {
    guard: OwnedRwLockWriteGuard<Tables>,
    working: BTreeMap<RecordId, C>,
    next_id: RecordId,
    faults: Arc<FaultInjector>,
}

#[async_trait]
impl<C: ChildRecord + InMemoryTable> ChildTransaction<C> for InMemoryChildTransaction<C> {
    async fn take_children(&mut self, parent_id: RecordId) -> StoreResult<Option<Vec<C>>> {
        self.faults.trip(FaultPoint::Take)?;
        if !self.guard.jobs.contains_key(&parent_id) {
            return Ok(None);
        }
        let ids: Vec<RecordId> = self
            .working
            .values()
            .filter(|child| child.parent_id() == parent_id)
            .map(|child| child.id())
            .collect();
        Ok(Some(
            ids.into_iter()
                .filter_map(|id| self.working.remove(&id))
                .collect(),
        ))
    }

    async fn insert_child(&mut self, mut child: C) -> StoreResult<C> {
        self.faults.trip(FaultPoint::Insert)?;
        require_job(&self.guard, child.parent_id())?;
        self.next_id += 1;
        child.set_id(self.next_id);
        self.working.insert(child.id(), child.clone());
        Ok(child)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.faults.trip(FaultPoint::Commit)?;
        let InMemoryChildTransaction {
            mut guard,
            working,
            next_id,
            ..
        } = *self;
        *C::table_mut(&mut guard) = working;
        guard.sequences.insert(C::resource_name(), next_id);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ExpenseStore for InMemoryStore {
    async fn insert_expense(&self, mut expense: Expense) -> StoreResult<Expense> {
        let mut tables = self.tables.write().await;
        expense.id = tables.next_id(Expense::resource_name());
        tables.expenses.insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn find_expense(&self, id: RecordId, filter: LifecycleFilter) -> StoreResult<Option<Expense>> {
        let tables = self.tables.read().await;
        Ok(tables
            .expenses
            .get(&id)
            .filter(|expense| filter.admits(expense))
            .cloned())
    }

    async fn list_expenses(&self, filter: LifecycleFilter) -> StoreResult<Vec<Expense>> {
        let tables = self.tables.read().await;
        let mut expenses: Vec<Expense> = tables
            .expenses
            .values()
            .filter(|expense| filter.admits(expense))
            .cloned()
            .collect();
        match filter {
            LifecycleFilter::Deleted => expenses.sort_by(|a, b| {
                b.lifecycle
                    .deleted_at()
                    .cmp(&a.lifecycle.deleted_at())
                    .then(b.id.cmp(&a.id))
            }),
            LifecycleFilter::Active => {
                expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)))
            }
            LifecycleFilter::Any => {}
        }
        Ok(expenses)
    }

    async fn save_expense(&self, expense: &Expense) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.expenses.get_mut(&expense.id) {
            Some(slot) => {
                *slot = expense.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_expense(&self, id: RecordId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.expenses.remove(&id).is_some())
    }
}

#[async_trait]
impl AttendanceStore for InMemoryStore {
    async fn query_attendance(&self, query: &AttendanceQuery) -> StoreResult<Vec<Attendance>> {
        let tables = self.tables.read().await;
        let mut records: Vec<Attendance> = tables
            .attendance
            .values()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(records)
    }
}

#[async_trait]
impl NameDirectory for InMemoryStore {
    async fn personnel_names(&self, ids: &[RecordId]) -> StoreResult<HashMap<RecordId, String>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.personnel.get(id).map(|p| (*id, p.full_name.clone())))
            .collect())
    }

    async fn job_names(&self, ids: &[RecordId]) -> StoreResult<HashMap<RecordId, String>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.jobs.get(id).map(|job| (*id, job.description.clone())))
            .collect())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_credentials(&self, username: &str, password: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username && user.password == password)
            .cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().cloned().collect())
    }
}
