//! Expense lifecycle with reversible soft delete
//!
//! ```text
//!            delete                 permanent delete
//!   Active ---------> SoftDeleted ------------------> (row removed)
//!     ^                   |
//!     +------ restore ----+
//!   Active ----------- permanent delete ------------> (row removed)
//! ```
//!
//! The paid/unpaid status can be toggled in either state and is left alone by
//! every lifecycle transition.

use crate::core::entity::RecordId;
use crate::core::error::{CrewResult, EntityError};
use crate::core::input::ExpenseInput;
use crate::core::model::{Expense, Lifecycle};
use crate::core::service::{ExpenseStore, LifecycleFilter};
use crate::core::timestamp::TimestampNormalizer;
use std::sync::Arc;

const ENTITY: &str = "expense";

#[derive(Clone)]
pub struct SoftDeleteLedger {
    store: Arc<dyn ExpenseStore>,
    clock: TimestampNormalizer,
}

impl SoftDeleteLedger {
    pub fn new(store: Arc<dyn ExpenseStore>, clock: TimestampNormalizer) -> Self {
        Self { store, clock }
    }

    /// Record a new active expense dated now
    pub async fn create(&self, input: ExpenseInput) -> CrewResult<Expense> {
        let expense = self
            .store
            .insert_expense(input.into_expense(self.clock.now()))
            .await?;
        tracing::info!(expense_id = expense.id, amount = %expense.amount, "Expense recorded");
        Ok(expense)
    }

    pub async fn get_active(&self, id: RecordId) -> CrewResult<Expense> {
        self.find(id, LifecycleFilter::Active).await
    }

    pub async fn list_active(&self) -> CrewResult<Vec<Expense>> {
        Ok(self.store.list_expenses(LifecycleFilter::Active).await?)
    }

    /// Soft-deleted expenses, most recently deleted first
    pub async fn list_deleted(&self) -> CrewResult<Vec<Expense>> {
        Ok(self.store.list_expenses(LifecycleFilter::Deleted).await?)
    }

    /// Every expense whatever its state
    pub async fn list_all(&self) -> CrewResult<Vec<Expense>> {
        Ok(self.store.list_expenses(LifecycleFilter::Any).await?)
    }

    pub async fn update(&self, id: RecordId, input: ExpenseInput) -> CrewResult<Expense> {
        let mut expense = self.find(id, LifecycleFilter::Active).await?;
        input.apply_to(&mut expense);
        self.save(&expense).await?;
        Ok(expense)
    }

    pub async fn toggle_status(&self, id: RecordId) -> CrewResult<Expense> {
        let mut expense = self.find(id, LifecycleFilter::Any).await?;
        expense.status = expense.status.toggled();
        self.save(&expense).await?;
        tracing::info!(expense_id = id, status = %expense.status, "Expense status toggled");
        Ok(expense)
    }

    /// Active -> SoftDeleted
    pub async fn soft_delete(&self, id: RecordId) -> CrewResult<Expense> {
        let mut expense = self.find(id, LifecycleFilter::Active).await?;
        expense.lifecycle = Lifecycle::Deleted {
            at: self.clock.now(),
        };
        self.save(&expense).await?;
        tracing::info!(expense_id = id, "Expense soft-deleted");
        Ok(expense)
    }

    /// SoftDeleted -> Active
    pub async fn restore(&self, id: RecordId) -> CrewResult<Expense> {
        let mut expense = self.find(id, LifecycleFilter::Deleted).await?;
        expense.lifecycle = Lifecycle::Active;
        self.save(&expense).await?;
        tracing::info!(expense_id = id, "Expense restored");
        Ok(expense)
    }

    /// Remove the row from either state
    pub async fn permanent_delete(&self, id: RecordId) -> CrewResult<()> {
        if !self.store.remove_expense(id).await? {
            return Err(EntityError::not_found(ENTITY, id).into());
        }
        tracing::info!(expense_id = id, "Expense permanently deleted");
        Ok(())
    }

    async fn find(&self, id: RecordId, filter: LifecycleFilter) -> CrewResult<Expense> {
        self.store
            .find_expense(id, filter)
            .await?
            .ok_or_else(|| EntityError::not_found(ENTITY, id).into())
    }

    async fn save(&self, expense: &Expense) -> CrewResult<()> {
        if self.store.save_expense(expense).await? {
            Ok(())
        } else {
            Err(EntityError::not_found(ENTITY, expense.id).into())
        }
    }
}
