//! Atomic replacement of a job's child set
//!
//! [`BulkReplacer`] swaps the whole earnings (or materials) set of a job for
//! the set the client submitted. The swap runs inside one store transaction:
//! either every old row is gone and every new row is in, or nothing changed.

use crate::core::entity::{ChildRecord, RecordId};
use crate::core::error::{CrewResult, EntityError, StorageError, ValidationError};
use crate::core::model::Job;
use crate::core::retry::RetryPolicy;
use crate::core::service::{ChildStore, ChildTransaction, DataService, StoreResult};
use std::sync::Arc;
use validator::Validate;

pub struct BulkReplacer<C: ChildRecord> {
    jobs: Arc<dyn DataService<Job>>,
    children: Arc<dyn ChildStore<C>>,
    retry: RetryPolicy,
}

impl<C: ChildRecord> Clone for BulkReplacer<C> {
    fn clone(&self) -> Self {
        Self {
            jobs: self.jobs.clone(),
            children: self.children.clone(),
            retry: self.retry,
        }
    }
}

impl<C: ChildRecord> BulkReplacer<C> {
    pub fn new(jobs: Arc<dyn DataService<Job>>, children: Arc<dyn ChildStore<C>>, retry: RetryPolicy) -> Self {
        Self {
            jobs,
            children,
            retry,
        }
    }

    /// Current children of `job_id`
    pub async fn load_children(&self, job_id: RecordId) -> CrewResult<Vec<C>> {
        self.ensure_job(job_id).await?;
        Ok(self.children.children_of(job_id).await?)
    }

    /// Replace every child of `job_id` with `items`, returning the persisted rows
    pub async fn replace_children(&self, job_id: RecordId, items: Vec<C>) -> CrewResult<Vec<C>> {
        validate_items(&items)?;
        self.ensure_job(job_id).await?;

        let items: Vec<C> = items.into_iter().map(|item| item.adopt(job_id)).collect();
        let operation = format!("replace {}", C::resource_name());

        // A job deleted after the check above comes back as None
        let persisted = self
            .retry
            .run(&operation, |attempt| self.replace_once(job_id, items.clone(), attempt))
            .await?
            .ok_or_else(|| EntityError::not_found("job", job_id))?;

        tracing::info!(
            job_id,
            kind = C::resource_name(),
            count = persisted.len(),
            "Replaced child set"
        );
        Ok(persisted)
    }

    async fn ensure_job(&self, job_id: RecordId) -> CrewResult<()> {
        match self.jobs.get(job_id).await? {
            Some(_) => Ok(()),
            None => Err(EntityError::not_found("job", job_id).into()),
        }
    }

    async fn replace_once(
        &self,
        job_id: RecordId,
        items: Vec<C>,
        attempt: u32,
    ) -> StoreResult<Option<Vec<C>>> {
        let mut tx = self.children.begin().await?;

        match swap(tx.as_mut(), job_id, items).await {
            Ok(None) => {
                tx.rollback().await?;
                tracing::debug!(
                    job_id,
                    kind = C::resource_name(),
                    attempt,
                    "Job vanished before child set swap"
                );
                Ok(None)
            }
            Ok(Some((removed, persisted))) => {
                tx.commit().await?;
                tracing::debug!(
                    job_id,
                    kind = C::resource_name(),
                    attempt,
                    removed,
                    inserted = persisted.len(),
                    "Committed child set swap"
                );
                Ok(Some(persisted))
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(
                        job_id,
                        kind = C::resource_name(),
                        error = %rollback_err,
                        "Rollback failed after aborted child set swap"
                    );
                }
                Err(err)
            }
        }
    }
}

async fn swap<C: ChildRecord>(
    tx: &mut dyn ChildTransaction<C>,
    job_id: RecordId,
    items: Vec<C>,
) -> Result<Option<(usize, Vec<C>)>, StorageError> {
    let Some(removed) = tx.take_children(job_id).await? else {
        return Ok(None);
    };
    let mut persisted = Vec::with_capacity(items.len());
    for item in items {
        persisted.push(tx.insert_child(item).await?);
    }
    Ok(Some((removed.len(), persisted)))
}

/// One invalid item rejects the whole batch, with every item's errors reported
fn validate_items<C: Validate>(items: &[C]) -> Result<(), ValidationError> {
    let errors: Vec<_> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            item.validate()
                .err()
                .map(|errs| ValidationError::from_validator(&errs, Some(&format!("[{}]", index))))
        })
        .flatten()
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::FieldErrors(errors))
    }
}
