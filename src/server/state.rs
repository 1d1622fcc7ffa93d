//! Shared handler state

use crate::config::AppConfig;
use crate::core::aggregation::ReportService;
use crate::core::bulk::BulkReplacer;
use crate::core::error::ConfigError;
use crate::core::ledger::SoftDeleteLedger;
use crate::core::model::{Earning, Material};
use crate::core::service::Repositories;
use crate::core::timestamp::TimestampNormalizer;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub normalizer: TimestampNormalizer,
    pub repos: Repositories,
    pub earnings: BulkReplacer<Earning>,
    pub materials: BulkReplacer<Material>,
    pub ledger: SoftDeleteLedger,
    pub reports: ReportService,
}

impl AppState {
    /// Wire the core components onto one set of repositories
    pub fn new(repos: Repositories, config: AppConfig) -> Result<Self, ConfigError> {
        let normalizer = config.normalizer()?;
        let retry = config.retry;

        Ok(Self {
            earnings: BulkReplacer::new(repos.jobs.clone(), repos.earnings.clone(), retry),
            materials: BulkReplacer::new(repos.jobs.clone(), repos.materials.clone(), retry),
            ledger: SoftDeleteLedger::new(repos.expenses.clone(), normalizer),
            reports: ReportService::new(repos.attendance.clone(), repos.names.clone(), normalizer),
            config: Arc::new(config),
            normalizer,
            repos,
        })
    }
}
