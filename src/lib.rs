//! # crewbook
//!
//! Bookkeeping service for a small crew: jobs and their earnings and
//! materials, daily attendance, personnel payments and a shared expense
//! ledger, served as a JSON API.
//!
//! ## Features
//!
//! - **Atomic child sets**: a job's earnings and materials are replaced as a
//!   whole inside one store transaction, retried on transient failures
//! - **Timestamp normalization**: absolute, zoned, date-only and local
//!   wall-clock inputs all resolve to one UTC instant
//! - **Soft-delete ledger**: expenses can be deleted, restored or purged
//! - **Attendance reports**: two-level trees grouped by personnel or job with
//!   exact decimal totals
//! - **Pluggable storage**: in-memory store by default, PostgreSQL behind the
//!   `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crewbook::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     ServerBuilder::new()
//!         .with_config(AppConfig::default())
//!         .with_backend(InMemoryStore::new())
//!         .serve()
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        aggregation::{AttendanceReport, GroupBy, ReportRequest, ReportService},
        bulk::BulkReplacer,
        entity::{ChildRecord, Entity, RecordId},
        error::{CrewError, CrewResult},
        ledger::SoftDeleteLedger,
        model::*,
        retry::RetryPolicy,
        service::{Backend, DataService, Repositories},
        timestamp::{IncomingTimestamp, TimestampNormalizer},
    };

    // === Macros ===
    pub use crate::{impl_child_record, impl_entity, string_enum};

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryStore;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresStore;

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
}
