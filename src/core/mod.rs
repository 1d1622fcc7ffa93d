//! Domain model, persistence ports and the core bookkeeping components

pub mod aggregation;
pub mod bulk;
pub mod codec;
pub mod entity;
pub mod error;
pub mod input;
pub mod ledger;
pub mod model;
pub mod retry;
pub mod service;
pub mod timestamp;

pub use aggregation::{AttendanceReport, GroupBy, ReportRequest, ReportService, ReportTree, aggregate};
pub use bulk::BulkReplacer;
pub use entity::{ChildRecord, Entity, RecordId};
pub use error::{CrewError, CrewResult};
pub use ledger::SoftDeleteLedger;
pub use retry::RetryPolicy;
pub use service::{Backend, DataService, Repositories};
pub use timestamp::{IncomingTimestamp, TimestampNormalizer};
