//! Attendance aggregation
//!
//! Flat attendance rows are folded into a two-level report tree: primary
//! groups (personnel or job) each holding secondary lines (the other key),
//! with day counts and exact wage totals at every level.

use crate::core::entity::RecordId;
use crate::core::error::{CrewError, CrewResult, EntityError, ValidationError};
use crate::core::model::Attendance;
use crate::core::service::{AttendanceQuery, AttendanceStore, NameDirectory};
use crate::core::timestamp::{IncomingTimestamp, TimestampNormalizer};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

crate::string_enum! {
    /// Primary grouping key of a report
    pub enum GroupBy("group by") {
        ByPersonnel => "personnel",
        ByJob => "job",
    }
}

impl Default for GroupBy {
    fn default() -> Self {
        GroupBy::ByPersonnel
    }
}

/// Secondary group: one person on one job, or one job for one person
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLine {
    pub id: RecordId,
    pub name: String,
    pub days: u32,
    pub earnings: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportGroup {
    pub id: RecordId,
    pub name: String,
    pub total_days: u32,
    pub total_earnings: Decimal,
    pub lines: Vec<ReportLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTree {
    pub group_by: GroupBy,
    pub groups: Vec<ReportGroup>,
    pub total_days: u32,
    pub total_earnings: Decimal,
}

/// Display names for the ids appearing in a report
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    pub personnel: HashMap<RecordId, String>,
    pub jobs: HashMap<RecordId, String>,
}

impl NameTable {
    pub fn personnel_name(&self, id: RecordId) -> String {
        lookup(&self.personnel, id).unwrap_or_else(|| format!("Personnel #{}", id))
    }

    /// Jobs are named by their description; blank descriptions fall back to the placeholder
    pub fn job_name(&self, id: RecordId) -> String {
        lookup(&self.jobs, id).unwrap_or_else(|| format!("Job #{}", id))
    }
}

fn lookup(names: &HashMap<RecordId, String>, id: RecordId) -> Option<String> {
    names
        .get(&id)
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

#[derive(Default)]
struct Tally {
    days: u32,
    earnings: Decimal,
}

/// Group `records` into a report tree. Empty input is a NotFound.
pub fn aggregate(records: &[Attendance], group_by: GroupBy, names: &NameTable) -> CrewResult<ReportTree> {
    if records.is_empty() {
        return Err(EntityError::NoMatches {
            entity_type: "attendance",
        }
        .into());
    }

    let mut buckets: BTreeMap<RecordId, BTreeMap<RecordId, Tally>> = BTreeMap::new();
    for record in records {
        let (primary, secondary) = match group_by {
            GroupBy::ByPersonnel => (record.personnel_id, record.job_id),
            GroupBy::ByJob => (record.job_id, record.personnel_id),
        };
        let tally = buckets.entry(primary).or_default().entry(secondary).or_default();
        tally.days += 1;
        tally.earnings += record.daily_wage;
    }

    let (primary_name, secondary_name): (fn(&NameTable, RecordId) -> String, fn(&NameTable, RecordId) -> String) =
        match group_by {
            GroupBy::ByPersonnel => (NameTable::personnel_name, NameTable::job_name),
            GroupBy::ByJob => (NameTable::job_name, NameTable::personnel_name),
        };

    let mut groups: Vec<ReportGroup> = buckets
        .into_iter()
        .map(|(id, lines)| {
            let mut lines: Vec<ReportLine> = lines
                .into_iter()
                .map(|(line_id, tally)| ReportLine {
                    id: line_id,
                    name: secondary_name(names, line_id),
                    days: tally.days,
                    earnings: tally.earnings,
                })
                .collect();
            lines.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

            ReportGroup {
                id,
                name: primary_name(names, id),
                total_days: lines.iter().map(|line| line.days).sum(),
                total_earnings: lines.iter().map(|line| line.earnings).sum(),
                lines,
            }
        })
        .collect();
    groups.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

    Ok(ReportTree {
        group_by,
        total_days: groups.iter().map(|group| group.total_days).sum(),
        total_earnings: groups.iter().map(|group| group.total_earnings).sum(),
        groups,
    })
}

// =============================================================================
// Report service
// =============================================================================

/// Query parameters of an attendance report
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub personnel_id: Option<RecordId>,
    pub job_id: Option<RecordId>,
    #[serde(default)]
    pub group_by: GroupBy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub personnel_id: Option<RecordId>,
    pub job_id: Option<RecordId>,
}

/// Normalized half-open window the report covered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportWindow {
    pub from: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    pub filter: ReportFilter,
    pub window: ReportWindow,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub tree: ReportTree,
}

/// Reports start here when the caller gives no start date
pub fn default_report_start() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2023, 1, 1)
}

#[derive(Clone)]
pub struct ReportService {
    attendance: Arc<dyn AttendanceStore>,
    names: Arc<dyn NameDirectory>,
    normalizer: TimestampNormalizer,
}

impl ReportService {
    pub fn new(
        attendance: Arc<dyn AttendanceStore>,
        names: Arc<dyn NameDirectory>,
        normalizer: TimestampNormalizer,
    ) -> Self {
        Self {
            attendance,
            names,
            normalizer,
        }
    }

    /// Window from the start date's midnight up to the midnight after the end date
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> CrewResult<ReportWindow> {
        if end < start {
            return Err(ValidationError::field("endDate", "must not be before startDate").into());
        }
        let day_after = end
            .succ_opt()
            .ok_or_else(|| ValidationError::field("endDate", "is out of range"))?;
        Ok(ReportWindow {
            from: self.normalizer.normalize(IncomingTimestamp::DateOnly(start)),
            until: self.normalizer.normalize(IncomingTimestamp::DateOnly(day_after)),
        })
    }

    pub async fn generate(&self, request: ReportRequest) -> CrewResult<AttendanceReport> {
        let generated_at = self.normalizer.now();
        let start_date = match request.start_date {
            Some(date) => date,
            None => default_report_start()
                .ok_or_else(|| CrewError::Internal("invalid default report start".to_string()))?,
        };
        let end_date = request.end_date.unwrap_or_else(|| generated_at.date_naive());
        let window = self.window(start_date, end_date)?;

        let records = self
            .attendance
            .query_attendance(&AttendanceQuery {
                from: window.from,
                until: window.until,
                personnel_id: request.personnel_id,
                job_id: request.job_id,
            })
            .await?;

        let personnel_ids: Vec<RecordId> = records
            .iter()
            .map(|r| r.personnel_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let job_ids: Vec<RecordId> = records
            .iter()
            .map(|r| r.job_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let names = NameTable {
            personnel: self.names.personnel_names(&personnel_ids).await?,
            jobs: self.names.job_names(&job_ids).await?,
        };

        let tree = aggregate(&records, request.group_by, &names)?;

        tracing::info!(
            group_by = %request.group_by,
            records = records.len(),
            groups = tree.groups.len(),
            total_earnings = %tree.total_earnings,
            "Attendance report generated"
        );

        Ok(AttendanceReport {
            filter: ReportFilter {
                start_date,
                end_date,
                personnel_id: request.personnel_id,
                job_id: request.job_id,
            },
            window,
            generated_at,
            tree,
        })
    }
}
