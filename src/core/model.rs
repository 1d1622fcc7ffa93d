//! Domain records and enumerations
//!
//! Money and quantities are exact [`Decimal`]s. JSON field names are camelCase.

use crate::core::entity::RecordId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError as FieldRuleError};

crate::string_enum! {
    /// How an expense, earning, or personnel payment was paid
    pub enum PaymentMethod("payment method") {
        Cash => "cash",
        Transfer => "transfer",
        Card => "card",
    }
}

crate::string_enum! {
    /// Who paid an expense or a personnel payment
    pub enum Payer("payer") {
        Omer => "Omer",
        Baris => "Baris",
        Kasa => "Kasa",
    }
}

crate::string_enum! {
    /// Settlement state of an expense
    pub enum PaymentStatus("payment status") {
        Paid => "paid",
        Unpaid => "unpaid",
    }
}

crate::string_enum! {
    /// Currency or commodity a job's income was received in
    pub enum IncomeMethod("income payment method") {
        Try => "TRY",
        Usd => "USD",
        Eur => "EUR",
        Gold => "GOLD",
    }
}

crate::string_enum! {
    /// Gold coin denomination for income paid in gold
    pub enum GoldType("gold type") {
        Gram => "gram",
        Quarter => "quarter",
        Full => "full",
    }
}

crate::string_enum! {
    pub enum Role("role") {
        SuperAdmin => "SUPER_ADMIN",
        Viewer => "VIEWER",
        Foreman => "FOREMAN",
    }
}

impl PaymentStatus {
    pub fn toggled(self) -> Self {
        match self {
            PaymentStatus::Paid => PaymentStatus::Unpaid,
            PaymentStatus::Unpaid => PaymentStatus::Paid,
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

/// Soft-delete state of a ledger expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Active,
    Deleted { at: DateTime<Utc> },
}

impl Lifecycle {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Lifecycle::Deleted { .. })
    }

    /// Nullable column / JSON form
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Lifecycle::Active => None,
            Lifecycle::Deleted { at } => Some(*at),
        }
    }

    pub fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            None => Lifecycle::Active,
            Some(at) => Lifecycle::Deleted { at },
        }
    }
}

mod deleted_at {
    use super::Lifecycle;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(lifecycle: &Lifecycle, serializer: S) -> Result<S::Ok, S::Error> {
        lifecycle.deleted_at().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Lifecycle, D::Error> {
        Option::<DateTime<Utc>>::deserialize(deserializer).map(Lifecycle::from_deleted_at)
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), FieldRuleError> {
    if value.trim().is_empty() {
        let mut err = FieldRuleError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn non_negative(value: &Decimal) -> Result<(), FieldRuleError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = FieldRuleError::new("negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn positive(value: &Decimal) -> Result<(), FieldRuleError> {
    if *value <= Decimal::ZERO {
        let mut err = FieldRuleError::new("not_positive");
        err.message = Some("must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}

// =============================================================================
// Reference data
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: RecordId,
    pub name: String,
    pub contact_info: Option<String>,
    pub address: Option<String>,
    pub job_description: Option<String>,
}

crate::impl_entity!(Customer, "customers", "customer");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personnel {
    #[serde(default)]
    pub id: RecordId,
    pub full_name: String,
    pub note: Option<String>,
    pub note_updated_at: Option<DateTime<Utc>>,
}

crate::impl_entity!(Personnel, "personnel", "personnel");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelPayment {
    #[serde(default)]
    pub id: RecordId,
    pub personnel_id: RecordId,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub job_id: Option<RecordId>,
    pub payer: Payer,
    pub payment_method: PaymentMethod,
}

crate::impl_entity!(PersonnelPayment, "personnel_payments", "personnel payment");

/// Login account; the password never leaves the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: RecordId,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub role: Role,
}

crate::impl_entity!(User, "users", "user");

// =============================================================================
// Jobs and their children
// =============================================================================

/// Parent record owning an earnings set and a materials set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default)]
    pub id: RecordId,
    pub customer_id: RecordId,
    pub location: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub income: Decimal,
    pub income_payment_method: Option<IncomeMethod>,
    pub income_gold_type: Option<GoldType>,
}

crate::impl_entity!(Job, "jobs", "job");

/// Wage paid to one person for one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Earning {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub job_id: RecordId,
    pub personnel_id: RecordId,
    #[validate(custom(function = "non_negative"))]
    pub payment: Decimal,
    #[validate(range(min = 0, message = "must not be negative"))]
    #[serde(default)]
    pub days_worked: i32,
    pub payment_method: Option<PaymentMethod>,
}

crate::impl_entity!(Earning, "earnings", "earning");
crate::impl_child_record!(Earning, job_id);

/// Material consumed by a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub job_id: RecordId,
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    pub unit: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub quantity: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub unit_price: Decimal,
}

crate::impl_entity!(Material, "materials", "material");
crate::impl_child_record!(Material, job_id);

/// A job with its children loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub earnings: Vec<Earning>,
    pub materials: Vec<Material>,
}

// =============================================================================
// Attendance and expenses
// =============================================================================

/// One day of work by one person on one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    #[serde(default)]
    pub id: RecordId,
    pub personnel_id: RecordId,
    pub job_id: RecordId,
    pub date: DateTime<Utc>,
    pub daily_wage: Decimal,
    pub location: Option<String>,
    pub description: Option<String>,
}

crate::impl_entity!(Attendance, "attendance", "attendance");

/// Shared expense with a reversible soft delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default)]
    pub id: RecordId,
    pub description: String,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub payer: Payer,
    pub status: PaymentStatus,
    #[serde(rename = "deletedAt", with = "deleted_at", default)]
    pub lifecycle: Lifecycle,
}

crate::impl_entity!(Expense, "expenses", "expense");
