//! Request payloads and their conversion into records
//!
//! Field rules are declared with `validator`; rules spanning several fields
//! and timestamp normalization happen in the `into_*` conversions. Existence
//! of referenced records is checked by the caller, which owns the stores.

use crate::core::entity::{RecordId, UNASSIGNED};
use crate::core::error::ValidationError;
use crate::core::model::{
    Attendance, Customer, Expense, GoldType, IncomeMethod, Job, Lifecycle, Payer, PaymentMethod,
    PaymentStatus, Personnel, PersonnelPayment, non_negative, not_blank, positive,
};
use crate::core::timestamp::{IncomingTimestamp, TimestampNormalizer};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

fn non_blank_text(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}

impl CustomerInput {
    pub fn into_customer(self, id: RecordId) -> Customer {
        Customer {
            id,
            name: self.name.trim().to_string(),
            contact_info: self.contact_info,
            address: self.address,
            job_description: self.job_description,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelInput {
    #[validate(custom(function = "not_blank"))]
    pub full_name: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl PersonnelInput {
    /// The note timestamp is refreshed whenever a note is present
    pub fn into_personnel(self, id: RecordId, now: DateTime<Utc>) -> Personnel {
        let note = non_blank_text(self.note);
        Personnel {
            id,
            full_name: self.full_name.trim().to_string(),
            note_updated_at: note.as_ref().map(|_| now),
            note,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    pub customer_id: RecordId,
    #[validate(custom(function = "not_blank"))]
    pub location: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[serde(default)]
    pub date: IncomingTimestamp,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub income: Decimal,
    #[serde(default)]
    pub income_payment_method: Option<IncomeMethod>,
    #[serde(default)]
    pub income_gold_type: Option<GoldType>,
}

impl JobInput {
    /// Gold income needs a gold type; any other method drops it
    pub fn into_job(
        self,
        id: RecordId,
        normalizer: &TimestampNormalizer,
    ) -> Result<Job, ValidationError> {
        let income_gold_type = match self.income_payment_method {
            Some(IncomeMethod::Gold) => Some(self.income_gold_type.ok_or_else(|| {
                ValidationError::field(
                    "incomeGoldType",
                    "is required when the income is paid in GOLD",
                )
            })?),
            _ => None,
        };

        Ok(Job {
            id,
            customer_id: self.customer_id,
            location: self.location.trim().to_string(),
            description: self.description.trim().to_string(),
            date: normalizer.normalize(self.date),
            income: self.income,
            income_payment_method: self.income_payment_method,
            income_gold_type,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceInput {
    pub personnel_id: RecordId,
    pub job_id: RecordId,
    #[serde(default)]
    pub date: IncomingTimestamp,
    #[validate(custom(function = "non_negative"))]
    pub daily_wage: Decimal,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl AttendanceInput {
    /// Attendance never defaults its date to "now"
    pub fn into_attendance(
        self,
        id: RecordId,
        normalizer: &TimestampNormalizer,
    ) -> Result<Attendance, ValidationError> {
        let date = normalizer
            .normalize_required(self.date)
            .ok_or_else(|| ValidationError::field("date", "is required"))?;
        Ok(Attendance {
            id,
            personnel_id: self.personnel_id,
            job_id: self.job_id,
            date,
            daily_wage: self.daily_wage,
            location: non_blank_text(self.location),
            description: non_blank_text(self.description),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInput {
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[validate(custom(function = "positive"))]
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payer: Payer,
    #[serde(default)]
    pub status: PaymentStatus,
}

impl ExpenseInput {
    /// New expenses are dated by the server and start active
    pub fn into_expense(self, now: DateTime<Utc>) -> Expense {
        Expense {
            id: UNASSIGNED,
            description: self.description.trim().to_string(),
            amount: self.amount,
            date: now,
            payment_method: self.payment_method,
            payer: self.payer,
            status: self.status,
            lifecycle: Lifecycle::Active,
        }
    }

    /// Copy the editable fields onto an existing expense
    pub fn apply_to(self, expense: &mut Expense) {
        expense.description = self.description.trim().to_string();
        expense.amount = self.amount;
        expense.payment_method = self.payment_method;
        expense.payer = self.payer;
        expense.status = self.status;
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub personnel_id: RecordId,
    #[validate(custom(function = "positive"))]
    pub amount: Decimal,
    #[serde(default)]
    pub job_id: Option<RecordId>,
    pub payer: Payer,
    pub payment_method: PaymentMethod,
}

impl PaymentInput {
    pub fn into_payment(self, now: DateTime<Utc>) -> PersonnelPayment {
        PersonnelPayment {
            id: UNASSIGNED,
            personnel_id: self.personnel_id,
            amount: self.amount,
            date: now,
            job_id: self.job_id,
            payer: self.payer,
            payment_method: self.payment_method,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}
