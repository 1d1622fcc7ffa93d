//! Shared test harness for storage backend testing
//!
//! Provides record fixtures and two macro-generated suites:
//! - `store_contract_tests!` checks every persistence port of a backend
//! - `rest_integration_tests!` drives the same backend through the HTTP API
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! store_contract_tests!(InMemoryStore::new());
//! ```

#![allow(dead_code)]


#[macro_use]
pub mod rest_tests;

use chrono::{DateTime, Utc};
use crewbook::config::AppConfig;
use crewbook::core::entity::UNASSIGNED;
use crewbook::core::model::{
    Attendance, Customer, Earning, Expense, Job, Lifecycle, Material, Payer, PaymentMethod,
    PaymentStatus, Personnel, Role, User,
};
use crewbook::core::retry::RetryPolicy;
use crewbook::core::RecordId;
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

pub fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

pub fn at(value: &str) -> DateTime<Utc> {
    value.parse().expect("valid RFC 3339 literal")
}

/// Default configuration with a retry budget that never sleeps
pub fn test_config() -> AppConfig {
    AppConfig {
        retry: RetryPolicy::immediate(2),
        ..AppConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Record fixtures (ids left for the store to assign)
// ---------------------------------------------------------------------------

pub fn customer(name: &str) -> Customer {
    Customer {
        id: UNASSIGNED,
        name: name.to_string(),
        contact_info: Some("0555 000 00 00".to_string()),
        address: None,
        job_description: None,
    }
}

pub fn personnel(full_name: &str) -> Personnel {
    Personnel {
        id: UNASSIGNED,
        full_name: full_name.to_string(),
        note: None,
        note_updated_at: None,
    }
}

pub fn job(customer_id: RecordId, description: &str) -> Job {
    Job {
        id: UNASSIGNED,
        customer_id,
        location: "Kadikoy".to_string(),
        description: description.to_string(),
        date: at("2025-10-01T06:00:00Z"),
        income: dec("15000.50"),
        income_payment_method: None,
        income_gold_type: None,
    }
}

pub fn earning(personnel_id: RecordId, payment: &str) -> Earning {
    Earning {
        id: UNASSIGNED,
        job_id: UNASSIGNED,
        personnel_id,
        payment: dec(payment),
        days_worked: 1,
        payment_method: Some(PaymentMethod::Transfer),
    }
}

pub fn material(name: &str, quantity: &str) -> Material {
    Material {
        id: UNASSIGNED,
        job_id: UNASSIGNED,
        name: name.to_string(),
        unit: Some("bag".to_string()),
        quantity: dec(quantity),
        unit_price: dec("12.75"),
    }
}

pub fn attendance(personnel_id: RecordId, job_id: RecordId, date: &str, wage: &str) -> Attendance {
    Attendance {
        id: UNASSIGNED,
        personnel_id,
        job_id,
        date: at(date),
        daily_wage: dec(wage),
        location: None,
        description: None,
    }
}

pub fn expense(description: &str, amount: &str, date: &str) -> Expense {
    Expense {
        id: UNASSIGNED,
        description: description.to_string(),
        amount: dec(amount),
        date: at(date),
        payment_method: PaymentMethod::Cash,
        payer: Payer::Kasa,
        status: PaymentStatus::Unpaid,
        lifecycle: Lifecycle::Active,
    }
}

pub fn user(username: &str, password: &str) -> User {
    User {
        id: UNASSIGNED,
        name: format!("{} (test)", username),
        username: username.to_string(),
        password: password.to_string(),
        role: Role::SuperAdmin,
    }
}

// ---------------------------------------------------------------------------
// Assertion helpers
// ---------------------------------------------------------------------------

/// Assert that a list contains exactly `n` items.
pub fn assert_count<T>(list: &[T], expected: usize) {
    assert_eq!(
        list.len(),
        expected,
        "Expected {} items, got {}",
        expected,
        list.len()
    );
}

/// Assert that a JSON error body carries the expected code.
pub fn assert_error_code(body: &serde_json::Value, expected: &str) {
    assert_eq!(
        body["code"], expected,
        "Expected error code '{}', got body {}",
        expected, body
    );
}
