use crate::core::error::CrewResult;
use crate::core::model::{
    Attendance, Customer, Earning, Expense, Job, Material, Personnel, PersonnelPayment, User,
};
use crate::server::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

/// Every collection at once, for clients that load everything on start
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub users: Vec<User>,
    pub personnel: Vec<Personnel>,
    pub customers: Vec<Customer>,
    pub jobs: Vec<Job>,
    pub personnel_payments: Vec<PersonnelPayment>,
    /// Active and soft-deleted alike
    pub expenses: Vec<Expense>,
    pub attendance: Vec<Attendance>,
    pub earnings: Vec<Earning>,
    pub materials: Vec<Material>,
}

pub async fn load_all(State(state): State<AppState>) -> CrewResult<Json<Snapshot>> {
    let repos = &state.repos;
    Ok(Json(Snapshot {
        users: repos.users.list_users().await?,
        personnel: repos.personnel.list().await?,
        customers: repos.customers.list().await?,
        jobs: repos.jobs.list().await?,
        personnel_payments: repos.payments.list().await?,
        expenses: state.ledger.list_all().await?,
        attendance: repos.attendance.list().await?,
        earnings: repos.earnings.all_children().await?,
        materials: repos.materials.all_children().await?,
    }))
}
