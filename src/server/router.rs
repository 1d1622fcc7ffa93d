//! Route table

use super::handlers::{attendance, auth, customers, data, expenses, jobs, materials, personnel};
use super::state::AppState;
use axum::Json;
use axum::Router;
use axum::routing::{delete, get, patch, post, put};
use serde_json::{Value, json};

/// Build every `/api` route plus the health checks
pub fn build_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/users", get(auth::list_users))
        .route("/users/login", post(auth::login))
        .route("/data/all", get(data::load_all))
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/{id}",
            put(customers::update_customer).delete(customers::delete_customer),
        )
        .route(
            "/personnel",
            get(personnel::list_personnel).post(personnel::create_personnel),
        )
        .route(
            "/personnel/{id}",
            put(personnel::update_personnel).delete(personnel::delete_personnel),
        )
        .route("/personnel/payments", post(personnel::create_payment))
        .route("/personnel/payments/{id}", delete(personnel::delete_payment))
        .route("/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route(
            "/jobs/{id}",
            get(jobs::get_job).put(jobs::update_job).delete(jobs::delete_job),
        )
        .route("/jobs/{id}/earnings", get(jobs::list_earnings))
        .route("/jobs/{id}/earnings/bulk", post(jobs::replace_earnings))
        .route("/jobs/{id}/materials", get(jobs::list_materials))
        .route("/jobs/{id}/materials/bulk", post(jobs::replace_materials))
        .route("/materials", post(materials::create_material))
        .route(
            "/materials/{id}",
            put(materials::update_material).delete(materials::delete_material),
        )
        .route(
            "/attendance",
            get(attendance::list_attendance).post(attendance::create_attendance),
        )
        .route("/attendance/report", get(attendance::attendance_report))
        .route(
            "/attendance/{id}",
            get(attendance::get_attendance)
                .put(attendance::update_attendance)
                .delete(attendance::delete_attendance),
        )
        .route(
            "/expenses",
            get(expenses::list_expenses).post(expenses::create_expense),
        )
        .route("/expenses/deleted", get(expenses::list_deleted_expenses))
        .route(
            "/expenses/{id}",
            get(expenses::get_expense)
                .put(expenses::update_expense)
                .delete(expenses::soft_delete_expense),
        )
        .route("/expenses/{id}/status", patch(expenses::toggle_expense_status))
        .route("/expenses/{id}/restore", post(expenses::restore_expense))
        .route(
            "/expenses/{id}/permanent",
            delete(expenses::permanently_delete_expense),
        )
        .with_state(state);

    health_routes().nest("/api", api)
}

fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "crewbook"
    }))
}
