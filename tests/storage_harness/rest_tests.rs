//! REST integration test macro for storage backends.
//!
//! The `rest_integration_tests!` macro builds the full router over a backend
//! and drives it through `axum_test`:
//! JSON → HTTP request → handler → service → store → HTTP response → JSON.
//!
//! # Generated Tests
//!
//! ## Jobs and child sets
//! - `test_rest_replace_earnings`: bulk replace swaps the set, GET reflects it
//! - `test_rest_invalid_material_rejects_batch`: 400 with indexed field, set unchanged
//! - `test_rest_bulk_on_unknown_job`: 404
//! - `test_rest_gold_income_requires_type`: 400 on `incomeGoldType`
//! - `test_rest_job_requires_existing_customer`: 400 on `customerId`
//! - `test_rest_job_detail_and_delete`: detail carries children, delete → 404
//! - `test_rest_customer_with_jobs_conflict`: 409
//!
//! ## Single materials
//! - `test_rest_material_create_update_delete`: 201, 200, 204, then 404
//! - `test_rest_material_requires_existing_job`: 400 on `jobId`, nothing written
//! - `test_rest_material_requires_name`: 400 on `name` for create and update
//! - `test_rest_material_missing_id`: PUT and DELETE → 404
//!
//! ## Expenses
//! - `test_rest_expense_lifecycle`: soft delete, restore, permanent delete
//! - `test_rest_expense_status_toggle`
//! - `test_rest_expense_amount_must_be_positive`
//!
//! ## Attendance and reports
//! - `test_rest_attendance_date_normalization`: date-only and offset-less input
//! - `test_rest_attendance_requires_date`
//! - `test_rest_report_totals`
//! - `test_rest_report_empty_window`: 404 NO_MATCHING_RECORDS
//! - `test_rest_report_bad_group_by`: 400
//!
//! ## Misc
//! - `test_rest_health`, `test_rest_login`, `test_rest_data_all`, `test_rest_invalid_json`
#[macro_export]
macro_rules! rest_integration_tests {
    ($factory:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use crewbook::server::ServerBuilder;
            use serde_json::{Value, json};

            fn make_server<B: crewbook::core::Backend>(store: B) -> TestServer {
                let router = ServerBuilder::new()
                    .with_config(test_config())
                    .with_backend(store)
                    .build()
                    .unwrap();
                TestServer::try_new(router).unwrap()
            }

            async fn post_json(server: &TestServer, path: &str, body: Value) -> Value {
                let response = server.post(path).json(&body).await;
                response.assert_status(StatusCode::CREATED);
                response.json()
            }

            /// Customer + job + two personnel; returns (job id, [personnel ids])
            async fn seed_job(server: &TestServer) -> (i64, [i64; 2]) {
                let owner = post_json(server, "/api/customers", json!({ "name": "Acme" })).await;
                let job = post_json(
                    server,
                    "/api/jobs",
                    json!({
                        "customerId": owner["id"],
                        "location": "Kadikoy",
                        "description": "Roof repair",
                        "date": "2025-10-01",
                        "income": "15000.50",
                        "incomePaymentMethod": "TRY"
                    }),
                )
                .await;
                let ali = post_json(server, "/api/personnel", json!({ "fullName": "Ali" })).await;
                let veli = post_json(server, "/api/personnel", json!({ "fullName": "Veli" })).await;
                (
                    job["id"].as_i64().unwrap(),
                    [ali["id"].as_i64().unwrap(), veli["id"].as_i64().unwrap()],
                )
            }

            fn field_names(body: &Value) -> Vec<String> {
                body["details"]["fields"]
                    .as_array()
                    .map(|fields| {
                        fields
                            .iter()
                            .filter_map(|f| f["field"].as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default()
            }

            // ==============================================================
            // Jobs and child sets
            // ==============================================================

            #[tokio::test]
            async fn test_rest_replace_earnings() {
                let server = make_server($factory);
                let (job_id, [ali, veli]) = seed_job(&server).await;
                let path = format!("/api/jobs/{}/earnings/bulk", job_id);

                server
                    .post(&path)
                    .json(&json!([
                        { "personnelId": ali, "payment": "100", "daysWorked": 1, "paymentMethod": "cash" },
                        { "personnelId": veli, "payment": "50", "daysWorked": 1 }
                    ]))
                    .await
                    .assert_status_ok();

                let response = server
                    .post(&path)
                    .json(&json!([
                        { "id": 9999, "personnelId": ali, "payment": "75", "daysWorked": 2, "paymentMethod": "transfer" }
                    ]))
                    .await;
                response.assert_status_ok();
                let persisted: Value = response.json();
                assert_eq!(persisted.as_array().unwrap().len(), 1);
                assert_ne!(persisted[0]["id"], 9999);
                assert_eq!(persisted[0]["jobId"], job_id);

                let current: Value = server
                    .get(&format!("/api/jobs/{}/earnings", job_id))
                    .await
                    .json();
                assert_eq!(current, persisted);
                assert_eq!(current[0]["payment"], "75");
                assert_eq!(current[0]["daysWorked"], 2);
            }

            #[tokio::test]
            async fn test_rest_invalid_material_rejects_batch() {
                let server = make_server($factory);
                let (job_id, _) = seed_job(&server).await;
                let path = format!("/api/jobs/{}/materials/bulk", job_id);

                server
                    .post(&path)
                    .json(&json!([
                        { "name": "Cement", "unit": "bag", "quantity": "3", "unitPrice": "12.75" }
                    ]))
                    .await
                    .assert_status_ok();

                let response = server
                    .post(&path)
                    .json(&json!([
                        { "name": "", "quantity": "1", "unitPrice": "1" },
                        { "name": "Sand", "quantity": "2", "unitPrice": "4" }
                    ]))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_error_code(&body, "VALIDATION_ERROR");
                assert_eq!(field_names(&body), vec!["[0].name".to_string()]);

                let current: Value = server
                    .get(&format!("/api/jobs/{}/materials", job_id))
                    .await
                    .json();
                let names: Vec<_> = current
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|m| m["name"].as_str().unwrap().to_string())
                    .collect();
                assert_eq!(names, vec!["Cement".to_string()]);
            }

            #[tokio::test]
            async fn test_rest_bulk_on_unknown_job() {
                let server = make_server($factory);
                let response = server
                    .post("/api/jobs/424242/materials/bulk")
                    .json(&json!([]))
                    .await;
                response.assert_status(StatusCode::NOT_FOUND);
                assert_error_code(&response.json(), "ENTITY_NOT_FOUND");

                server
                    .get("/api/jobs/424242/earnings")
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_gold_income_requires_type() {
                let server = make_server($factory);
                let owner = post_json(&server, "/api/customers", json!({ "name": "Acme" })).await;

                let response = server
                    .post("/api/jobs")
                    .json(&json!({
                        "customerId": owner["id"],
                        "location": "Sisli",
                        "description": "Kitchen",
                        "income": "3",
                        "incomePaymentMethod": "GOLD"
                    }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(field_names(&response.json()), vec!["incomeGoldType".to_string()]);

                let job = post_json(
                    &server,
                    "/api/jobs",
                    json!({
                        "customerId": owner["id"],
                        "location": "Sisli",
                        "description": "Kitchen",
                        "income": "3",
                        "incomePaymentMethod": "USD",
                        "incomeGoldType": "gram"
                    }),
                )
                .await;
                assert_eq!(job["incomeGoldType"], Value::Null);
            }

            #[tokio::test]
            async fn test_rest_job_requires_existing_customer() {
                let server = make_server($factory);
                let response = server
                    .post("/api/jobs")
                    .json(&json!({
                        "customerId": 424242,
                        "location": "Sisli",
                        "description": "Kitchen"
                    }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(field_names(&response.json()), vec!["customerId".to_string()]);
            }

            #[tokio::test]
            async fn test_rest_job_detail_and_delete() {
                let server = make_server($factory);
                let (job_id, [ali, _]) = seed_job(&server).await;
                server
                    .post(&format!("/api/jobs/{}/earnings/bulk", job_id))
                    .json(&json!([{ "personnelId": ali, "payment": "100" }]))
                    .await
                    .assert_status_ok();

                let detail: Value = server.get(&format!("/api/jobs/{}", job_id)).await.json();
                assert_eq!(detail["id"], job_id);
                assert_eq!(detail["income"], "15000.50");
                assert_eq!(detail["date"], "2025-10-01T00:00:00Z");
                assert_eq!(detail["earnings"].as_array().unwrap().len(), 1);
                assert!(detail["materials"].as_array().unwrap().is_empty());

                server
                    .delete(&format!("/api/jobs/{}", job_id))
                    .await
                    .assert_status(StatusCode::NO_CONTENT);
                server
                    .get(&format!("/api/jobs/{}", job_id))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
                server
                    .delete(&format!("/api/jobs/{}", job_id))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_customer_with_jobs_conflict() {
                let server = make_server($factory);
                let (job_id, _) = seed_job(&server).await;
                let job: Value = server.get(&format!("/api/jobs/{}", job_id)).await.json();
                let customer_path = format!("/api/customers/{}", job["customerId"]);

                let response = server.delete(&customer_path).await;
                response.assert_status(StatusCode::CONFLICT);
                assert_error_code(&response.json(), "INTEGRITY_ERROR");

                server.delete(&format!("/api/jobs/{}", job_id)).await;
                server
                    .delete(&customer_path)
                    .await
                    .assert_status(StatusCode::NO_CONTENT);
            }

            // ==============================================================
            // Single materials
            // ==============================================================

            #[tokio::test]
            async fn test_rest_material_create_update_delete() {
                let server = make_server($factory);
                let (job_id, _) = seed_job(&server).await;

                let created = post_json(
                    &server,
                    "/api/materials",
                    json!({
                        "jobId": job_id,
                        "name": "Cement",
                        "unit": "bag",
                        "quantity": "4",
                        "unitPrice": "12.75"
                    }),
                )
                .await;
                let id = created["id"].as_i64().unwrap();
                assert_eq!(created["jobId"], job_id);
                assert_eq!(created["unitPrice"], "12.75");

                let response = server
                    .put(&format!("/api/materials/{}", id))
                    .json(&json!({
                        "id": id,
                        "jobId": job_id,
                        "name": "White cement",
                        "quantity": "6",
                        "unitPrice": "14"
                    }))
                    .await;
                response.assert_status_ok();
                let updated: Value = response.json();
                assert_eq!(updated["id"], id);
                assert_eq!(updated["name"], "White cement");
                assert!(updated["unit"].is_null());

                let listed: Value = server
                    .get(&format!("/api/jobs/{}/materials", job_id))
                    .await
                    .json();
                assert_eq!(listed.as_array().unwrap().len(), 1);
                assert_eq!(listed[0]["quantity"], "6");

                server
                    .delete(&format!("/api/materials/{}", id))
                    .await
                    .assert_status(StatusCode::NO_CONTENT);
                let response = server.delete(&format!("/api/materials/{}", id)).await;
                response.assert_status(StatusCode::NOT_FOUND);
                assert_error_code(&response.json(), "ENTITY_NOT_FOUND");
            }

            #[tokio::test]
            async fn test_rest_material_requires_existing_job() {
                let server = make_server($factory);
                let (job_id, _) = seed_job(&server).await;

                let response = server
                    .post("/api/materials")
                    .json(&json!({
                        "jobId": job_id + 100,
                        "name": "Cement",
                        "quantity": "1",
                        "unitPrice": "1"
                    }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(field_names(&response.json()), vec!["jobId"]);

                let listed: Value = server
                    .get(&format!("/api/jobs/{}/materials", job_id))
                    .await
                    .json();
                assert!(listed.as_array().unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_rest_material_requires_name() {
                let server = make_server($factory);
                let (job_id, _) = seed_job(&server).await;
                let body = |name: &str| {
                    json!({ "jobId": job_id, "name": name, "quantity": "1", "unitPrice": "1" })
                };

                let response = server.post("/api/materials").json(&body("   ")).await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(field_names(&response.json()), vec!["name"]);

                let created = post_json(&server, "/api/materials", body("Sand")).await;
                let response = server
                    .put(&format!("/api/materials/{}", created["id"]))
                    .json(&body(""))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(field_names(&response.json()), vec!["name"]);
            }

            #[tokio::test]
            async fn test_rest_material_missing_id() {
                let server = make_server($factory);
                let (job_id, _) = seed_job(&server).await;

                let response = server
                    .put("/api/materials/4242")
                    .json(&json!({ "jobId": job_id, "name": "Sand", "quantity": "1", "unitPrice": "1" }))
                    .await;
                response.assert_status(StatusCode::NOT_FOUND);
                assert_error_code(&response.json(), "ENTITY_NOT_FOUND");

                server
                    .delete("/api/materials/4242")
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            // ==============================================================
            // Expenses
            // ==============================================================

            fn expense_body(description: &str, amount: &str) -> Value {
                json!({
                    "description": description,
                    "amount": amount,
                    "paymentMethod": "cash",
                    "payer": "Omer"
                })
            }

            #[tokio::test]
            async fn test_rest_expense_lifecycle() {
                let server = make_server($factory);
                let created = post_json(&server, "/api/expenses", expense_body("Fuel", "500")).await;
                assert_eq!(created["status"], "unpaid");
                assert_eq!(created["deletedAt"], Value::Null);
                let path = format!("/api/expenses/{}", created["id"]);

                server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
                server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
                let active: Value = server.get("/api/expenses").await.json();
                assert!(active.as_array().unwrap().is_empty());
                let deleted: Value = server.get("/api/expenses/deleted").await.json();
                assert_eq!(deleted[0]["id"], created["id"]);
                assert!(deleted[0]["deletedAt"].is_string());

                server
                    .put(&path)
                    .json(&expense_body("Fuel", "600"))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);

                let restored = server.post(&format!("{}/restore", path)).await;
                restored.assert_status_ok();
                let restored: Value = restored.json();
                assert_eq!(restored["deletedAt"], Value::Null);
                assert_eq!(restored["amount"], "500");
                server
                    .post(&format!("{}/restore", path))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);

                server
                    .delete(&format!("{}/permanent", path))
                    .await
                    .assert_status(StatusCode::NO_CONTENT);
                server
                    .delete(&format!("{}/permanent", path))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_expense_status_toggle() {
                let server = make_server($factory);
                let created = post_json(&server, "/api/expenses", expense_body("Tea", "15")).await;
                let status_path = format!("/api/expenses/{}/status", created["id"]);

                let paid: Value = server.patch(&status_path).await.json();
                assert_eq!(paid["status"], "paid");

                server
                    .delete(&format!("/api/expenses/{}", created["id"]))
                    .await
                    .assert_status(StatusCode::NO_CONTENT);
                let toggled = server.patch(&status_path).await;
                toggled.assert_status_ok();
                let toggled: Value = toggled.json();
                assert_eq!(toggled["status"], "unpaid");
                assert!(toggled["deletedAt"].is_string());
            }

            #[tokio::test]
            async fn test_rest_expense_amount_must_be_positive() {
                let server = make_server($factory);
                let response = server
                    .post("/api/expenses")
                    .json(&expense_body("Nothing", "0"))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_error_code(&body, "VALIDATION_ERROR");
                assert_eq!(field_names(&body), vec!["amount".to_string()]);
            }

            // ==============================================================
            // Attendance and reports
            // ==============================================================

            async fn record_day(
                server: &TestServer,
                personnel_id: i64,
                job_id: i64,
                date: &str,
                wage: &str,
            ) -> Value {
                post_json(
                    server,
                    "/api/attendance",
                    json!({
                        "personnelId": personnel_id,
                        "jobId": job_id,
                        "date": date,
                        "dailyWage": wage
                    }),
                )
                .await
            }

            #[tokio::test]
            async fn test_rest_attendance_date_normalization() {
                let server = make_server($factory);
                let (job_id, [ali, _]) = seed_job(&server).await;

                let date_only = record_day(&server, ali, job_id, "2025-10-19", "100").await;
                assert_eq!(date_only["date"], "2025-10-19T00:00:00Z");

                let local = record_day(&server, ali, job_id, "2025-10-19T14:30:00", "100").await;
                assert_eq!(local["date"], "2025-10-19T11:30:00Z");

                let explicit = record_day(&server, ali, job_id, "2025-10-19T14:30:00Z", "100").await;
                assert_eq!(explicit["date"], "2025-10-19T14:30:00Z");

                let listed: Value = server
                    .get("/api/attendance")
                    .add_query_param("startDate", "2025-10-19")
                    .add_query_param("endDate", "2025-10-19")
                    .await
                    .json();
                let dates: Vec<_> = listed
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|r| r["date"].as_str().unwrap().to_string())
                    .collect();
                assert_eq!(
                    dates,
                    vec![
                        "2025-10-19T14:30:00Z".to_string(),
                        "2025-10-19T11:30:00Z".to_string(),
                        "2025-10-19T00:00:00Z".to_string(),
                    ]
                );
            }

            #[tokio::test]
            async fn test_rest_attendance_requires_date() {
                let server = make_server($factory);
                let (job_id, [ali, _]) = seed_job(&server).await;

                let response = server
                    .post("/api/attendance")
                    .json(&json!({ "personnelId": ali, "jobId": job_id, "dailyWage": "100" }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(field_names(&response.json()), vec!["date".to_string()]);

                let response = server
                    .post("/api/attendance")
                    .json(&json!({
                        "personnelId": 424242,
                        "jobId": job_id,
                        "date": "2025-10-19",
                        "dailyWage": "100"
                    }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(field_names(&response.json()), vec!["personnelId".to_string()]);
            }

            #[tokio::test]
            async fn test_rest_report_totals() {
                let server = make_server($factory);
                let (job_id, [ali, veli]) = seed_job(&server).await;
                record_day(&server, ali, job_id, "2025-10-19", "100").await;
                record_day(&server, veli, job_id, "2025-10-20", "150").await;

                let response = server
                    .get("/api/attendance/report")
                    .add_query_param("startDate", "2025-10-01")
                    .add_query_param("endDate", "2025-10-31")
                    .add_query_param("groupBy", "job")
                    .await;
                response.assert_status_ok();
                let report: Value = response.json();

                assert_eq!(report["groupBy"], "job");
                assert_eq!(report["totalEarnings"], "250");
                assert_eq!(report["totalDays"], 2);
                let groups = report["groups"].as_array().unwrap();
                assert_eq!(groups.len(), 1);
                assert_eq!(groups[0]["id"], job_id);
                assert_eq!(groups[0]["name"], "Roof repair");
                assert_eq!(groups[0]["lines"].as_array().unwrap().len(), 2);

                let by_person: Value = server
                    .get("/api/attendance/report")
                    .add_query_param("startDate", "2025-10-01")
                    .add_query_param("endDate", "2025-10-31")
                    .add_query_param("personnelId", ali)
                    .await
                    .json();
                assert_eq!(by_person["groupBy"], "personnel");
                assert_eq!(by_person["totalEarnings"], "100");
                assert_eq!(by_person["groups"][0]["name"], "Ali");
            }

            #[tokio::test]
            async fn test_rest_report_empty_window() {
                let server = make_server($factory);
                let (job_id, [ali, _]) = seed_job(&server).await;
                record_day(&server, ali, job_id, "2025-10-19", "100").await;

                let response = server
                    .get("/api/attendance/report")
                    .add_query_param("startDate", "2024-01-01")
                    .add_query_param("endDate", "2024-01-31")
                    .await;
                response.assert_status(StatusCode::NOT_FOUND);
                assert_error_code(&response.json(), "NO_MATCHING_RECORDS");
            }

            #[tokio::test]
            async fn test_rest_report_bad_group_by() {
                let server = make_server($factory);
                let response = server
                    .get("/api/attendance/report")
                    .add_query_param("groupBy", "customer")
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_error_code(&response.json(), "VALIDATION_ERROR");

                let response = server
                    .get("/api/attendance/report")
                    .add_query_param("startDate", "2025-10-31")
                    .add_query_param("endDate", "2025-10-01")
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
            }

            // ==============================================================
            // Misc
            // ==============================================================

            #[tokio::test]
            async fn test_rest_health() {
                let server = make_server($factory);
                for path in ["/health", "/healthz"] {
                    let response = server.get(path).await;
                    response.assert_status_ok();
                    let body: Value = response.json();
                    assert_eq!(body["status"], "ok");
                    assert_eq!(body["service"], "crewbook");
                }
            }

            #[tokio::test]
            async fn test_rest_login() {
                let store = $factory;
                store.add_user(user("usta", "s3cret")).await.unwrap();
                let server = make_server(store);

                let response = server
                    .post("/api/users/login")
                    .json(&json!({ "username": "usta", "password": "s3cret" }))
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["username"], "usta");
                assert_eq!(body["role"], "SUPER_ADMIN");
                assert!(body.get("password").is_none());

                let response = server
                    .post("/api/users/login")
                    .json(&json!({ "username": "usta", "password": "nope" }))
                    .await;
                response.assert_status(StatusCode::UNAUTHORIZED);
                assert_error_code(&response.json(), "UNAUTHORIZED");

                let users: Value = server.get("/api/users").await.json();
                assert_eq!(users.as_array().unwrap().len(), 1);
                assert!(users[0].get("password").is_none());
            }

            #[tokio::test]
            async fn test_rest_data_all() {
                let server = make_server($factory);
                let (job_id, [ali, _]) = seed_job(&server).await;
                record_day(&server, ali, job_id, "2025-10-19", "100").await;
                let kept = post_json(&server, "/api/expenses", expense_body("Fuel", "500")).await;
                let binned = post_json(&server, "/api/expenses", expense_body("Tea", "15")).await;
                server
                    .delete(&format!("/api/expenses/{}", binned["id"]))
                    .await
                    .assert_status(StatusCode::NO_CONTENT);

                let snapshot: Value = server.get("/api/data/all").await.json();
                assert_eq!(snapshot["customers"].as_array().unwrap().len(), 1);
                assert_eq!(snapshot["personnel"].as_array().unwrap().len(), 2);
                assert_eq!(snapshot["jobs"].as_array().unwrap().len(), 1);
                assert_eq!(snapshot["attendance"].as_array().unwrap().len(), 1);
                assert!(snapshot["personnelPayments"].as_array().unwrap().is_empty());
                let expense_ids: Vec<_> = snapshot["expenses"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|e| e["id"].clone())
                    .collect();
                assert_eq!(expense_ids.len(), 2);
                assert!(expense_ids.contains(&kept["id"]));
                assert!(expense_ids.contains(&binned["id"]));
            }

            #[tokio::test]
            async fn test_rest_invalid_json() {
                let server = make_server($factory);
                let response = server
                    .post("/api/customers")
                    .text("{ not json")
                    .content_type("application/json")
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_error_code(&response.json(), "VALIDATION_ERROR");

                let response = server
                    .post("/api/customers")
                    .json(&json!({ "name": "   " }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_eq!(field_names(&response.json()), vec!["name".to_string()]);
            }
        }
    };
}
