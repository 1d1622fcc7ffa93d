use crate::core::error::{CrewResult, RequestError};
use crate::core::input::LoginRequest;
use crate::core::model::User;
use crate::server::extract::ValidJson;
use crate::server::state::AppState;
use axum::Json;
use axum::extract::State;

/// Plaintext credential check; the password is not echoed back
pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> CrewResult<Json<User>> {
    match state
        .repos
        .users
        .find_by_credentials(&request.username, &request.password)
        .await?
    {
        Some(user) => {
            tracing::info!(user_id = user.id, role = %user.role, "Login succeeded");
            Ok(Json(user))
        }
        None => {
            tracing::warn!(username = %request.username, "Login rejected");
            Err(RequestError::Unauthorized {
                message: "invalid username or password".to_string(),
            }
            .into())
        }
    }
}

pub async fn list_users(State(state): State<AppState>) -> CrewResult<Json<Vec<User>>> {
    Ok(Json(state.repos.users.list_users().await?))
}
