// handlers/public/register.rs - POST /auth/user/register

use axum::extract::State;

use crate::database::Filter;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::models::{NewUser, Public, User};
use crate::state::AppState;

/// Create a user account. Emails are unique across users.
pub async fn user_register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewUser>,
) -> ApiResult<Public<User>> {
    let email = request.validate()?;
    let users = state.collection::<User>();

    if users.find_one(Filter::all().eq("email", email.as_str())).await?.is_some() {
        return Err(ApiError::conflict("An account with this email already exists"));
    }

    let password_hash = state.hasher.hash(&request.password)?;
    let user = request.into_user(email, password_hash, state.now());
    users.insert(&user).await?;

    tracing::info!("Registered user {} ({})", user.id, user.email);
    Ok(ApiResponse::created(Public(user)))
}
