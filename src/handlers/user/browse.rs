// handlers/user/browse.rs - read-only catalogue for users

use axum::extract::{Path, State};
use uuid::Uuid;

use crate::database::Filter;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{public, Company, Provider, Public, ServiceEntry};
use crate::state::AppState;

pub async fn companies_list(State(state): State<AppState>) -> ApiResult<Vec<Company>> {
    let companies = state.collection::<Company>().find(Filter::all()).await?;
    Ok(ApiResponse::success(companies))
}

pub async fn company_providers(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Vec<Public<Provider>>> {
    state.collection::<Company>().find_404(Filter::by_id(company_id), "Company").await?;
    let providers = state
        .collection::<Provider>()
        .find(Filter::all().eq("company_id", company_id.to_string()))
        .await?;
    Ok(ApiResponse::success(public(providers)))
}

pub async fn provider_services(
    State(state): State<AppState>,
    Path(provider_id): Path<Uuid>,
) -> ApiResult<Vec<ServiceEntry>> {
    let provider = state.collection::<Provider>().find_404(Filter::by_id(provider_id), "Provider").await?;
    Ok(ApiResponse::success(provider.service_entries()))
}
