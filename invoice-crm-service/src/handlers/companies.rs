use crate::dtos::{CompanyResponse, CreateCompanyRequest};
use crate::middleware::JsonBody;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

pub async fn list_companies(
    State(state): State<AppState>,
) -> Result<Json<Vec<CompanyResponse>>, AppError> {
    let companies = state.crm.list_companies().await?;
    Ok(Json(companies.into_iter().map(CompanyResponse::from).collect()))
}

pub async fn create_company(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyResponse>), AppError> {
    let company = state.crm.create_company(request).await?;
    Ok((StatusCode::CREATED, Json(CompanyResponse::from(company))))
}

pub async fn get_company(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<CompanyResponse>, AppError> {
    let company = state.crm.get_company(&company_id).await?;
    Ok(Json(CompanyResponse::from(company)))
}
