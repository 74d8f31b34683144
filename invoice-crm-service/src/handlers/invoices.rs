use crate::dtos::{CreateInvoiceRequest, InvoiceResponse};
use crate::middleware::JsonBody;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

pub async fn list_company_invoices(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<InvoiceResponse>>, AppError> {
    let invoices = state.crm.list_invoices(&company_id).await?;
    Ok(Json(invoices.into_iter().map(InvoiceResponse::from).collect()))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), AppError> {
    let invoice = state.crm.create_invoice(request).await?;
    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(invoice))))
}
