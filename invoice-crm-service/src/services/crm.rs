//! Company and invoice operations shared by every execution mode.

use crate::config::CrmRules;
use crate::dtos::{CreateCompanyRequest, CreateInvoiceRequest};
use crate::models::invoice::CreateInvoice;
use crate::models::{Company, Invoice};
use crate::services::metrics;
use crate::services::store::CrmStore;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use validator::Validate;

#[derive(Clone)]
pub struct CrmService {
    store: Arc<dyn CrmStore>,
    verify_invoice_company: bool,
}

impl CrmService {
    pub fn new(store: Arc<dyn CrmStore>, rules: &CrmRules) -> Self {
        Self {
            store,
            verify_invoice_company: rules.verify_invoice_company,
        }
    }

    pub async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        observe("list_companies", self.store.list_companies()).await
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn create_company(&self, request: CreateCompanyRequest) -> Result<Company, AppError> {
        request.validate()?;
        let name = request.name.unwrap_or_default();

        let company = Company::new(name);
        observe("insert_company", self.store.insert_company(&company)).await?;

        metrics::record_company_created();
        tracing::info!(company_id = %company.id, name = %company.name, "Company created");
        Ok(company)
    }

    /// A malformed id is a server error, an unknown one is not-found.
    pub async fn get_company(&self, id: &str) -> Result<Company, AppError> {
        let object_id = ObjectId::parse_str(id).map_err(|e| {
            AppError::InternalError(anyhow::anyhow!(
                "Cast to ObjectId failed for value \"{}\": {}",
                id,
                e
            ))
        })?;

        observe("find_company", self.store.find_company(&object_id))
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Company not found")))
    }

    /// Returns an empty list for ids that cannot match any invoice.
    pub async fn list_invoices(&self, company_id: &str) -> Result<Vec<Invoice>, AppError> {
        let Ok(object_id) = ObjectId::parse_str(company_id) else {
            tracing::debug!(company_id = %company_id, "Malformed company id, no invoices can match");
            return Ok(Vec::new());
        };

        observe(
            "list_invoices",
            self.store.list_invoices_for_company(&object_id),
        )
        .await
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn create_invoice(&self, request: CreateInvoiceRequest) -> Result<Invoice, AppError> {
        let input = CreateInvoice::try_from(request)?;

        if self.verify_invoice_company
            && observe("find_company", self.store.find_company(&input.company))
                .await?
                .is_none()
        {
            return Err(AppError::BadRequest(anyhow::anyhow!("Company not found")));
        }

        let invoice = Invoice::new(input);
        observe("insert_invoice", self.store.insert_invoice(&invoice)).await?;

        metrics::record_invoice_created();
        tracing::info!(
            invoice_id = %invoice.id,
            company_id = %invoice.company,
            total = invoice.total,
            "Invoice created"
        );
        Ok(invoice)
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.store.health_check().await
    }
}

/// Times a store call and counts it when it fails for server-side reasons.
async fn observe<T, F>(operation: &'static str, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    let started = Instant::now();
    let result = call.await;
    metrics::record_store_duration(operation, started.elapsed());

    if let Err(e) = &result {
        if !e.is_client_error() {
            metrics::record_store_error(operation);
        }
    }
    result
}
