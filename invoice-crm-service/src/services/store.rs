use crate::models::{Company, Invoice};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

/// Persistence for the two CRM collections.
///
/// Implementations report a duplicate company name as
/// `AppError::BadRequest` and every other fault as a server-side error.
#[async_trait]
pub trait CrmStore: Send + Sync {
    /// All companies in storage order.
    async fn list_companies(&self) -> Result<Vec<Company>, AppError>;

    async fn insert_company(&self, company: &Company) -> Result<(), AppError>;

    async fn find_company(&self, id: &ObjectId) -> Result<Option<Company>, AppError>;

    /// Invoices whose `company` field equals `company_id`, in storage order.
    async fn list_invoices_for_company(
        &self,
        company_id: &ObjectId,
    ) -> Result<Vec<Invoice>, AppError>;

    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

pub(crate) fn duplicate_company(name: &str) -> AppError {
    AppError::BadRequest(anyhow::anyhow!(
        "Company validation failed: name '{}' already exists",
        name
    ))
}
