use crate::models::{Company, Invoice};
use crate::services::store::{duplicate_company, CrmStore};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// In-process store with the same observable rules as [`MongoStore`]:
/// insertion order, unique company names, no referential checks.
///
/// [`MongoStore`]: crate::services::MongoStore
#[derive(Default)]
pub struct MemoryStore {
    companies: RwLock<Vec<Company>>,
    invoices: RwLock<Vec<Invoice>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with a database error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn company_count(&self) -> usize {
        self.companies.read().await.len()
    }

    pub async fn invoice_count(&self) -> usize {
        self.invoices.read().await.len()
    }

    fn ensure_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "memory store marked unavailable"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CrmStore for MemoryStore {
    async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        self.ensure_available()?;
        Ok(self.companies.read().await.clone())
    }

    async fn insert_company(&self, company: &Company) -> Result<(), AppError> {
        self.ensure_available()?;
        let mut companies = self.companies.write().await;
        if companies.iter().any(|c| c.name == company.name) {
            return Err(duplicate_company(&company.name));
        }
        companies.push(company.clone());
        Ok(())
    }

    async fn find_company(&self, id: &ObjectId) -> Result<Option<Company>, AppError> {
        self.ensure_available()?;
        Ok(self
            .companies
            .read()
            .await
            .iter()
            .find(|c| &c.id == id)
            .cloned())
    }

    async fn list_invoices_for_company(
        &self,
        company_id: &ObjectId,
    ) -> Result<Vec<Invoice>, AppError> {
        self.ensure_available()?;
        Ok(self
            .invoices
            .read()
            .await
            .iter()
            .filter(|i| &i.company == company_id)
            .cloned()
            .collect())
    }

    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), AppError> {
        self.ensure_available()?;
        self.invoices.write().await.push(invoice.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.ensure_available()
    }
}
