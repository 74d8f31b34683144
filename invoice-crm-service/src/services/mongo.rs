use crate::models::{Company, Invoice};
use crate::services::store::{duplicate_company, CrmStore};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for invoice-crm-service");

        let name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .name("name_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.companies()
            .create_index(name_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create name index on companies collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on companies.name");

        let company_index = IndexModel::builder()
            .keys(doc! { "company": 1 })
            .options(
                IndexOptions::builder()
                    .name("company_lookup".to_string())
                    .build(),
            )
            .build();

        self.invoices()
            .create_index(company_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create company index on invoices collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on invoices.company");

        Ok(())
    }

    pub fn companies(&self) -> Collection<Company> {
        self.db.collection("companies")
    }

    pub fn invoices(&self) -> Collection<Invoice> {
        self.db.collection("invoices")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl CrmStore for MongoStore {
    async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        let cursor = self.companies().find(None, None).await.map_err(|e| {
            tracing::error!("Failed to list companies: {}", e);
            AppError::from(e)
        })?;

        cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect companies: {}", e);
            AppError::from(e)
        })
    }

    async fn insert_company(&self, company: &Company) -> Result<(), AppError> {
        match self.companies().insert_one(company, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => {
                tracing::warn!(name = %company.name, error = %e, "Duplicate company name rejected");
                Err(duplicate_company(&company.name))
            }
            Err(e) => {
                tracing::error!("Failed to insert company: {}", e);
                Err(AppError::from(e))
            }
        }
    }

    async fn find_company(&self, id: &ObjectId) -> Result<Option<Company>, AppError> {
        self.companies()
            .find_one(doc! { "_id": *id }, None)
            .await
            .map_err(|e| {
                tracing::error!(company_id = %id, "Failed to find company: {}", e);
                AppError::from(e)
            })
    }

    async fn list_invoices_for_company(
        &self,
        company_id: &ObjectId,
    ) -> Result<Vec<Invoice>, AppError> {
        let cursor = self
            .invoices()
            .find(doc! { "company": *company_id }, None)
            .await
            .map_err(|e| {
                tracing::error!(company_id = %company_id, "Failed to list invoices: {}", e);
                AppError::from(e)
            })?;

        cursor.try_collect().await.map_err(|e| {
            tracing::error!(company_id = %company_id, "Failed to collect invoices: {}", e);
            AppError::from(e)
        })
    }

    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), AppError> {
        self.invoices()
            .insert_one(invoice, None)
            .await
            .map_err(|e| {
                tracing::error!(invoice_id = %invoice.id, "Failed to insert invoice: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
