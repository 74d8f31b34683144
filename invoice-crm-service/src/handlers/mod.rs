pub mod companies;
pub mod health;
pub mod invoices;

pub use companies::{create_company, get_company, list_companies};
pub use health::{health_check, liveness, metrics_endpoint, readiness_check};
pub use invoices::{create_invoice, list_company_invoices};
