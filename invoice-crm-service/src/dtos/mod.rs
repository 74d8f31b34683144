pub mod coerce;
pub mod companies;
pub mod invoices;

pub use companies::{CompanyResponse, CreateCompanyRequest};
pub use invoices::{CreateInvoiceRequest, InvoiceResponse};
