use crate::dtos::coerce;
use crate::models::invoice::CreateInvoice;
use crate::models::Invoice;
use chrono::SecondsFormat;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

/// Wire name of the company reference, used as the validation error key.
const COMPANY_ID_FIELD: &str = "companyId";

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    #[serde(rename = "companyId", default, deserialize_with = "coerce::text")]
    pub company_id: Option<String>,
    #[serde(rename = "invoiceNumber", default, deserialize_with = "coerce::text")]
    pub invoice_number: Option<String>,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub voucher: Option<f64>,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub voucher_nt: Option<f64>,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub voucher_ar: Option<f64>,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub total: Option<f64>,
}

fn validate_object_id(value: &str) -> Result<(), ValidationError> {
    ObjectId::parse_str(value).map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("object_id");
        err.message = Some(format!("company '{}' is not a valid id", value).into());
        err
    })
}

impl Validate for CreateInvoiceRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match self.company_id.as_deref() {
            None => {
                let mut err = ValidationError::new("required");
                err.message = Some("company is required".into());
                errors.add(COMPANY_ID_FIELD, err);
            }
            Some(id) => {
                if let Err(err) = validate_object_id(id) {
                    errors.add(COMPANY_ID_FIELD, err);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl TryFrom<CreateInvoiceRequest> for CreateInvoice {
    type Error = ValidationErrors;

    /// Validates the request and applies the zero defaults.
    fn try_from(request: CreateInvoiceRequest) -> Result<Self, Self::Error> {
        request.validate()?;

        let company = request
            .company_id
            .as_deref()
            .and_then(|id| ObjectId::parse_str(id).ok())
            .ok_or_else(|| {
                let mut errors = ValidationErrors::new();
                errors.add(COMPANY_ID_FIELD, ValidationError::new("object_id"));
                errors
            })?;

        Ok(CreateInvoice {
            company,
            invoice_number: request.invoice_number,
            voucher: request.voucher.unwrap_or_default(),
            voucher_nt: request.voucher_nt.unwrap_or_default(),
            voucher_ar: request.voucher_ar.unwrap_or_default(),
            total: request.total.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub company: String,
    #[serde(rename = "invoiceNumber", skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    pub voucher: f64,
    pub voucher_nt: f64,
    pub voucher_ar: f64,
    pub total: f64,
    pub balance: f64,
    pub date: String,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id.to_hex(),
            company: invoice.company.to_hex(),
            invoice_number: invoice.invoice_number,
            voucher: invoice.voucher,
            voucher_nt: invoice.voucher_nt,
            voucher_ar: invoice.voucher_ar,
            total: invoice.total,
            balance: invoice.balance,
            date: invoice.date.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
