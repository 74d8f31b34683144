use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A billing record issued against one company.
///
/// `company` is stored as given; nothing guarantees the company exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub company: ObjectId,
    #[serde(
        rename = "invoiceNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub voucher: f64,
    #[serde(default)]
    pub voucher_nt: f64,
    #[serde(default)]
    pub voucher_ar: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub balance: f64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
}

/// Validated input for a new invoice. Absent amounts are already zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateInvoice {
    pub company: ObjectId,
    pub invoice_number: Option<String>,
    pub voucher: f64,
    pub voucher_nt: f64,
    pub voucher_ar: f64,
    pub total: f64,
}

impl Invoice {
    /// Opens the invoice with `balance` equal to `total`.
    pub fn new(input: CreateInvoice) -> Self {
        Self {
            id: ObjectId::new(),
            company: input.company,
            invoice_number: input.invoice_number,
            voucher: input.voucher,
            voucher_nt: input.voucher_nt,
            voucher_ar: input.voucher_ar,
            total: input.total,
            balance: input.total,
            date: Utc::now(),
        }
    }
}
