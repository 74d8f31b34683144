use crate::dtos::coerce;
use crate::models::Company;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[serde(default, deserialize_with = "coerce::text")]
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name is required")
    )]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            id: company.id.to_hex(),
            name: company.name,
        }
    }
}
