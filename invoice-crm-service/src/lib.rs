//! invoice-crm-service: company and invoice CRUD over a document store.
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
