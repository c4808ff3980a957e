pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use chrono::NaiveDate;
use crate::config::SellerSettings;
use crate::services::api_client::BillingApiClient;
use std::sync::Arc;

/// Shared application state: the backend client and the seller printed on documents.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<BillingApiClient>,
    pub seller: Arc<SellerSettings>,
}

impl AppState {
    pub fn new(api: Arc<BillingApiClient>, seller: Arc<SellerSettings>) -> Self {
        Self { api, seller }
    }

    /// Local calendar date used for new drafts and "generated on" lines.
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
