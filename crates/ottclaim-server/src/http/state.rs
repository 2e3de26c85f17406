use std::sync::Arc;

use ottclaim_core::Config;

use crate::auth::{AdminCredentials, JwtManager};
use crate::fulfillment::FulfillmentService;
use crate::payment::PaymentClient;
use crate::storage::ClaimDatabase;

/// Settings the handlers read on every request.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub processing_fee: i64,
    pub currency: String,
    pub auto_fulfill_on_payment: bool,
    pub batch_size: u32,
}

impl From<&Config> for ApiSettings {
    fn from(config: &Config) -> Self {
        Self {
            processing_fee: config.payment.processing_fee,
            currency: config.payment.currency.clone(),
            auto_fulfill_on_payment: config.fulfillment.auto_fulfill_on_payment,
            batch_size: config.fulfillment.batch_size,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: ClaimDatabase,
    pub fulfillment: Arc<FulfillmentService>,
    /// `None` when no gateway credentials are configured.
    pub payment: Option<Arc<PaymentClient>>,
    pub jwt: Arc<JwtManager>,
    pub admin: Arc<AdminCredentials>,
    pub settings: Arc<ApiSettings>,
}
