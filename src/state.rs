use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    payments::PaymentGateway,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        orm: OrmConn,
        config: AppConfig,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            pool,
            orm,
            config: Arc::new(config),
            payments,
        }
    }
}
