use std::sync::Arc;

use common::ObjectStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub objects: Arc<dyn ObjectStore>,
    pub config: Arc<AppConfig>,
}
