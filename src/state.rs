use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::{
    config::AppConfig,
    error::AppError,
    services::{
        flight::SingleFlight, gemini::GenerativeModel, pump::PumpReader,
        repository::TripRepository, store::KeyValueStore, tips::TipService,
    },
};

/// Everything the handlers share. Mutations of the trip log go through
/// the repository lock one at a time.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub trips: Arc<Mutex<TripRepository>>,
    pub tips: TipService,
    pub pump: PumpReader,
    pub tip: Arc<RwLock<String>>,
    pub tip_flight: SingleFlight,
    pub scan_flight: SingleFlight,
}

impl AppState {
    pub fn new(config: AppConfig, trips: TripRepository, model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            config,
            trips: Arc::new(Mutex::new(trips)),
            tips: TipService::new(Arc::clone(&model)),
            pump: PumpReader::new(model),
            tip: Arc::new(RwLock::new(String::new())),
            tip_flight: SingleFlight::new(),
            scan_flight: SingleFlight::new(),
        }
    }

    pub async fn open(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        model: Arc<dyn GenerativeModel>,
    ) -> Result<Self, AppError> {
        let trips = TripRepository::load(store).await?;
        Ok(Self::new(config, trips, model))
    }
}
