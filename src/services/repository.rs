use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info};

use crate::{
    error::AppError,
    models::{
        stats::{compute_stats, TripStats},
        trip::{Trip, TripCandidate, TripLog},
    },
    services::store::{KeyValueStore, Persisted},
};

pub const TRIPS_KEY: &str = "mileage-trips";

/// Owns the trip log and writes it back in full after every change.
pub struct TripRepository {
    log: TripLog,
    persisted: Persisted<TripLog>,
}

impl TripRepository {
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, AppError> {
        let persisted = Persisted::<TripLog>::new(store, TRIPS_KEY);
        let log = persisted.load().await?;
        debug!(trips = log.len(), "trip log loaded");
        Ok(Self { log, persisted })
    }

    pub fn log(&self) -> &TripLog {
        &self.log
    }

    pub fn trips(&self) -> &[Trip] {
        self.log.trips()
    }

    pub fn stats(&self) -> TripStats {
        compute_stats(self.log.trips())
    }

    pub async fn add_trip(&mut self, candidate: TripCandidate) -> Result<Trip, AppError> {
        let trip = Trip::record(candidate, Local::now())?;
        let next = self.log.with_trip(trip.clone());
        self.commit(next).await?;
        info!(id = %trip.id, mpg = trip.mpg, "trip added");
        Ok(trip)
    }

    /// Removing an unknown id is not an error; returns whether anything went.
    pub async fn delete_trip(&mut self, id: &str) -> Result<bool, AppError> {
        let removed = self.log.contains(id);
        let next = self.log.without(id);
        self.commit(next).await?;
        if removed {
            info!(%id, "trip deleted");
        }
        Ok(removed)
    }

    async fn commit(&mut self, next: TripLog) -> Result<(), AppError> {
        self.persisted.save(&next).await?;
        self.log = next;
        Ok(())
    }
}
