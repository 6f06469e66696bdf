use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::ValidationError;

/// Rounds to two decimal places, ties away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parsed readings that have not been checked against each other yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripCandidate {
    pub start_odometer: f64,
    pub end_odometer: f64,
    pub gallons: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub date: String,
    pub start_odometer: f64,
    pub end_odometer: f64,
    pub gallons: f64,
    pub mpg: f64,
}

impl Trip {
    /// Creates a trip from checked readings. `mpg` is fixed here and never
    /// recomputed.
    pub fn record(candidate: TripCandidate, now: DateTime<Local>) -> Result<Self, ValidationError> {
        let TripCandidate {
            start_odometer,
            end_odometer,
            gallons,
        } = candidate;
        let readings_ok = start_odometer.is_finite()
            && end_odometer.is_finite()
            && gallons.is_finite()
            && end_odometer > start_odometer
            && gallons > 0.0;
        if !readings_ok {
            return Err(ValidationError::InvalidReadings);
        }
        let miles = end_odometer - start_odometer;
        let mpg = round2(miles / gallons);
        // serde_json writes inf as null, which would not load back
        if !miles.is_finite() || !mpg.is_finite() {
            return Err(ValidationError::InvalidReadings);
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            date: now.format("%-m/%-d/%Y").to_string(),
            start_odometer,
            end_odometer,
            gallons,
            mpg,
        })
    }

    pub fn miles(&self) -> f64 {
        self.end_odometer - self.start_odometer
    }
}

/// Trips ordered newest first. Every change produces a new log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripLog {
    trips: Vec<Trip>,
}

impl TripLog {
    pub fn new(trips: Vec<Trip>) -> Self {
        Self { trips }
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn newest(&self) -> Option<&Trip> {
        self.trips.first()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.trips.iter().any(|trip| trip.id == id)
    }

    pub fn with_trip(&self, trip: Trip) -> Self {
        let mut trips = Vec::with_capacity(self.trips.len() + 1);
        trips.push(trip);
        trips.extend(self.trips.iter().cloned());
        Self { trips }
    }

    pub fn without(&self, id: &str) -> Self {
        Self {
            trips: self
                .trips
                .iter()
                .filter(|trip| trip.id != id)
                .cloned()
                .collect(),
        }
    }

    pub fn recent_mpg(&self, count: usize) -> Vec<f64> {
        self.trips.iter().take(count).map(|trip| trip.mpg).collect()
    }
}
