use super::trip::{round2, Trip};

/// Aggregates shown on the summary cards. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TripStats {
    pub average_mpg: f64,
    pub best_mpg: f64,
    pub last_mpg: f64,
    pub total_miles: f64,
}

/// `trips` must be newest first.
pub fn compute_stats(trips: &[Trip]) -> TripStats {
    if trips.is_empty() {
        return TripStats::default();
    }

    let total_miles: f64 = trips.iter().map(Trip::miles).sum();
    let total_gallons: f64 = trips.iter().map(|trip| trip.gallons).sum();
    let average_mpg = if total_gallons > 0.0 {
        round2(total_miles / total_gallons)
    } else {
        0.0
    };
    let best_mpg = trips
        .iter()
        .map(|trip| trip.mpg)
        .fold(f64::NEG_INFINITY, f64::max);

    TripStats {
        average_mpg,
        best_mpg,
        last_mpg: trips[0].mpg,
        total_miles,
    }
}
