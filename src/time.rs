//! Observation epochs
use hifitime::{Epoch, TimeScale};

/// Converts an [Epoch], expressed in any [TimeScale], to the time argument
/// used throughout this crate: seconds past J2000 in [TimeScale::TDB].
/// Callers are expected to convert their tracking timestamps (usually UTC)
/// explicitly, there is no process wide converter.
pub fn tdb_seconds(epoch: Epoch) -> f64 {
    epoch.to_tdb_seconds()
}

/// Converts seconds past J2000 [TimeScale::TDB] back to an [Epoch], in the
/// requested [TimeScale].
pub fn epoch_from_tdb_seconds(seconds: f64, timescale: TimeScale) -> Epoch {
    Epoch::from_tdb_seconds(seconds).to_time_scale(timescale)
}
