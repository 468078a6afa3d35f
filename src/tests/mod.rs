mod ephemeris;

mod bias;
mod light_time;

pub use ephemeris::*;

use log::LevelFilter;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

/// Reference epoch of the scenarios, in seconds past J2000 (TDB)
pub const T0: f64 = 1.0E5;

/// Relative comparison
pub fn assert_relative(value: f64, expected: f64, tolerance: f64) {
    let err = ((value - expected) / expected).abs();
    assert!(
        err <= tolerance,
        "{:.15E} differs from {:.15E} (relative error {:.3E})",
        value,
        expected,
        err
    );
}
