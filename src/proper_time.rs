//! Clock proper time rates
use log::trace;
use nalgebra::Vector6;

use crate::{
    constants::INVERSE_SQUARE_SPEED_OF_LIGHT,
    prelude::{Error, StateFunction},
};

/// Ratio of a clock's proper time rate to coordinate time rate,
/// as a function of the clock's state and time.
pub trait ProperTimeRateCalculator: Send + Sync {
    /// Dimensionless rate (close to 1.0)
    /// - state: link end state in the global frame
    /// - t: coordinate time (s)
    fn rate(&self, state: &Vector6<f64>, t: f64) -> Result<f64, Error>;
}

/// First order proper time rate of a clock orbiting a central body:
///
/// dτ/dt = 1 - (v²/2 + μ/r) / c²
///
/// with v the link end velocity in the global frame and r its distance
/// to the central body. Only the central body potential is accounted for.
#[derive(Clone)]
pub struct DirectFirstOrderProperTimeRate {
    central_body: StateFunction,
    gravitational_parameter: f64,
}

impl DirectFirstOrderProperTimeRate {
    pub fn new(central_body: StateFunction, gravitational_parameter: f64) -> Self {
        Self {
            central_body,
            gravitational_parameter,
        }
    }
}

impl ProperTimeRateCalculator for DirectFirstOrderProperTimeRate {
    fn rate(&self, state: &Vector6<f64>, t: f64) -> Result<f64, Error> {
        let center = (self.central_body)(t);

        let r = (state.fixed_rows::<3>(0) - center.fixed_rows::<3>(0)).norm();
        if r == 0.0 {
            return Err(Error::CoLocatedLinkEnds(t));
        }

        let v2 = state.fixed_rows::<3>(3).norm_squared();

        let deviation =
            (0.5 * v2 + self.gravitational_parameter / r) * INVERSE_SQUARE_SPEED_OF_LIGHT;

        trace!("{:.6}: proper time rate deviation {:.6E}", t, deviation);
        Ok(1.0 - deviation)
    }
}
