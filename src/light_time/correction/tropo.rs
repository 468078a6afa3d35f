use log::trace;
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    constants::SPEED_OF_LIGHT_M_S,
    prelude::{CorrectionRuntime, Error, LegEnd, StateFunction},
};

use super::{Elevation, LightTimeCorrection, LightTimeCorrectionType};

/// Zenith delay components, in meters of delay
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ZenithDelay {
    /// Undifferentiated total zenith delay (dry + wet)
    Total(f64),
    /// (wet, dry) zenith delay components
    WetDry((f64, f64)),
}

impl ZenithDelay {
    /// Total zenith delay (m)
    pub fn total_m(&self) -> f64 {
        match self {
            Self::Total(total) => *total,
            Self::WetDry((wet, dry)) => wet + dry,
        }
    }
}

/// Elevation mapping of the zenith delay
fn mapping(sin_e: f64) -> f64 {
    1.001_f64 / (0.002001_f64 + sin_e.powi(2)).sqrt()
}

/// d(mapping) / d(sin e)
fn mapping_derivative(sin_e: f64) -> f64 {
    -1.001_f64 * sin_e / (0.002001_f64 + sin_e.powi(2)).powf(1.5)
}

/// Tropospheric light time correction, for a leg with one ground link end.
/// The zenith delay is mapped to the line of sight elevation seen from the
/// ground end.
#[derive(Clone)]
pub struct TroposphericCorrection {
    zenith: ZenithDelay,
    central_body: StateFunction,
    ground_end: LegEnd,
}

impl TroposphericCorrection {
    /// Builds a new [TroposphericCorrection]
    /// - zenith: [ZenithDelay]
    /// - central_body: state function of the body the ground end sits on
    /// - ground_end: which end of the leg is on the ground
    pub fn new(zenith: ZenithDelay, central_body: StateFunction, ground_end: LegEnd) -> Self {
        Self {
            zenith,
            central_body,
            ground_end,
        }
    }

    fn elevation(&self, rtm: &CorrectionRuntime) -> Result<Elevation, Error> {
        let (ground, space, t) = match self.ground_end {
            LegEnd::Transmitter => (
                rtm.transmitter_position(),
                rtm.receiver_position(),
                rtm.transmission_time,
            ),
            LegEnd::Receiver => (
                rtm.receiver_position(),
                rtm.transmitter_position(),
                rtm.reception_time,
            ),
        };

        let center = (self.central_body)(t).fixed_rows::<3>(0).into_owned();
        Elevation::new(&ground, &space, &center, t)
    }
}

impl LightTimeCorrection for TroposphericCorrection {
    fn correction_type(&self) -> LightTimeCorrectionType {
        LightTimeCorrectionType::Tropospheric
    }

    fn value(&self, rtm: &CorrectionRuntime) -> Result<f64, Error> {
        let elevation = self.elevation(rtm)?;
        let delay_m = self.zenith.total_m() * mapping(elevation.sin);

        trace!(
            "{:.6}: tropo delay {:.3}m (sin(e)={:.4})",
            rtm.reception_time,
            delay_m,
            elevation.sin
        );

        Ok(delay_m / SPEED_OF_LIGHT_M_S)
    }

    fn partial_wrt_link_end_position(
        &self,
        rtm: &CorrectionRuntime,
        end: LegEnd,
    ) -> Result<Vector3<f64>, Error> {
        let elevation = self.elevation(rtm)?;
        let scaling =
            self.zenith.total_m() * mapping_derivative(elevation.sin) / SPEED_OF_LIGHT_M_S;

        if end == self.ground_end {
            Ok(elevation.d_ground * scaling)
        } else {
            Ok(elevation.d_space * scaling)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector6;
    use std::sync::Arc;

    fn runtime(tx: Vector3<f64>, rx: Vector3<f64>) -> CorrectionRuntime {
        let mut transmitter_state = Vector6::zeros();
        transmitter_state.fixed_rows_mut::<3>(0).copy_from(&tx);
        let mut receiver_state = Vector6::zeros();
        receiver_state.fixed_rows_mut::<3>(0).copy_from(&rx);
        CorrectionRuntime {
            transmitter_state,
            receiver_state,
            transmission_time: 100.0,
            reception_time: 100.1,
            frequency_hz: None,
        }
    }

    #[test]
    fn zenith_mapping() {
        assert!((mapping(1.0) - 1.0).abs() < 1.0E-6);
        assert!(mapping(0.1) > 9.0);

        let correction = TroposphericCorrection::new(
            ZenithDelay::WetDry((0.1, 2.3)),
            Arc::new(|_: f64| Vector6::zeros()),
            LegEnd::Receiver,
        );

        let rtm = runtime(Vector3::new(3.0E7, 0.0, 0.0), Vector3::new(6.4E6, 0.0, 0.0));
        let dt = correction.value(&rtm).unwrap();
        assert!((dt * SPEED_OF_LIGHT_M_S - 2.4 * mapping(1.0)).abs() < 1.0E-9);
    }

    #[test]
    fn position_partials() {
        let correction = TroposphericCorrection::new(
            ZenithDelay::Total(2.4),
            Arc::new(|t: f64| Vector6::new(1.0E3 * t, 0.0, 0.0, 0.0, 0.0, 0.0)),
            LegEnd::Transmitter,
        );

        let tx = Vector3::new(4.1E6, 1.3E6, 4.6E6);
        let rx = Vector3::new(2.2E7, -8.0E6, 1.0E7);

        let nominal = runtime(tx, rx);
        let h = 1.0;

        for end in [LegEnd::Transmitter, LegEnd::Receiver] {
            let partial = correction
                .partial_wrt_link_end_position(&nominal, end)
                .unwrap();
            for i in 0..3 {
                let mut dp = Vector3::zeros();
                dp[i] = h;
                let (up, down) = match end {
                    LegEnd::Transmitter => (runtime(tx + dp, rx), runtime(tx - dp, rx)),
                    LegEnd::Receiver => (runtime(tx, rx + dp), runtime(tx, rx - dp)),
                };
                let numerical = (correction.value(&up).unwrap()
                    - correction.value(&down).unwrap())
                    / 2.0
                    / h;
                assert!(
                    (numerical - partial[i]).abs() <= 1.0E-6 * partial.norm() + 1.0E-22,
                    "{:?}[{}] analytical={:.6E} numerical={:.6E}",
                    end,
                    i,
                    partial[i],
                    numerical
                );
            }
        }
    }
}
