use log::trace;
use nalgebra::Vector3;

use crate::{
    constants::{IONOSPHERIC_REFRACTION_CONSTANT, SPEED_OF_LIGHT_M_S, TECU},
    prelude::{AncillaryKey, CorrectionRuntime, Error, LegEnd, StateFunction},
};

use super::{Elevation, LightTimeCorrection, LightTimeCorrectionType};

/// First order ionospheric (group) delay, using a single layer (thin shell)
/// model to map the vertical electron content to the line of sight:
///
/// dt = 40.3 VTEC M(e) / (c f²), M(e) = 1 / sqrt(1 - (R cos(e) / (R + h))²)
///
/// This correction is dispersive: it can only be evaluated when the leg
/// frequency is known, which observation models derive from the
/// [AncillaryKey::FrequencyBands] of each observation.
#[derive(Clone)]
pub struct IonosphericCorrection {
    /// Vertical total electron content (TECu)
    vertical_tec_u: f64,
    /// Shell height above the body surface (m)
    shell_height_m: f64,
    /// Central body mean radius (m)
    body_radius_m: f64,
    central_body: StateFunction,
    ground_end: LegEnd,
}

impl IonosphericCorrection {
    pub fn new(
        vertical_tec_u: f64,
        shell_height_m: f64,
        body_radius_m: f64,
        central_body: StateFunction,
        ground_end: LegEnd,
    ) -> Self {
        Self {
            vertical_tec_u,
            shell_height_m,
            body_radius_m,
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

    /// Squared shell ratio (R / (R + h))²
    fn shell_ratio_sq(&self) -> f64 {
        (self.body_radius_m / (self.body_radius_m + self.shell_height_m)).powi(2)
    }

    /// Zenith delay (s) at given frequency
    fn zenith_delay(&self, rtm: &CorrectionRuntime) -> Result<f64, Error> {
        let frequency_hz = rtm
            .frequency_hz
            .ok_or(Error::MissingAncillaryData(AncillaryKey::FrequencyBands))?;

        Ok(IONOSPHERIC_REFRACTION_CONSTANT * self.vertical_tec_u * TECU
            / SPEED_OF_LIGHT_M_S
            / frequency_hz.powi(2))
    }
}

impl LightTimeCorrection for IonosphericCorrection {
    fn correction_type(&self) -> LightTimeCorrectionType {
        LightTimeCorrectionType::Ionospheric
    }

    fn requires_frequency(&self) -> bool {
        true
    }

    fn value(&self, rtm: &CorrectionRuntime) -> Result<f64, Error> {
        let zenith = self.zenith_delay(rtm)?;
        let elevation = self.elevation(rtm)?;

        let k2 = self.shell_ratio_sq();
        let mapping = 1.0 / (1.0 - k2 * (1.0 - elevation.sin.powi(2))).sqrt();

        trace!(
            "{:.6}: iono delay {:.3}m (mapping={:.4})",
            rtm.reception_time,
            zenith * mapping * SPEED_OF_LIGHT_M_S,
            mapping
        );

        Ok(zenith * mapping)
    }

    fn partial_wrt_link_end_position(
        &self,
        rtm: &CorrectionRuntime,
        end: LegEnd,
    ) -> Result<Vector3<f64>, Error> {
        let zenith = self.zenith_delay(rtm)?;
        let elevation = self.elevation(rtm)?;

        let k2 = self.shell_ratio_sq();
        let sin = elevation.sin;
        // dM/d(sin e)
        let d_mapping = -k2 * sin / (1.0 - k2 * (1.0 - sin.powi(2))).powf(1.5);

        let d_sin = if end == self.ground_end {
            elevation.d_ground
        } else {
            elevation.d_space
        };

        Ok(d_sin * zenith * d_mapping)
    }
}
