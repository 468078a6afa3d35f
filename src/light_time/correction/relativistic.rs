use log::trace;
use nalgebra::Vector3;

use crate::{
    constants::INVERSE_CUBIC_SPEED_OF_LIGHT,
    prelude::{CorrectionRuntime, Error, LegEnd, StateFunction},
};

use super::{LightTimeCorrection, LightTimeCorrectionType};

/// Body whose gravity field delays the signal
#[derive(Clone)]
pub struct PerturbingBody {
    /// Name, for logging purposes
    pub name: String,
    /// Gravitational parameter (m^3 s-2)
    pub gravitational_parameter: f64,
    /// Body center state function
    pub state: StateFunction,
}

/// First order relativistic (Shapiro) light time correction,
/// summed over all perturbing bodies:
///
/// dt = (1 + γ) μ / c³ ln((r_t + r_r + ρ) / (r_t + r_r - ρ))
///
/// with r_t, r_r the distances from the perturber to transmitter and receiver,
/// and ρ the transmitter to receiver distance. Perturbers are evaluated at
/// the leg mid time.
#[derive(Clone)]
pub struct FirstOrderRelativisticCorrection {
    perturbers: Vec<PerturbingBody>,
    ppn_gamma: f64,
}

impl FirstOrderRelativisticCorrection {
    /// Builds a new correction, with PPN parameter γ (1 in general relativity).
    pub fn new(perturbers: Vec<PerturbingBody>, ppn_gamma: f64) -> Self {
        Self {
            perturbers,
            ppn_gamma,
        }
    }

    pub fn perturbers(&self) -> &[PerturbingBody] {
        &self.perturbers
    }

    /// (r_t, r_r, ρ, unit vectors) for a single perturber
    fn geometry(
        &self,
        perturber: &PerturbingBody,
        rtm: &CorrectionRuntime,
    ) -> Result<Geometry, Error> {
        let t_mid = rtm.mid_time();
        let center = (perturber.state)(t_mid).fixed_rows::<3>(0).into_owned();

        let to_tx = rtm.transmitter_position() - center;
        let to_rx = rtm.receiver_position() - center;
        let los = rtm.receiver_position() - rtm.transmitter_position();

        let (r_t, r_r, rho) = (to_tx.norm(), to_rx.norm(), los.norm());

        if r_t == 0.0 || r_r == 0.0 || rho == 0.0 {
            return Err(Error::CoLocatedLinkEnds(t_mid));
        }

        Ok(Geometry {
            r_t,
            r_r,
            rho,
            e_t: to_tx / r_t,
            e_r: to_rx / r_r,
            n: los / rho,
        })
    }

    fn scaling(&self, perturber: &PerturbingBody) -> f64 {
        (1.0 + self.ppn_gamma) * perturber.gravitational_parameter * INVERSE_CUBIC_SPEED_OF_LIGHT
    }
}

struct Geometry {
    r_t: f64,
    r_r: f64,
    rho: f64,
    e_t: Vector3<f64>,
    e_r: Vector3<f64>,
    n: Vector3<f64>,
}

impl LightTimeCorrection for FirstOrderRelativisticCorrection {
    fn correction_type(&self) -> LightTimeCorrectionType {
        LightTimeCorrectionType::FirstOrderRelativistic
    }

    fn value(&self, rtm: &CorrectionRuntime) -> Result<f64, Error> {
        let mut total = 0.0;
        for perturber in &self.perturbers {
            let geo = self.geometry(perturber, rtm)?;
            let dt = self.scaling(perturber)
                * ((geo.r_t + geo.r_r + geo.rho) / (geo.r_t + geo.r_r - geo.rho)).ln();

            trace!(
                "{:.6}: relativistic delay ({}) {:.3E}s",
                rtm.reception_time,
                perturber.name,
                dt
            );

            total += dt;
        }
        Ok(total)
    }

    fn partial_wrt_link_end_position(
        &self,
        rtm: &CorrectionRuntime,
        end: LegEnd,
    ) -> Result<Vector3<f64>, Error> {
        let mut total = Vector3::zeros();
        for perturber in &self.perturbers {
            let geo = self.geometry(perturber, rtm)?;
            let sum = geo.r_t + geo.r_r;

            // d ln(A/B) = dA/A - dB/B, A = r_t + r_r + ρ, B = r_t + r_r - ρ
            let (d_a, d_b) = match end {
                LegEnd::Receiver => (geo.e_r + geo.n, geo.e_r - geo.n),
                LegEnd::Transmitter => (geo.e_t - geo.n, geo.e_t + geo.n),
            };

            total += self.scaling(perturber) * (d_a / (sum + geo.rho) - d_b / (sum - geo.rho));
        }
        Ok(total)
    }
}
