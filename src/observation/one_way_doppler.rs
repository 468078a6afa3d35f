use log::debug;

use crate::{
    constants::SPEED_OF_LIGHT_M_S,
    light_time::LightTimeCalculator,
    prelude::{Error, LegEnd, ObservationAncillarySettings, ProperTimeRateCalculator},
};

use super::{MultiLegLink, ResolvedLeg};

/// Proper time rates of both ends of a leg.
/// Undefined clocks run at coordinate time rate.
#[derive(Default)]
pub(crate) struct ProperTimeRates {
    pub transmitter: Option<Box<dyn ProperTimeRateCalculator>>,
    pub receiver: Option<Box<dyn ProperTimeRateCalculator>>,
}

impl ProperTimeRates {
    /// Ratio of transmitter clock rate to receiver clock rate, the factor
    /// applied to the received frequency.
    pub fn ratio(&self, leg: &ResolvedLeg) -> Result<f64, Error> {
        let transmitter = match &self.transmitter {
            Some(calculator) => calculator.rate(
                &leg.solution.transmitter_state,
                leg.solution.transmission_time,
            )?,
            None => 1.0,
        };
        let receiver = match &self.receiver {
            Some(calculator) => {
                calculator.rate(&leg.solution.receiver_state, leg.solution.reception_time)?
            },
            None => 1.0,
        };
        Ok(transmitter / receiver)
    }
}

/// Normalized Doppler shift of a resolved leg, in coordinate time:
///
/// D = f_rx / f_tx - 1 = -dτ/dt_rx
///
/// obtained from the light time gradients (geometric and corrections)
/// projected on each end's velocity.
pub(crate) fn normalized_doppler(
    calculator: &LightTimeCalculator,
    leg: &ResolvedLeg,
) -> Result<f64, Error> {
    let solution = &leg.solution;

    let d_tx =
        calculator.partial_wrt_link_end_position(solution, LegEnd::Transmitter, leg.frequency_hz)?;
    let d_rx =
        calculator.partial_wrt_link_end_position(solution, LegEnd::Receiver, leg.frequency_hz)?;

    let v_tx = solution.transmitter_state.fixed_rows::<3>(3);
    let v_rx = solution.receiver_state.fixed_rows::<3>(3);

    // τ(t_rx) = τ(r_rx(t_rx), r_tx(t_rx - τ))
    // dτ/dt_rx = (d_rx.v_rx + d_tx.v_tx) / (1 + d_tx.v_tx)
    let tx_term = d_tx.dot(&v_tx);
    let rx_term = d_rx.dot(&v_rx);

    Ok(-(rx_term + tx_term) / (1.0 + tx_term))
}

/// One way Doppler: received to transmitted frequency ratio, minus one,
/// corrected for both ends' proper time rates. Expressed in m/s unless
/// normalized.
pub struct OneWayDoppler {
    link: MultiLegLink,
    proper_time: ProperTimeRates,
    normalized: bool,
}

impl OneWayDoppler {
    pub(crate) fn new(link: MultiLegLink, proper_time: ProperTimeRates, normalized: bool) -> Self {
        Self {
            link,
            proper_time,
            normalized,
        }
    }

    /// True when the Doppler is expressed as a fraction
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub(crate) fn set_normalization(&mut self, normalized: bool) {
        self.normalized = normalized;
    }

    /// Normalized Doppler shift of the resolved leg, proper time included:
    /// (1 + D') = (1 + D) * rate_tx / rate_rx
    pub(crate) fn frequency_shift(
        calculator: &LightTimeCalculator,
        proper_time: &ProperTimeRates,
        leg: &ResolvedLeg,
    ) -> Result<f64, Error> {
        let doppler = normalized_doppler(calculator, leg)?;
        let ratio = proper_time.ratio(leg)?;

        debug!(
            "{:.6}: doppler {:.12E} proper time ratio {:.12E}",
            leg.solution.reception_time, doppler, ratio
        );

        Ok(doppler * ratio + (ratio - 1.0))
    }

    pub(crate) fn compute(
        &self,
        t: f64,
        reference: usize,
        ancillary: Option<&ObservationAncillarySettings>,
    ) -> Result<(f64, Vec<ResolvedLeg>), Error> {
        let legs = self.link.solve(t, reference, ancillary, false)?;

        let shift = Self::frequency_shift(&self.link.legs()[0], &self.proper_time, &legs[0])?;

        if self.normalized {
            Ok((shift, legs))
        } else {
            Ok((shift * SPEED_OF_LIGHT_M_S, legs))
        }
    }
}
