use log::debug;

use crate::{
    constants::SPEED_OF_LIGHT_M_S,
    prelude::{Error, ObservationAncillarySettings},
};

use super::{MultiLegLink, OneWayDoppler, ProperTimeRates, ResolvedLeg};

/// Two way Doppler: uplink and downlink one way Doppler legs, sharing the
/// reflection (or retransmission) time, combined as
///
/// (1 + D) = (1 + D_up) (1 + D_down)
pub struct TwoWayDoppler {
    link: MultiLegLink,
    uplink_proper_time: ProperTimeRates,
    downlink_proper_time: ProperTimeRates,
    normalized: bool,
}

impl TwoWayDoppler {
    pub(crate) fn new(
        link: MultiLegLink,
        uplink_proper_time: ProperTimeRates,
        downlink_proper_time: ProperTimeRates,
        normalized: bool,
    ) -> Self {
        Self {
            link,
            uplink_proper_time,
            downlink_proper_time,
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

    pub(crate) fn compute(
        &self,
        t: f64,
        reference: usize,
        ancillary: Option<&ObservationAncillarySettings>,
    ) -> Result<(f64, Vec<ResolvedLeg>), Error> {
        let legs = self.link.solve(t, reference, ancillary, false)?;
        let calculators = self.link.legs();

        let uplink =
            OneWayDoppler::frequency_shift(&calculators[0], &self.uplink_proper_time, &legs[0])?;
        let downlink =
            OneWayDoppler::frequency_shift(&calculators[1], &self.downlink_proper_time, &legs[1])?;

        let shift = uplink + downlink + uplink * downlink;

        debug!(
            "{:.6}: two-way doppler up={:.12E} down={:.12E}",
            t, uplink, downlink
        );

        if self.normalized {
            Ok((shift, legs))
        } else {
            Ok((shift * SPEED_OF_LIGHT_M_S, legs))
        }
    }
}
