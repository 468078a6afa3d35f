use log::debug;

use crate::{
    ancillary::frequency_bands,
    frequency::{FrequencyFunction, TurnaroundRatioFunction},
    prelude::{Error, ObservationAncillarySettings},
};

use super::{one_way_doppler::normalized_doppler, MultiLegLink, ResolvedLeg};

/// Frequency (Hz) received at the end of a transmitter, retransmitter,
/// receiver link:
///
/// f_rx = f_tx(t_tx) (1 + D_up) M(band_up, band_down) (1 + D_down)
///
/// with M the transponder turnaround ratio. Frequency bands of each leg
/// are provided per observation, through the ancillary settings.
pub struct DopplerMeasuredFrequency {
    link: MultiLegLink,
    transmitted: FrequencyFunction,
}

impl DopplerMeasuredFrequency {
    pub(crate) fn new(link: MultiLegLink, transmitted: FrequencyFunction) -> Self {
        Self { link, transmitted }
    }

    pub(crate) fn set_turnaround_ratio(&mut self, turnaround: TurnaroundRatioFunction) {
        self.link.set_turnaround(0, turnaround);
    }

    pub(crate) fn compute(
        &self,
        t: f64,
        reference: usize,
        ancillary: Option<&ObservationAncillarySettings>,
    ) -> Result<(f64, Vec<ResolvedLeg>), Error> {
        let bands = frequency_bands(ancillary, self.link.num_legs())?;

        let legs = self.link.solve(t, reference, ancillary, false)?;
        let calculators = self.link.legs();

        let uplink = normalized_doppler(&calculators[0], &legs[0])?;
        let downlink = normalized_doppler(&calculators[1], &legs[1])?;

        let transmitted = (self.transmitted)(legs[0].solution.transmission_time);
        let turnaround =
            self.link
                .turnaround_ratio(0, bands[0], bands[1], legs[1].solution.transmission_time)?;

        debug!(
            "{:.6}: f_tx={:.3}Hz ({:?}/{:?}) turnaround={:.9} up={:.12E} down={:.12E}",
            t, transmitted, bands[0], bands[1], turnaround, uplink, downlink
        );

        let received = transmitted * turnaround * (1.0 + uplink + downlink + uplink * downlink);
        Ok((received, legs))
    }
}
