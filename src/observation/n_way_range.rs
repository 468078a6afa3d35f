use crate::{
    constants::SPEED_OF_LIGHT_M_S,
    prelude::{Error, ObservationAncillarySettings},
};

use super::{MultiLegLink, ResolvedLeg};

/// Range accumulated over all legs, retransmission delays included (m)
pub struct NWayRange {
    link: MultiLegLink,
}

impl NWayRange {
    pub(crate) fn new(link: MultiLegLink) -> Self {
        Self { link }
    }

    pub(crate) fn compute(
        &self,
        t: f64,
        reference: usize,
        ancillary: Option<&ObservationAncillarySettings>,
    ) -> Result<(f64, Vec<ResolvedLeg>), Error> {
        let legs = self.link.solve(t, reference, ancillary, true)?;

        let light_times = legs.iter().map(|leg| leg.solution.light_time).sum::<f64>();
        let delays = self.link.retransmission_delays(ancillary)?.iter().sum::<f64>();

        Ok((SPEED_OF_LIGHT_M_S * (light_times + delays), legs))
    }
}
