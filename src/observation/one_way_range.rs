use crate::{
    constants::SPEED_OF_LIGHT_M_S,
    prelude::{Error, ObservationAncillarySettings},
};

use super::{MultiLegLink, ResolvedLeg};

/// One way range: c * light time (m)
pub struct OneWayRange {
    link: MultiLegLink,
}

impl OneWayRange {
    pub(crate) fn new(link: MultiLegLink) -> Self {
        Self { link }
    }

    pub(crate) fn compute(
        &self,
        t: f64,
        reference: usize,
        ancillary: Option<&ObservationAncillarySettings>,
    ) -> Result<(f64, Vec<ResolvedLeg>), Error> {
        let legs = self.link.solve(t, reference, ancillary, false)?;
        let range = SPEED_OF_LIGHT_M_S * legs[0].solution.light_time;
        Ok((range, legs))
    }
}
