//! Observation models
use log::{debug, error};
use nalgebra::{DVector, Vector6};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    bias::ObservationBias,
    frequency::TurnaroundRatioFunction,
    prelude::{Error, LinkEndType, LinkEnds, ObservationAncillarySettings},
};

mod measured_frequency;
mod multi_leg;
mod n_way_range;
mod one_way_doppler;
mod one_way_range;
mod two_way_doppler;

pub(crate) use multi_leg::{MultiLegLink, ResolvedLeg};
pub(crate) use one_way_doppler::ProperTimeRates;

pub use measured_frequency::DopplerMeasuredFrequency;
pub use n_way_range::NWayRange;
pub use one_way_doppler::OneWayDoppler;
pub use one_way_range::OneWayRange;
pub use two_way_doppler::TwoWayDoppler;

/// Supported observables
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObservableType {
    /// One way range (m)
    OneWayRange,
    /// One way Doppler (m/s, or normalized)
    OneWayDoppler,
    /// Two way Doppler (m/s, or normalized)
    TwoWayDoppler,
    /// Range over any number of legs (m)
    NWayRange,
    /// Frequency received after a transponder relay (Hz)
    DopplerMeasuredFrequency,
}

impl std::fmt::Display for ObservableType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::OneWayRange => write!(f, "one-way range"),
            Self::OneWayDoppler => write!(f, "one-way doppler"),
            Self::TwoWayDoppler => write!(f, "two-way doppler"),
            Self::NWayRange => write!(f, "n-way range"),
            Self::DopplerMeasuredFrequency => write!(f, "doppler measured frequency"),
        }
    }
}

/// Times and states of every link end, as resolved for one observation.
/// Each leg contributes two entries (its transmitter, then its receiver),
/// legs being sorted in transmission order. An intermediate link end
/// therefore appears twice: at reception, then at retransmission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkEndData {
    /// Times, in seconds past J2000 (TDB)
    pub times: Vec<f64>,
    /// States in the global frame
    pub states: Vec<Vector6<f64>>,
}

impl LinkEndData {
    pub(crate) fn from_legs(legs: &[ResolvedLeg]) -> Self {
        let mut data = Self {
            times: Vec::with_capacity(2 * legs.len()),
            states: Vec::with_capacity(2 * legs.len()),
        };
        for leg in legs {
            data.times.push(leg.solution.transmission_time);
            data.times.push(leg.solution.reception_time);
            data.states.push(leg.solution.transmitter_state);
            data.states.push(leg.solution.receiver_state);
        }
        data
    }

    pub fn num_legs(&self) -> usize {
        self.times.len() / 2
    }

    /// Time of the link end at given position (in transmission order).
    /// Intermediate ends are dated at signal reception.
    pub fn link_end_time(&self, index: usize) -> Result<f64, Error> {
        let entry = if index == 0 { 0 } else { 2 * index - 1 };
        self.times
            .get(entry)
            .copied()
            .ok_or(Error::MissingLinkEndData(index))
    }

    /// State of the link end at given position (in transmission order).
    /// Intermediate ends are described at signal reception.
    pub fn link_end_state(&self, index: usize) -> Result<Vector6<f64>, Error> {
        let entry = if index == 0 { 0 } else { 2 * index - 1 };
        self.states
            .get(entry)
            .copied()
            .ok_or(Error::MissingLinkEndData(index))
    }
}

/// Runtime settings of an [ObservationModel].
/// Toggling requires exclusive access to the model: models that need to be
/// evaluated concurrently with different settings must be distinct instances.
#[derive(Clone)]
pub enum ModelToggle {
    /// Doppler observables: express the Doppler as a fraction (true)
    /// or a velocity in m/s (false)
    NormalizeWithSpeedOfLight(bool),
    /// Measured frequency: replaces the retransmitter turnaround ratios
    TurnaroundRatio(TurnaroundRatioFunction),
}

/// Observable specific model
pub enum ObservationModelKind {
    OneWayRange(OneWayRange),
    OneWayDoppler(OneWayDoppler),
    TwoWayDoppler(TwoWayDoppler),
    NWayRange(NWayRange),
    DopplerMeasuredFrequency(DopplerMeasuredFrequency),
}

impl ObservationModelKind {
    pub fn observable_type(&self) -> ObservableType {
        match self {
            Self::OneWayRange(_) => ObservableType::OneWayRange,
            Self::OneWayDoppler(_) => ObservableType::OneWayDoppler,
            Self::TwoWayDoppler(_) => ObservableType::TwoWayDoppler,
            Self::NWayRange(_) => ObservableType::NWayRange,
            Self::DopplerMeasuredFrequency(_) => ObservableType::DopplerMeasuredFrequency,
        }
    }

    fn compute(
        &self,
        t: f64,
        reference: usize,
        ancillary: Option<&ObservationAncillarySettings>,
    ) -> Result<(f64, Vec<ResolvedLeg>), Error> {
        match self {
            Self::OneWayRange(model) => model.compute(t, reference, ancillary),
            Self::OneWayDoppler(model) => model.compute(t, reference, ancillary),
            Self::TwoWayDoppler(model) => model.compute(t, reference, ancillary),
            Self::NWayRange(model) => model.compute(t, reference, ancillary),
            Self::DopplerMeasuredFrequency(model) => model.compute(t, reference, ancillary),
        }
    }
}

/// [ObservationModel] computes one observable between its [LinkEnds].
/// It is immutable once created, apart from [ModelToggle]s: queries are pure
/// functions of (time, reference link end, ancillary settings) and every query
/// resolves the light times again.
pub struct ObservationModel {
    link_ends: LinkEnds,
    kind: ObservationModelKind,
    bias: Option<ObservationBias>,
}

impl ObservationModel {
    pub fn new(
        link_ends: LinkEnds,
        kind: ObservationModelKind,
        bias: Option<ObservationBias>,
    ) -> Self {
        Self {
            link_ends,
            kind,
            bias,
        }
    }

    pub fn observable_type(&self) -> ObservableType {
        self.kind.observable_type()
    }

    pub fn link_ends(&self) -> &LinkEnds {
        &self.link_ends
    }

    pub fn kind(&self) -> &ObservationModelKind {
        &self.kind
    }

    pub fn bias(&self) -> Option<&ObservationBias> {
        self.bias.as_ref()
    }

    /// Observable size
    pub fn size(&self) -> usize {
        1
    }

    /// Modifies a runtime setting.
    pub fn configure(&mut self, toggle: ModelToggle) -> Result<(), Error> {
        let observable = self.observable_type();
        match (&mut self.kind, toggle) {
            (
                ObservationModelKind::OneWayDoppler(model),
                ModelToggle::NormalizeWithSpeedOfLight(normalize),
            ) => {
                model.set_normalization(normalize);
                Ok(())
            },
            (
                ObservationModelKind::TwoWayDoppler(model),
                ModelToggle::NormalizeWithSpeedOfLight(normalize),
            ) => {
                model.set_normalization(normalize);
                Ok(())
            },
            (
                ObservationModelKind::DopplerMeasuredFrequency(model),
                ModelToggle::TurnaroundRatio(turnaround),
            ) => {
                model.set_turnaround_ratio(turnaround);
                Ok(())
            },
            _ => Err(Error::UnsupportedToggle(observable)),
        }
    }

    /// Position of the reference link end, in transmission order
    fn reference_index(&self, reference: LinkEndType) -> Result<usize, Error> {
        self.link_ends.index_of(reference).ok_or_else(|| {
            error!("{} has no {:?} link end", self.observable_type(), reference);
            Error::UnsupportedReferenceLinkEnd(self.observable_type(), reference)
        })
    }

    /// Ideal observable (no bias) at time `t` (s past J2000 TDB) of the
    /// `reference` link end, with the times and states of all link ends.
    pub fn compute_ideal_observations_with_link_end_data(
        &self,
        t: f64,
        reference: LinkEndType,
        ancillary: Option<&ObservationAncillarySettings>,
    ) -> Result<(DVector<f64>, LinkEndData), Error> {
        let index = self.reference_index(reference)?;
        let (value, legs) = self.kind.compute(t, index, ancillary)?;

        debug!(
            "{:.6}: {} ({:?}) ideal={:.12E}",
            t,
            self.observable_type(),
            reference,
            value
        );

        Ok((DVector::from_element(1, value), LinkEndData::from_legs(&legs)))
    }

    /// Ideal observable (no bias) at time `t` (s past J2000 TDB) of the
    /// `reference` link end.
    pub fn compute_ideal_observations(
        &self,
        t: f64,
        reference: LinkEndType,
        ancillary: Option<&ObservationAncillarySettings>,
    ) -> Result<DVector<f64>, Error> {
        let (ideal, _) =
            self.compute_ideal_observations_with_link_end_data(t, reference, ancillary)?;
        Ok(ideal)
    }

    /// Observable (bias applied) at time `t` (s past J2000 TDB) of the
    /// `reference` link end, with the times and states of all link ends.
    pub fn compute_observations_with_link_end_data(
        &self,
        t: f64,
        reference: LinkEndType,
        ancillary: Option<&ObservationAncillarySettings>,
    ) -> Result<(DVector<f64>, LinkEndData), Error> {
        let (ideal, data) =
            self.compute_ideal_observations_with_link_end_data(t, reference, ancillary)?;
        match &self.bias {
            Some(bias) => {
                let observed = bias.apply(&ideal, &data)?;
                Ok((observed, data))
            },
            None => Ok((ideal, data)),
        }
    }

    /// Observable (bias applied) at time `t` (s past J2000 TDB) of the
    /// `reference` link end.
    pub fn compute_observations(
        &self,
        t: f64,
        reference: LinkEndType,
        ancillary: Option<&ObservationAncillarySettings>,
    ) -> Result<DVector<f64>, Error> {
        let (observed, _) = self.compute_observations_with_link_end_data(t, reference, ancillary)?;
        Ok(observed)
    }
}
