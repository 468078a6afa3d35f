//! Per observation metadata (frequency bands, integration time..)
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::{Error, FrequencyBand};

/// Ancillary data identifiers
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AncillaryKey {
    /// One [FrequencyBand] identifier per leg, in transmission order
    FrequencyBands,
    /// [FrequencyBand] identifier of the reception reference.
    /// Carried along with the observation, for averaged Doppler and
    /// measurement processing downstream. Not read by the models.
    ReceptionReferenceFrequencyBand,
    /// Doppler count integration time, in seconds.
    /// Carried along with the observation, not read by the models.
    DopplerIntegrationTime,
    /// Retransmission delay at each intermediate link end, in seconds
    RetransmissionDelays,
}

/// Open map of auxiliary per observation parameters.
/// Read-only to the observation models.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservationAncillarySettings {
    scalars: HashMap<AncillaryKey, f64>,
    vectors: HashMap<AncillaryKey, Vec<f64>>,
}

impl ObservationAncillarySettings {
    /// Copies and returns [Self] with a scalar value
    pub fn with_scalar(&self, key: AncillaryKey, value: f64) -> Self {
        let mut s = self.clone();
        s.scalars.insert(key, value);
        s
    }

    /// Copies and returns [Self] with a vector value
    pub fn with_vector(&self, key: AncillaryKey, values: Vec<f64>) -> Self {
        let mut s = self.clone();
        s.vectors.insert(key, values);
        s
    }

    /// Copies and returns [Self] with one [FrequencyBand] per leg
    pub fn with_frequency_bands(&self, bands: &[FrequencyBand]) -> Self {
        self.with_vector(
            AncillaryKey::FrequencyBands,
            bands.iter().map(|band| band.identifier()).collect(),
        )
    }

    pub fn scalar(&self, key: AncillaryKey) -> Result<f64, Error> {
        self.scalars
            .get(&key)
            .copied()
            .ok_or(Error::MissingAncillaryData(key))
    }

    pub fn vector(&self, key: AncillaryKey) -> Result<&[f64], Error> {
        self.vectors
            .get(&key)
            .map(|v| v.as_slice())
            .ok_or(Error::MissingAncillaryData(key))
    }

    /// Per leg [FrequencyBand]s, in transmission order
    pub fn frequency_bands(&self) -> Result<Vec<FrequencyBand>, Error> {
        self.vector(AncillaryKey::FrequencyBands)?
            .iter()
            .map(|id| FrequencyBand::from_identifier(*id))
            .collect()
    }
}

/// Returns frequency bands from optional [ObservationAncillarySettings],
/// making sure there is one per leg.
pub(crate) fn frequency_bands(
    ancillary: Option<&ObservationAncillarySettings>,
    num_legs: usize,
) -> Result<Vec<FrequencyBand>, Error> {
    let ancillary = ancillary.ok_or(Error::MissingAncillaryData(AncillaryKey::FrequencyBands))?;
    let bands = ancillary.frequency_bands()?;
    if bands.len() != num_legs {
        return Err(Error::InvalidAncillaryData(AncillaryKey::FrequencyBands));
    }
    Ok(bands)
}
