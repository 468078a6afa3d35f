//! Observation biases
use log::debug;
use nalgebra::DVector;

use crate::prelude::{
    Error, LinkEndData, LinkEndType, LinkEnds, ObservableType, ObservationBiasSettings,
};

/// Time dependent bias, evaluated at the time of one link end
#[derive(Debug, Clone, PartialEq)]
pub struct ArcWiseBias {
    /// Arc start times, sorted (s)
    arc_start_times: Vec<f64>,
    /// Bias value of each arc
    values: Vec<DVector<f64>>,
    /// Index of the reference link end, in transmission order
    reference_index: usize,
}

impl ArcWiseBias {
    /// Bias of the arc containing `t`.
    fn value(&self, t: f64) -> Result<&DVector<f64>, Error> {
        let arc = self.arc_start_times.partition_point(|start| *start <= t);
        if arc == 0 {
            return Err(Error::OutOfBiasArcs(t));
        }
        Ok(&self.values[arc - 1])
    }
}

/// [ObservationBias] as applied to the ideal observable.
/// Composite biases resolve to
///
/// observed = Σ additive + (1 + Σ relative) * ideal
///
/// whatever the declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationBias {
    /// Constant additive bias
    ConstantAdditive(DVector<f64>),
    /// Constant relative (scale) bias
    ConstantRelative(DVector<f64>),
    /// Additive, piecewise constant bias
    ArcWiseAdditive(ArcWiseBias),
    /// Relative, piecewise constant bias
    ArcWiseRelative(ArcWiseBias),
    /// Additive bias drifting linearly from a reference epoch
    ConstantTimeDrift {
        drift: DVector<f64>,
        reference_epoch: f64,
        reference_index: usize,
    },
    /// Combination of biases
    Multiple(Vec<ObservationBias>),
}

fn checked_size(values: &[f64], expected: usize) -> Result<DVector<f64>, Error> {
    if values.len() != expected {
        return Err(Error::InvalidBiasSize {
            expected,
            found: values.len(),
        });
    }
    Ok(DVector::from_column_slice(values))
}

fn reference_index(
    link_ends: &LinkEnds,
    observable: ObservableType,
    end: LinkEndType,
) -> Result<usize, Error> {
    link_ends
        .index_of(end)
        .ok_or(Error::UnsupportedReferenceLinkEnd(observable, end))
}

impl ObservationBias {
    /// Builds a runtime [ObservationBias] from its settings,
    /// for an observable of given size.
    pub fn new(
        settings: &ObservationBiasSettings,
        link_ends: &LinkEnds,
        observable: ObservableType,
        size: usize,
    ) -> Result<Self, Error> {
        match settings {
            ObservationBiasSettings::Constant { value, relative } => {
                let value = checked_size(value, size)?;
                if *relative {
                    Ok(Self::ConstantRelative(value))
                } else {
                    Ok(Self::ConstantAdditive(value))
                }
            },
            ObservationBiasSettings::ArcWiseConstant {
                arc_start_times,
                values,
                relative,
                reference_end,
            } => {
                let sorted = arc_start_times.windows(2).all(|w| w[0] < w[1]);
                if !sorted || arc_start_times.is_empty() || arc_start_times.len() != values.len() {
                    return Err(Error::InvalidBiasArcs);
                }

                let arcwise = ArcWiseBias {
                    arc_start_times: arc_start_times.clone(),
                    values: values
                        .iter()
                        .map(|value| checked_size(value, size))
                        .collect::<Result<Vec<_>, Error>>()?,
                    reference_index: reference_index(link_ends, observable, *reference_end)?,
                };

                if *relative {
                    Ok(Self::ArcWiseRelative(arcwise))
                } else {
                    Ok(Self::ArcWiseAdditive(arcwise))
                }
            },
            ObservationBiasSettings::ConstantTimeDrift {
                drift,
                reference_epoch,
                reference_end,
            } => Ok(Self::ConstantTimeDrift {
                drift: checked_size(drift, size)?,
                reference_epoch: *reference_epoch,
                reference_index: reference_index(link_ends, observable, *reference_end)?,
            }),
            ObservationBiasSettings::Multiple(biases) => Ok(Self::Multiple(
                biases
                    .iter()
                    .map(|bias| Self::new(bias, link_ends, observable, size))
                    .collect::<Result<Vec<_>, Error>>()?,
            )),
        }
    }

    /// Accumulates additive and relative terms
    fn accumulate(
        &self,
        data: &LinkEndData,
        additive: &mut DVector<f64>,
        relative: &mut DVector<f64>,
    ) -> Result<(), Error> {
        match self {
            Self::ConstantAdditive(value) => *additive += value,
            Self::ConstantRelative(value) => *relative += value,
            Self::ArcWiseAdditive(arcwise) => {
                let t = data.link_end_time(arcwise.reference_index)?;
                *additive += arcwise.value(t)?;
            },
            Self::ArcWiseRelative(arcwise) => {
                let t = data.link_end_time(arcwise.reference_index)?;
                *relative += arcwise.value(t)?;
            },
            Self::ConstantTimeDrift {
                drift,
                reference_epoch,
                reference_index,
            } => {
                let t = data.link_end_time(*reference_index)?;
                *additive += drift * (t - reference_epoch);
            },
            Self::Multiple(biases) => {
                for bias in biases.iter() {
                    bias.accumulate(data, additive, relative)?;
                }
            },
        }
        Ok(())
    }

    /// Applies this bias to the ideal observable
    pub fn apply(&self, ideal: &DVector<f64>, data: &LinkEndData) -> Result<DVector<f64>, Error> {
        let mut additive = DVector::zeros(ideal.len());
        let mut relative = DVector::zeros(ideal.len());

        self.accumulate(data, &mut additive, &mut relative)?;

        debug!("bias: additive={} relative={}", additive, relative);

        Ok(additive + ideal + relative.component_mul(ideal))
    }
}
