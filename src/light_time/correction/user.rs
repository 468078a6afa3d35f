use std::sync::Arc;

use nalgebra::Vector3;

use crate::prelude::{CorrectionRuntime, Error, LegEnd};

use super::{LightTimeCorrection, LightTimeCorrectionType};

/// User defined light time correction value (s)
pub type UserDefinedValue = Arc<dyn Fn(&CorrectionRuntime) -> f64 + Send + Sync>;

/// User defined gradient (s/m) with respect to a [LegEnd] position
pub type UserDefinedPartial = Arc<dyn Fn(&CorrectionRuntime, LegEnd) -> Vector3<f64> + Send + Sync>;

/// Light time correction defined by closures.
/// When no partial is provided, the correction is considered position independent.
#[derive(Clone)]
pub struct UserDefinedCorrection {
    value: UserDefinedValue,
    partial: Option<UserDefinedPartial>,
}

impl UserDefinedCorrection {
    pub fn new(value: UserDefinedValue) -> Self {
        Self {
            value,
            partial: None,
        }
    }

    /// Copies and returns [Self] with position partials
    pub fn with_partial(&self, partial: UserDefinedPartial) -> Self {
        let mut s = self.clone();
        s.partial = Some(partial);
        s
    }
}

impl LightTimeCorrection for UserDefinedCorrection {
    fn correction_type(&self) -> LightTimeCorrectionType {
        LightTimeCorrectionType::UserDefined
    }

    fn value(&self, rtm: &CorrectionRuntime) -> Result<f64, Error> {
        Ok((self.value)(rtm))
    }

    fn partial_wrt_link_end_position(
        &self,
        rtm: &CorrectionRuntime,
        end: LegEnd,
    ) -> Result<Vector3<f64>, Error> {
        match &self.partial {
            Some(partial) => Ok(partial(rtm, end)),
            None => Ok(Vector3::zeros()),
        }
    }
}
