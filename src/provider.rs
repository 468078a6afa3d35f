//! State provider: the narrow interface through which observation models
//! reach the ephemeris, frame and station services.
use std::{collections::HashMap, sync::Arc};

use nalgebra::Vector6;

use crate::{
    frequency::{FrequencyFunction, TurnaroundRatioFunction},
    prelude::LinkEndId,
};

/// Cartesian state (position [m], velocity [m/s]) as a function of time
/// (seconds past J2000 TDB), expressed in the global frame.
/// Must be deterministic and side effect free: the light time solver
/// evaluates it at arbitrary times within its iteration range.
pub type StateFunction = Arc<dyn Fn(f64) -> Vector6<f64> + Send + Sync>;

/// Any environment (ephemerides, ground stations, onboard systems) should
/// implement [StateProvider] to contribute to observation model creation.
/// It is only consulted when building models: the resulting models hold on
/// to the returned functions and never call back into the provider.
pub trait StateProvider {
    /// State function of given link end (body center or reference point).
    fn link_end_state_function(&self, link_end: &LinkEndId) -> Option<StateFunction>;

    /// State function of given body center.
    fn body_state_function(&self, body: &str) -> Option<StateFunction>;

    /// Gravitational parameter (m^3 s-2) of given body.
    fn gravitational_parameter(&self, body: &str) -> Option<f64>;

    /// Frequency transmitted by given link end, when it is a transmitting station.
    fn transmitting_frequency(&self, _link_end: &LinkEndId) -> Option<FrequencyFunction> {
        None
    }

    /// Transponder turnaround ratios of given body (spacecraft).
    fn turnaround_ratio(&self, _body: &str) -> Option<TurnaroundRatioFunction> {
        None
    }
}

/// [Body] as stored in the [Bodies] registry
#[derive(Clone)]
pub struct Body {
    /// Body center state function
    pub state: StateFunction,
    /// Gravitational parameter (m^3 s-2)
    pub gravitational_parameter: Option<f64>,
    /// Reference points, with their global-frame state function
    pub reference_points: HashMap<String, StateFunction>,
    /// Transmitted frequencies, per reference point
    pub transmitting_frequencies: HashMap<String, FrequencyFunction>,
    /// Onboard transponder
    pub turnaround_ratio: Option<TurnaroundRatioFunction>,
}

impl Body {
    pub fn new(state: StateFunction) -> Self {
        Self {
            state,
            gravitational_parameter: None,
            reference_points: HashMap::new(),
            transmitting_frequencies: HashMap::new(),
            turnaround_ratio: None,
        }
    }

    /// Copies and returns [Self] with gravitational parameter (m^3 s-2).
    pub fn with_gravitational_parameter(&self, mu: f64) -> Self {
        let mut s = self.clone();
        s.gravitational_parameter = Some(mu);
        s
    }

    /// Copies and returns [Self] with onboard transponder.
    pub fn with_turnaround_ratio(&self, ratio: TurnaroundRatioFunction) -> Self {
        let mut s = self.clone();
        s.turnaround_ratio = Some(ratio);
        s
    }
}

/// Minimal in-memory [StateProvider]: named [Body]s, each possibly
/// holding named reference points. Frame and ephemeris computations remain
/// external: state functions are provided ready to use, in the global frame.
#[derive(Clone, Default)]
pub struct Bodies {
    bodies: HashMap<String, Body>,
}

impl Bodies {
    /// Registers a new [Body]
    pub fn insert(&mut self, name: &str, body: Body) {
        self.bodies.insert(name.to_string(), body);
    }

    /// Registers a reference point (ground station) on existing body.
    /// Returns false if the body does not exist.
    pub fn insert_reference_point(&mut self, body: &str, name: &str, state: StateFunction) -> bool {
        if let Some(body) = self.bodies.get_mut(body) {
            body.reference_points.insert(name.to_string(), state);
            true
        } else {
            false
        }
    }

    /// Defines the frequency transmitted by an existing reference point.
    /// Returns false if the reference point does not exist.
    pub fn set_transmitting_frequency(
        &mut self,
        link_end: &LinkEndId,
        frequency: FrequencyFunction,
    ) -> bool {
        match self.bodies.get_mut(&link_end.body) {
            Some(body) if body.reference_points.contains_key(&link_end.reference_point) => {
                body.transmitting_frequencies
                    .insert(link_end.reference_point.clone(), frequency);
                true
            },
            _ => false,
        }
    }

    /// Defines the transponder of an existing body.
    /// Returns false if the body does not exist.
    pub fn set_turnaround_ratio(&mut self, body: &str, ratio: TurnaroundRatioFunction) -> bool {
        if let Some(body) = self.bodies.get_mut(body) {
            body.turnaround_ratio = Some(ratio);
            true
        } else {
            false
        }
    }

    pub fn get(&self, name: &str) -> Option<&Body> {
        self.bodies.get(name)
    }
}

impl StateProvider for Bodies {
    fn link_end_state_function(&self, link_end: &LinkEndId) -> Option<StateFunction> {
        let body = self.bodies.get(&link_end.body)?;
        if link_end.is_body_center() {
            Some(body.state.clone())
        } else {
            body.reference_points.get(&link_end.reference_point).cloned()
        }
    }

    fn body_state_function(&self, body: &str) -> Option<StateFunction> {
        self.bodies.get(body).map(|body| body.state.clone())
    }

    fn gravitational_parameter(&self, body: &str) -> Option<f64> {
        self.bodies.get(body)?.gravitational_parameter
    }

    fn transmitting_frequency(&self, link_end: &LinkEndId) -> Option<FrequencyFunction> {
        self.bodies
            .get(&link_end.body)?
            .transmitting_frequencies
            .get(&link_end.reference_point)
            .cloned()
    }

    fn turnaround_ratio(&self, body: &str) -> Option<TurnaroundRatioFunction> {
        self.bodies.get(body)?.turnaround_ratio.clone()
    }
}
