//! Link ends: who participates in a tracking link, and in which role.
use std::collections::BTreeMap;

use itertools::Itertools;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::Error;

/// Role of a participant in a tracking link.
/// The derived ordering is the signal transmission order:
/// transmitter, reflectors (by index), retransmitter, receiver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LinkEndType {
    /// Signal origin
    Transmitter,
    /// Passive reflector, numbered from 1 in multi bounce order
    Reflector(u8),
    /// Onboard transponder, relaying the received signal
    Retransmitter,
    /// Signal destination
    Receiver,
}

impl LinkEndType {
    /// True for any intermediate end of a multi leg link.
    pub fn is_intermediate(&self) -> bool {
        matches!(self, Self::Reflector(_) | Self::Retransmitter)
    }
}

/// End of a single leg (one transmitter to receiver hop).
/// Designates which end's time is held fixed by the light time solver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LegEnd {
    Transmitter,
    Receiver,
}

/// Physical participant: body, and possibly a reference point (ground station,
/// antenna..) attached to it. An empty reference point designates the body center.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkEndId {
    /// Body name
    pub body: String,
    /// Reference point name, empty for body center
    #[cfg_attr(feature = "serde", serde(default))]
    pub reference_point: String,
}

impl LinkEndId {
    /// Body center
    pub fn body(body: &str) -> Self {
        Self {
            body: body.to_string(),
            reference_point: String::new(),
        }
    }

    /// Reference point attached to a body (typically a ground station)
    pub fn station(body: &str, reference_point: &str) -> Self {
        Self {
            body: body.to_string(),
            reference_point: reference_point.to_string(),
        }
    }

    /// True when this designates the body center
    pub fn is_body_center(&self) -> bool {
        self.reference_point.is_empty()
    }
}

impl std::fmt::Display for LinkEndId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.reference_point.is_empty() {
            write!(f, "{}", self.body)
        } else {
            write!(f, "{}/{}", self.body, self.reference_point)
        }
    }
}

/// Ordered [LinkEndType] to [LinkEndId] mapping.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        from = "Vec<(LinkEndType, LinkEndId)>",
        into = "Vec<(LinkEndType, LinkEndId)>"
    )
)]
pub struct LinkEnds {
    ends: BTreeMap<LinkEndType, LinkEndId>,
}

impl From<Vec<(LinkEndType, LinkEndId)>> for LinkEnds {
    fn from(ends: Vec<(LinkEndType, LinkEndId)>) -> Self {
        Self {
            ends: ends.into_iter().collect(),
        }
    }
}

impl From<LinkEnds> for Vec<(LinkEndType, LinkEndId)> {
    fn from(ends: LinkEnds) -> Self {
        ends.ends.into_iter().collect()
    }
}

impl LinkEnds {
    /// One-way link between two participants
    pub fn one_way(transmitter: LinkEndId, receiver: LinkEndId) -> Self {
        Self::default()
            .with(LinkEndType::Transmitter, transmitter)
            .with(LinkEndType::Receiver, receiver)
    }

    /// Two-way link through a single reflector
    pub fn two_way(transmitter: LinkEndId, reflector: LinkEndId, receiver: LinkEndId) -> Self {
        Self::one_way(transmitter, receiver).with(LinkEndType::Reflector(1), reflector)
    }

    /// Copies and returns [Self] with given link end (re)defined.
    pub fn with(&self, end: LinkEndType, id: LinkEndId) -> Self {
        let mut s = self.clone();
        s.ends.insert(end, id);
        s
    }

    /// Defines (or replaces) given link end.
    pub fn insert(&mut self, end: LinkEndType, id: LinkEndId) {
        self.ends.insert(end, id);
    }

    pub fn get(&self, end: LinkEndType) -> Option<&LinkEndId> {
        self.ends.get(&end)
    }

    pub fn contains(&self, end: LinkEndType) -> bool {
        self.ends.contains_key(&end)
    }

    /// Total number of link ends
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Number of legs (hops) in this link
    pub fn num_legs(&self) -> usize {
        self.ends.len().saturating_sub(1)
    }

    /// Intermediate ends, in transmission order
    pub fn intermediates(&self) -> impl Iterator<Item = (&LinkEndType, &LinkEndId)> + '_ {
        self.ends.iter().filter(|(end, _)| end.is_intermediate())
    }

    /// All ends, in transmission order
    pub fn ordered(&self) -> impl Iterator<Item = (&LinkEndType, &LinkEndId)> + '_ {
        self.ends.iter()
    }

    /// Position of given end in transmission order
    pub fn index_of(&self, end: LinkEndType) -> Option<usize> {
        self.ends.keys().position(|k| *k == end)
    }

    /// Link end type at given position in transmission order
    pub fn type_at(&self, index: usize) -> Option<LinkEndType> {
        self.ends.keys().nth(index).copied()
    }

    /// Each leg, as (transmitting end, receiving end), in transmission order
    pub fn legs(
        &self,
    ) -> impl Iterator<Item = ((LinkEndType, &LinkEndId), (LinkEndType, &LinkEndId))> + '_ {
        self.ends
            .iter()
            .map(|(k, v)| (*k, v))
            .tuple_windows()
    }

    /// Verifies the generic invariants: one transmitter, one receiver,
    /// reflectors numbered contiguously from 1.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.contains(LinkEndType::Transmitter) {
            return Err(Error::MissingTransmitter);
        }
        if !self.contains(LinkEndType::Receiver) {
            return Err(Error::MissingReceiver);
        }
        for (expected, end) in self
            .ends
            .keys()
            .filter(|k| matches!(k, LinkEndType::Reflector(_)))
            .enumerate()
        {
            if *end != LinkEndType::Reflector(expected as u8 + 1) {
                return Err(Error::NonContiguousReflectors(*end));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn transmission_order() {
        let ends = LinkEnds::default()
            .with(LinkEndType::Receiver, LinkEndId::station("Earth", "DSS-63"))
            .with(LinkEndType::Reflector(2), LinkEndId::body("Moon"))
            .with(LinkEndType::Transmitter, LinkEndId::station("Earth", "DSS-14"))
            .with(LinkEndType::Reflector(1), LinkEndId::body("LRO"));

        let order = ends.ordered().map(|(k, _)| *k).collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                LinkEndType::Transmitter,
                LinkEndType::Reflector(1),
                LinkEndType::Reflector(2),
                LinkEndType::Receiver
            ]
        );

        assert_eq!(ends.num_legs(), 3);
        assert_eq!(ends.index_of(LinkEndType::Reflector(2)), Some(2));
        assert_eq!(ends.type_at(3), Some(LinkEndType::Receiver));

        let legs = ends.legs().map(|(tx, rx)| (tx.0, rx.0)).collect::<Vec<_>>();
        assert_eq!(legs[0], (LinkEndType::Transmitter, LinkEndType::Reflector(1)));
        assert_eq!(legs[2], (LinkEndType::Reflector(2), LinkEndType::Receiver));

        assert!(ends.validate().is_ok());
    }

    #[test]
    fn retransmitter_after_reflectors() {
        assert!(LinkEndType::Reflector(4) < LinkEndType::Retransmitter);
        assert!(LinkEndType::Retransmitter < LinkEndType::Receiver);
        assert!(LinkEndType::Transmitter < LinkEndType::Reflector(1));
    }

    #[test]
    fn invalid_topologies() {
        let ends = LinkEnds::default().with(LinkEndType::Receiver, LinkEndId::body("Mars"));
        assert_eq!(ends.validate(), Err(Error::MissingTransmitter));

        let ends = LinkEnds::default().with(LinkEndType::Transmitter, LinkEndId::body("Earth"));
        assert_eq!(ends.validate(), Err(Error::MissingReceiver));

        let ends = LinkEnds::one_way(LinkEndId::body("Earth"), LinkEndId::body("Earth"))
            .with(LinkEndType::Reflector(2), LinkEndId::body("Mars"));
        assert_eq!(
            ends.validate(),
            Err(Error::NonContiguousReflectors(LinkEndType::Reflector(2)))
        );
    }

    #[test]
    fn display() {
        assert_eq!(LinkEndId::body("Mars").to_string(), "Mars");
        assert_eq!(LinkEndId::station("Earth", "DSS-43").to_string(), "Earth/DSS-43");
    }
}
