//! Instantons and composites
//!
//! An [`Instanton`] is a transient point event with a flavor and a Z3 charge.
//! A [`Composite`] glues several instantons together (the pushout); it is
//! stable when it has at least three members and its charges sum to 0 mod 3.

use rand::Rng;
use uuid::Uuid;

use crate::error::{Result, SimError};
use crate::flavor::{self, Baryon};
use crate::vector::Position;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Draw an identifier from the simulation's random source.
pub(crate) fn random_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.random()).into_uuid()
}

/// A transient instanton event.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Instanton {
    id: Uuid,
    flavor: String,
    position: Position,
    time: f64,
    stabilized: bool,
    group_id: Option<Uuid>,
    charge: u8,
}

impl Instanton {
    /// Create an unstabilized instanton. The charge is fixed here.
    pub fn new(id: Uuid, flavor: impl Into<String>, position: Position, time: f64) -> Self {
        let flavor = flavor.into();
        let charge = flavor::charge(&flavor, &position);
        Self {
            id,
            flavor,
            position,
            time,
            stabilized: false,
            group_id: None,
            charge,
        }
    }

    /// Create an instanton already bound to a worldtube.
    pub(crate) fn new_stabilized(
        id: Uuid,
        flavor: impl Into<String>,
        position: Position,
        time: f64,
        group_id: Uuid,
    ) -> Self {
        let mut kq = Self::new(id, flavor, position, time);
        kq.stabilize(group_id);
        kq
    }

    pub(crate) fn stabilize(&mut self, group_id: Uuid) {
        debug_assert!(!self.stabilized, "instanton {} stabilized twice", self.id);
        self.stabilized = true;
        self.group_id = Some(group_id);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn flavor(&self) -> &str {
        &self.flavor
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn is_stabilized(&self) -> bool {
        self.stabilized
    }

    pub fn group_id(&self) -> Option<Uuid> {
        self.group_id
    }

    /// Z3 charge in {0, 1, 2}.
    pub fn charge(&self) -> u8 {
        self.charge
    }
}

/// A composite configuration of instantons.
///
/// Derived fields (centroid, composition, stability) are computed once at
/// construction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Composite {
    members: Vec<Instanton>,
    time: f64,
    centroid: Position,
    composition: Vec<String>,
    stable: bool,
    group_id: Option<Uuid>,
}

impl Composite {
    /// Glue members together. A stable composite draws a fresh group id.
    pub fn new<R: Rng + ?Sized>(members: Vec<Instanton>, time: f64, rng: &mut R) -> Result<Self> {
        let mut composite = Self::assemble(members, time, None)?;
        if composite.stable {
            composite.group_id = Some(random_id(rng));
        }
        Ok(composite)
    }

    /// Glue members together under an existing group id (worldtube successor).
    pub fn with_group_id(members: Vec<Instanton>, time: f64, group_id: Uuid) -> Result<Self> {
        Self::assemble(members, time, Some(group_id))
    }

    fn assemble(members: Vec<Instanton>, time: f64, group_id: Option<Uuid>) -> Result<Self> {
        let centroid =
            Position::mean(members.iter().map(Instanton::position)).ok_or(SimError::EmptyComposite)?;
        let mut composition: Vec<String> = members.iter().map(|kq| kq.flavor.clone()).collect();
        composition.sort();
        let stable = Self::assess_stability(&members);
        Ok(Self {
            members,
            time,
            centroid,
            composition,
            stable,
            group_id,
        })
    }

    /// At least three members and Z3 neutral.
    fn assess_stability(members: &[Instanton]) -> bool {
        if members.len() < 3 {
            return false;
        }
        let total: u32 = members.iter().map(|kq| u32::from(kq.charge)).sum();
        total % 3 == 0
    }

    pub fn members(&self) -> &[Instanton] {
        &self.members
    }

    pub(crate) fn members_mut(&mut self) -> &mut [Instanton] {
        &mut self.members
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn centroid(&self) -> &Position {
        &self.centroid
    }

    /// Sorted member flavors.
    pub fn composition(&self) -> &[String] {
        &self.composition
    }

    pub fn is_stable(&self) -> bool {
        self.stable
    }

    pub fn group_id(&self) -> Option<Uuid> {
        self.group_id
    }

    /// Return the group id, drawing one first if none is set.
    pub(crate) fn ensure_group_id<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Uuid {
        *self.group_id.get_or_insert_with(|| random_id(rng))
    }

    /// Sum of member Z3 charges, mod 3.
    pub fn total_charge(&self) -> u8 {
        (self.members.iter().map(|kq| u32::from(kq.charge)).sum::<u32>() % 3) as u8
    }

    /// Electric charge in units of e/3. `None` if any flavor is not a known quark.
    pub fn electric_charge_thirds(&self) -> Option<i32> {
        self.members
            .iter()
            .map(|kq| flavor::quark_info(&kq.flavor).map(|q| q.charge_thirds))
            .sum()
    }

    /// Baryon class of the composition, if recognised.
    pub fn baryon(&self) -> Option<Baryon> {
        Baryon::classify(self.composition.as_slice())
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.members.iter().any(|kq| kq.id == id)
    }
}
