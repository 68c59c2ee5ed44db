//! Flavors - Z3 charge assignment and the quark/baryon lookup table
//!
//! Every instanton carries a flavor label. The label plus the sign pattern of
//! its position fix a charge in Z3 = {0, 1, 2}:
//!
//! ```text
//! charge = (base(flavor) + #{axes with component > 0}) mod 3
//! ```
//!
//! `base` is 0/1/2 for u/d/s (case-insensitive). Any other label goes through
//! BLAKE3: the first 8 digest bytes read as a little-endian u64, mod 3. BLAKE3
//! is stable across platforms and processes, so unknown flavors still give
//! reproducible charges.

use std::collections::BTreeMap;

use crate::vector::Position;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default spawn weights: u:d = 2:1.
pub fn default_weights() -> BTreeMap<String, f64> {
    BTreeMap::from([("u".to_string(), 2.0), ("d".to_string(), 1.0)])
}

/// Base Z3 class of a flavor label.
pub fn base_charge(flavor: &str) -> u8 {
    match flavor.to_ascii_lowercase().as_str() {
        "u" => 0,
        "d" => 1,
        "s" => 2,
        _ => {
            let digest = blake3::hash(flavor.as_bytes());
            let mut head = [0u8; 8];
            head.copy_from_slice(&digest.as_bytes()[..8]);
            (u64::from_le_bytes(head) % 3) as u8
        }
    }
}

/// Z3 charge for a flavor at a position.
pub fn charge(flavor: &str, position: &Position) -> u8 {
    let parity = (position.positive_count() % 3) as u8;
    (base_charge(flavor) + parity) % 3
}

/// Physical properties of a known quark flavor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuarkInfo {
    /// Electric charge in units of e/3.
    pub charge_thirds: i32,
    /// Bare mass in MeV/c^2.
    pub mass_mev: f64,
}

/// Look up a known flavor.
pub fn quark_info(flavor: &str) -> Option<QuarkInfo> {
    match flavor.to_ascii_lowercase().as_str() {
        "u" => Some(QuarkInfo {
            charge_thirds: 2,
            mass_mev: 2.3,
        }),
        "d" => Some(QuarkInfo {
            charge_thirds: -1,
            mass_mev: 4.8,
        }),
        "s" => Some(QuarkInfo {
            charge_thirds: -1,
            mass_mev: 95.0,
        }),
        _ => None,
    }
}

/// Baryon classes recognised from a composition key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Baryon {
    /// uud
    Proton,
    /// udd
    Neutron,
}

impl Baryon {
    /// Classify a sorted composition key.
    pub fn classify<S: AsRef<str>>(composition: &[S]) -> Option<Self> {
        let key: Vec<&str> = composition.iter().map(AsRef::as_ref).collect();
        match key.as_slice() {
            ["d", "u", "u"] => Some(Baryon::Proton),
            ["d", "d", "u"] => Some(Baryon::Neutron),
            _ => None,
        }
    }

    /// Rest mass in MeV/c^2.
    pub fn mass_mev(&self) -> f64 {
        match self {
            Baryon::Proton => 938.3,
            Baryon::Neutron => 939.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_flavors() {
        let p = Position::new(-1.0, -1.0, -1.0);
        assert_eq!(charge("u", &p), 0);
        assert_eq!(charge("d", &p), 1);
        assert_eq!(charge("S", &p), 2);
    }

    #[test]
    fn test_parity_offset() {
        // Two positive axes add 2.
        assert_eq!(charge("u", &Position::new(1.0, 1.0, 0.0)), 2);
        // Three positive axes wrap to 0.
        assert_eq!(charge("d", &Position::new(0.5, 0.5, 0.5)), 1);
    }

    #[test]
    fn test_unknown_flavor_deterministic() {
        let p = Position::new(0.3, -0.2, 0.0);
        let first = charge("charm", &p);
        for _ in 0..10 {
            assert_eq!(charge("charm", &p), first);
        }
        assert!(first < 3);
        assert!(base_charge("bottom") < 3);
    }

    #[test]
    fn test_classify() {
        assert_eq!(Baryon::classify(&["d", "u", "u"]), Some(Baryon::Proton));
        assert_eq!(Baryon::classify(&["d", "d", "u"]), Some(Baryon::Neutron));
        assert_eq!(Baryon::classify(&["u", "u", "u"]), None);
        assert_eq!(Baryon::classify::<&str>(&[]), None);
    }

    #[test]
    fn test_default_weights() {
        let w = default_weights();
        assert_eq!(w.get("u"), Some(&2.0));
        assert_eq!(w.get("d"), Some(&1.0));
    }
}
