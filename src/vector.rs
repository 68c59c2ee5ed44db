//! Position - 3D spatial vector for instantons and composite barycenters
//!
//! Positions are plain `[f64; 3]` triples. Dimensionality is enforced at the
//! type level; slices coming from outside are checked in `TryFrom`.

use crate::error::{Result, SimError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in the simulation volume.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position([f64; 3]);

impl Position {
    /// Create from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }

    /// Create from a slice, checking length and finiteness.
    pub fn from_slice(values: &[f64], what: &'static str) -> Result<Self> {
        let arr: [f64; 3] = values
            .try_into()
            .map_err(|_| SimError::InvalidDimension {
                what,
                expected: 3,
                actual: values.len(),
            })?;
        if arr.iter().any(|v| !v.is_finite()) {
            return Err(SimError::NonFiniteComponent { what });
        }
        Ok(Self(arr))
    }

    /// Get component at axis.
    #[inline]
    pub fn get(&self, axis: usize) -> f64 {
        self.0[axis]
    }

    /// Components as an array.
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        self.0
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Position) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Component-wise add.
    pub fn offset(&self, delta: [f64; 3]) -> Self {
        Self([
            self.0[0] + delta[0],
            self.0[1] + delta[1],
            self.0[2] + delta[2],
        ])
    }

    /// Component-wise clamp into `[lower, upper]`.
    pub fn clamp(&self, lower: &Position, upper: &Position) -> Self {
        let mut out = self.0;
        for (axis, v) in out.iter_mut().enumerate() {
            *v = v.clamp(lower.0[axis], upper.0[axis]);
        }
        Self(out)
    }

    /// Number of strictly positive components.
    pub fn positive_count(&self) -> usize {
        self.0.iter().filter(|&&v| v > 0.0).count()
    }

    /// Arithmetic mean of a set of positions. `None` when empty.
    pub fn mean<'a>(positions: impl IntoIterator<Item = &'a Position>) -> Option<Self> {
        let mut sum = [0.0; 3];
        let mut n = 0usize;
        for p in positions {
            for (s, v) in sum.iter_mut().zip(p.0.iter()) {
                *s += v;
            }
            n += 1;
        }
        if n == 0 {
            return None;
        }
        let n = n as f64;
        Some(Self([sum[0] / n, sum[1] / n, sum[2] / n]))
    }
}

impl From<[f64; 3]> for Position {
    fn from(values: [f64; 3]) -> Self {
        Self(values)
    }
}

impl TryFrom<&[f64]> for Position {
    type Error = SimError;

    fn try_from(values: &[f64]) -> Result<Self> {
        Self::from_slice(values, "position")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_rejects_wrong_dims() {
        let err = Position::from_slice(&[1.0, 2.0], "position").unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidDimension {
                what: "position",
                expected: 3,
                actual: 2
            }
        );
        assert!(Position::try_from(&[0.0, 0.0, 0.0, 0.0][..]).is_err());
    }

    #[test]
    fn test_from_slice_rejects_nan() {
        assert!(Position::from_slice(&[0.0, f64::NAN, 1.0], "position").is_err());
    }

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_clamp() {
        let p = Position::new(-0.5, 0.5, 1.5);
        let c = p.clamp(&Position::new(0.0, 0.0, 0.0), &Position::new(1.0, 1.0, 1.0));
        assert_eq!(c, Position::new(0.0, 0.5, 1.0));
    }

    #[test]
    fn test_positive_count_ignores_zero() {
        assert_eq!(Position::new(0.0, 1.0, -1.0).positive_count(), 1);
        assert_eq!(Position::new(0.1, 0.2, 0.3).positive_count(), 3);
    }

    #[test]
    fn test_mean() {
        let pts = [Position::new(0.0, 0.0, 0.0), Position::new(2.0, 4.0, 6.0)];
        assert_eq!(Position::mean(&pts), Some(Position::new(1.0, 2.0, 3.0)));
        let empty: [Position; 0] = [];
        assert_eq!(Position::mean(&empty), None);
    }
}
