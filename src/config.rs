//! Simulation configuration

use std::collections::BTreeMap;

use crate::error::{Result, SimError};
use crate::vector::Position;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box of the simulation volume.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub lower: Position,
    pub upper: Position,
}

impl Bounds {
    /// Create from two corners, checking `lower <= upper` on every axis.
    pub fn new(lower: Position, upper: Position) -> Result<Self> {
        let bounds = Self { lower, upper };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Create from untyped slices (min_xyz, max_xyz).
    pub fn from_slices(lower: &[f64], upper: &[f64]) -> Result<Self> {
        Self::new(
            Position::from_slice(lower, "lower bound")?,
            Position::from_slice(upper, "upper bound")?,
        )
    }

    /// The unit cube `[0, 1]^3`.
    pub fn unit() -> Self {
        Self {
            lower: Position::new(0.0, 0.0, 0.0),
            upper: Position::new(1.0, 1.0, 1.0),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for axis in 0..3 {
            let (lo, hi) = (self.lower.get(axis), self.upper.get(axis));
            if !lo.is_finite() || !hi.is_finite() {
                return Err(SimError::NonFiniteComponent { what: "bounds" });
            }
            if lo > hi {
                return Err(SimError::InvertedBounds {
                    axis,
                    lower: lo,
                    upper: hi,
                });
            }
        }
        Ok(())
    }

    /// Box volume.
    pub fn volume(&self) -> f64 {
        (0..3)
            .map(|axis| self.upper.get(axis) - self.lower.get(axis))
            .product()
    }

    /// Clamp a position into the box.
    pub fn clamp(&self, p: &Position) -> Position {
        p.clamp(&self.lower, &self.upper)
    }

    /// Whether a position lies inside the box (inclusive).
    pub fn contains(&self, p: &Position) -> bool {
        (0..3).all(|axis| (self.lower.get(axis)..=self.upper.get(axis)).contains(&p.get(axis)))
    }
}

/// Largest Poisson mean a single spawn call will draw from.
pub const MAX_SPAWN_MEAN: f64 = 1e6;

/// Per-step knobs for spawning, matching, propagation and cleanup.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepParams {
    /// Mean Poisson spawn count per step (or per unit volume, see `volume_scaling`).
    pub spawn_rate: f64,

    /// Multiply `spawn_rate` by the bounding-box volume.
    pub volume_scaling: bool,

    /// Relative flavor weights. `None` or empty falls back to u:d = 2:1.
    pub flavor_weights: Option<BTreeMap<String, f64>>,

    /// Maximum pairwise distance inside a candidate triple.
    pub proximity_threshold: f64,

    /// Standard deviation of per-axis worldtube noise.
    pub perturbation: f64,

    /// Evict unstabilized instantons older than this. `None` keeps them.
    pub max_age: Option<f64>,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            spawn_rate: 1.0,
            volume_scaling: false,
            flavor_weights: None,
            proximity_threshold: 0.1,
            perturbation: 0.01,
            max_age: None,
        }
    }
}

impl StepParams {
    pub fn with_spawn_rate(mut self, rate: f64) -> Self {
        self.spawn_rate = rate;
        self
    }

    pub fn with_volume_scaling(mut self, enabled: bool) -> Self {
        self.volume_scaling = enabled;
        self
    }

    pub fn with_flavor_weights(mut self, weights: BTreeMap<String, f64>) -> Self {
        self.flavor_weights = Some(weights);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.proximity_threshold = threshold;
        self
    }

    pub fn with_perturbation(mut self, sigma: f64) -> Self {
        self.perturbation = sigma;
        self
    }

    pub fn with_max_age(mut self, max_age: f64) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Validate parameters. A non-positive spawn rate is allowed (no spawns).
    pub fn validate(&self) -> Result<()> {
        if self.spawn_rate.is_nan() {
            return Err(SimError::InvalidParameter("spawn_rate must not be NaN"));
        }
        if self.spawn_rate > MAX_SPAWN_MEAN {
            return Err(SimError::InvalidParameter("spawn_rate exceeds MAX_SPAWN_MEAN"));
        }
        if !(self.proximity_threshold.is_finite() && self.proximity_threshold >= 0.0) {
            return Err(SimError::InvalidParameter(
                "proximity_threshold must be finite and >= 0",
            ));
        }
        if !(self.perturbation.is_finite() && self.perturbation >= 0.0) {
            return Err(SimError::InvalidParameter(
                "perturbation must be finite and >= 0",
            ));
        }
        if let Some(max_age) = self.max_age {
            if !(max_age.is_finite() && max_age >= 0.0) {
                return Err(SimError::InvalidParameter("max_age must be finite and >= 0"));
            }
        }
        Ok(())
    }
}

/// Configuration for an instanton environment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimConfig {
    /// Spatial box all positions live in.
    pub bounds: Bounds,

    /// Fixed time step.
    pub dt: f64,

    /// Seed for the single random source.
    pub seed: u64,

    /// Parameters used by `Environment::evolve`.
    pub params: StepParams,
}

impl SimConfig {
    /// Create a configuration with default seed and step parameters.
    pub fn new(bounds: Bounds, dt: f64) -> Self {
        Self {
            bounds,
            dt,
            seed: 42,
            params: StepParams::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_params(mut self, params: StepParams) -> Self {
        self.params = params;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.bounds.validate()?;
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::NonPositiveStep(self.dt));
        }
        self.params.validate()
    }
}
