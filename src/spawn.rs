//! Fluctuation generator - Poisson spawning of new instantons

use std::collections::BTreeMap;

use rand::distr::weighted::WeightedIndex;
use rand::Rng;
use rand_distr::{Distribution, Poisson};

use crate::config::MAX_SPAWN_MEAN;
use crate::entity::{random_id, Instanton};
use crate::environment::Environment;
use crate::flavor;
use crate::observer::SimEvent;
use crate::vector::Position;

/// Normalized flavor sampler. Falls back to the default weights when the
/// given map is missing, empty or has no positive weight.
struct FlavorSampler {
    labels: Vec<String>,
    index: WeightedIndex<f64>,
}

impl FlavorSampler {
    fn new(weights: Option<&BTreeMap<String, f64>>) -> Option<Self> {
        weights
            .filter(|w| !w.is_empty())
            .and_then(Self::from_map)
            .or_else(|| Self::from_map(&flavor::default_weights()))
    }

    fn from_map(weights: &BTreeMap<String, f64>) -> Option<Self> {
        let labels: Vec<String> = weights.keys().cloned().collect();
        let index = WeightedIndex::new(weights.values().copied()).ok()?;
        Some(Self { labels, index })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.labels[self.index.sample(rng)]
    }
}

impl Environment {
    /// Spawn a Poisson number of instantons uniformly inside the bounds.
    ///
    /// The mean is `rate`, or `rate * volume` with `volume_scaling`. A
    /// non-positive rate spawns nothing, and a mean above `MAX_SPAWN_MEAN` is
    /// refused. Returns the ids of new instantons.
    pub fn spawn_fluctuations(
        &mut self,
        rate: f64,
        weights: Option<&BTreeMap<String, f64>>,
        volume_scaling: bool,
    ) -> Vec<uuid::Uuid> {
        let lambda = if volume_scaling {
            rate * self.config.bounds.volume()
        } else {
            rate
        };
        if !(lambda > 0.0) {
            return Vec::new();
        }
        if lambda > MAX_SPAWN_MEAN {
            tracing::warn!("Poisson mean {lambda} exceeds {MAX_SPAWN_MEAN}; nothing spawned");
            return Vec::new();
        }
        let count = match Poisson::new(lambda) {
            Ok(poisson) => poisson.sample(&mut self.rng) as usize,
            Err(err) => {
                tracing::warn!("Poisson mean {lambda} rejected: {err}");
                return Vec::new();
            }
        };
        if count == 0 {
            return Vec::new();
        }

        let Some(sampler) = FlavorSampler::new(weights) else {
            return Vec::new();
        };
        let bounds = self.config.bounds;
        let mut ids = Vec::new();
        for _ in 0..count {
            let mut coords = [0.0; 3];
            for (axis, c) in coords.iter_mut().enumerate() {
                let (lo, hi) = (bounds.lower.get(axis), bounds.upper.get(axis));
                *c = lo + (hi - lo) * self.rng.random::<f64>();
            }
            let flavor = sampler.sample(&mut self.rng).to_string();
            let id = random_id(&mut self.rng);
            self.pool.push(Instanton::new(
                id,
                flavor,
                Position::from(coords),
                self.current_time,
            ));
            ids.push(id);
        }

        tracing::debug!(count, t = self.current_time, "spawned instantons");
        self.record(SimEvent::Spawn {
            count,
            ids: ids.clone(),
        });
        ids
    }
}
