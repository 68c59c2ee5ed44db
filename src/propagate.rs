//! Worldtube propagator - carries stable composites forward one step

use rand_distr::{Distribution, Normal};
use uuid::Uuid;

use crate::entity::{random_id, Composite, Instanton};
use crate::environment::{Environment, TIME_TOLERANCE};
use crate::error::Result;
use crate::observer::SimEvent;
use crate::vector::Position;

impl Environment {
    /// Create successors at the current time for every stable composite
    /// stamped at `current_time - dt`.
    ///
    /// Each member moves by independent zero-mean Gaussian noise per axis
    /// (standard deviation `perturbation`) and is clamped into the bounds.
    /// Successors keep their predecessor's group id. Sources are read from a
    /// snapshot, so successors made here are never sources in the same call.
    ///
    /// A successor whose charges no longer neutralize after clamping is
    /// dropped and recorded as a worldtube break. Returns the propagated ids.
    pub fn propagate_worldtubes(&mut self, perturbation: f64) -> Result<Vec<Uuid>> {
        let now = self.current_time;
        let previous = now - self.config.dt;
        let tolerance = self.config.dt * TIME_TOLERANCE;

        let sources: Vec<(Uuid, Vec<(String, Position)>)> = self
            .worldtubes
            .iter()
            .filter(|c| c.is_stable() && (c.time() - previous).abs() <= tolerance)
            .filter_map(|c| {
                let members = c
                    .members()
                    .iter()
                    .map(|kq| (kq.flavor().to_string(), *kq.position()))
                    .collect();
                c.group_id().map(|gid| (gid, members))
            })
            .collect();
        if sources.is_empty() {
            return Ok(Vec::new());
        }

        // None when noise is disabled; no draws are made.
        let noise: Option<Normal<f64>> = if perturbation > 0.0 {
            Normal::new(0.0, perturbation).ok()
        } else {
            None
        };

        let bounds = self.config.bounds;
        let mut propagated = Vec::new();
        for (group_id, members) in sources {
            let mut successors = Vec::with_capacity(members.len());
            for (flavor, position) in members {
                let delta = match &noise {
                    Some(normal) => [
                        normal.sample(&mut self.rng),
                        normal.sample(&mut self.rng),
                        normal.sample(&mut self.rng),
                    ],
                    None => [0.0; 3],
                };
                let moved = bounds.clamp(&position.offset(delta));
                let id = random_id(&mut self.rng);
                successors.push(Instanton::new_stabilized(id, flavor, moved, now, group_id));
            }

            let successor = Composite::with_group_id(successors, now, group_id)?;
            if successor.is_stable() {
                self.worldtubes.push(successor);
                propagated.push(group_id);
            } else {
                tracing::warn!(%group_id, t = now, "worldtube lost neutrality at the boundary");
                self.record(SimEvent::WorldtubeBreak { group_id });
            }
        }

        if !propagated.is_empty() {
            tracing::debug!(count = propagated.len(), t = now, "propagated worldtubes");
            self.record(SimEvent::WorldtubePropagation {
                count: propagated.len(),
                group_ids: propagated.clone(),
            });
        }
        Ok(propagated)
    }
}
