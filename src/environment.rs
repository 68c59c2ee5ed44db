//! Instanton Environment - pool, worldtube store, clock and the evolution driver

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use uuid::Uuid;

use crate::config::{Bounds, SimConfig, StepParams};
use crate::entity::{random_id, Composite, Instanton};
use crate::error::Result;
use crate::flavor::Baryon;
use crate::observer::{HistoryRecord, SimEvent, SimObserver};
use crate::vector::Position;

/// Grouping times are matched against `t - dt` within `dt * TIME_TOLERANCE`.
pub(crate) const TIME_TOLERANCE: f64 = 1e-6;

/// Snapshot summary of an environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Census {
    pub time: f64,
    pub pool_size: usize,
    pub stored_composites: usize,
    /// Distinct group ids across the whole store.
    pub worldtubes: usize,
    /// Protons among composites stamped at the current time.
    pub protons: usize,
    /// Neutrons among composites stamped at the current time.
    pub neutrons: usize,
}

/// The simulation environment.
///
/// Owns the fluctuation pool (transient instantons awaiting evaluation), the
/// persistent worldtube store (every stable composite ever promoted), the
/// history log and the single seeded random source.
pub struct Environment {
    /// Configuration.
    pub(crate) config: SimConfig,

    /// Current simulation time.
    pub(crate) current_time: f64,

    /// Transient instantons.
    pub(crate) pool: Vec<Instanton>,

    /// Stable composites, full history, append-only.
    pub(crate) worldtubes: Vec<Composite>,

    /// Time-stamped records for analysis/replay.
    pub(crate) history: Vec<HistoryRecord>,

    pub(crate) rng: ChaCha12Rng,

    observers: Vec<Arc<dyn SimObserver>>,
}

impl Environment {
    /// Create an environment at t = 0 with an empty pool and store.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            "Initialized instanton environment | bounds={:?}..{:?} | dt={:.4} | seed={}",
            config.bounds.lower.to_array(),
            config.bounds.upper.to_array(),
            config.dt,
            config.seed
        );
        Ok(Self {
            rng: ChaCha12Rng::seed_from_u64(config.seed),
            config,
            current_time: 0.0,
            pool: Vec::new(),
            worldtubes: Vec::new(),
            history: Vec::new(),
            observers: Vec::new(),
        })
    }

    // =========================================================================
    // TIME ADVANCEMENT
    // =========================================================================

    /// Advance simulation time by dt.
    pub fn advance_time(&mut self) {
        self.current_time += self.config.dt;
        tracing::debug!("Advanced time to t={:.6}", self.current_time);
    }

    /// Run one step: propagate, advance, spawn, match, stabilize, clean up.
    ///
    /// Propagation reads the previous step's time, matching must see this
    /// step's spawns, and stabilized members must be flagged before cleanup.
    pub fn step(&mut self, params: &StepParams) -> Result<()> {
        self.propagate_worldtubes(params.perturbation)?;
        self.advance_time();
        self.spawn_fluctuations(
            params.spawn_rate,
            params.flavor_weights.as_ref(),
            params.volume_scaling,
        );
        let candidates = self.match_configurations(params.proximity_threshold)?;
        self.check_stability(candidates);
        self.cleanup_pool(params.max_age);
        Ok(())
    }

    /// Run `steps` steps with the configured parameters.
    pub fn evolve(&mut self, steps: usize) -> Result<()> {
        let params = self.config.params.clone();
        self.evolve_with(steps, &params)
    }

    /// Run `steps` steps with explicit parameters.
    pub fn evolve_with(&mut self, steps: usize, params: &StepParams) -> Result<()> {
        params.validate()?;
        for _ in 0..steps {
            self.step(params)?;
        }
        tracing::debug!(
            steps,
            t = self.current_time,
            pool = self.pool.len(),
            worldtubes = self.worldtubes.len(),
            "evolution finished"
        );
        Ok(())
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Subscribe an observer to every future history record.
    pub fn subscribe(&mut self, observer: Arc<dyn SimObserver>) {
        self.observers.push(observer);
    }

    /// Append a record stamped with the current time and notify observers.
    pub(crate) fn record(&mut self, event: SimEvent) {
        let record = HistoryRecord {
            time: self.current_time,
            event,
        };
        tracing::trace!(kind = record.kind().as_str(), t = record.time, "recorded");
        for observer in &self.observers {
            observer.on_event(&record);
        }
        self.history.push(record);
    }

    // =========================================================================
    // POOL / STORE ACCESS
    // =========================================================================

    /// Insert an unstabilized instanton at the current time. Returns its id.
    pub fn insert_instanton(&mut self, flavor: impl Into<String>, position: Position) -> Uuid {
        let id = random_id(&mut self.rng);
        self.pool
            .push(Instanton::new(id, flavor, position, self.current_time));
        id
    }

    /// Transient instantons currently in the pool.
    pub fn pool(&self) -> &[Instanton] {
        &self.pool
    }

    /// Every stable composite promoted so far, in insertion order.
    pub fn worldtubes(&self) -> &[Composite] {
        &self.worldtubes
    }

    /// All snapshots of one worldtube, oldest first.
    pub fn worldtube(&self, group_id: Uuid) -> Vec<&Composite> {
        let mut lineage: Vec<&Composite> = self
            .worldtubes
            .iter()
            .filter(|c| c.group_id() == Some(group_id))
            .collect();
        lineage.sort_by(|a, b| a.time().total_cmp(&b.time()));
        lineage
    }

    /// Append-only history log.
    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bounds(&self) -> &Bounds {
        &self.config.bounds
    }

    pub fn dt(&self) -> f64 {
        self.config.dt
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Summary of the current state.
    pub fn census(&self) -> Census {
        let distinct: HashSet<Uuid> = self
            .worldtubes
            .iter()
            .filter_map(Composite::group_id)
            .collect();
        let tolerance = self.config.dt * TIME_TOLERANCE;
        let current = self
            .worldtubes
            .iter()
            .filter(|c| (c.time() - self.current_time).abs() <= tolerance);
        let (mut protons, mut neutrons) = (0, 0);
        for composite in current {
            match composite.baryon() {
                Some(Baryon::Proton) => protons += 1,
                Some(Baryon::Neutron) => neutrons += 1,
                None => {}
            }
        }
        Census {
            time: self.current_time,
            pool_size: self.pool.len(),
            stored_composites: self.worldtubes.len(),
            worldtubes: distinct.len(),
            protons,
            neutrons,
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("config", &self.config)
            .field("current_time", &self.current_time)
            .field("pool", &self.pool.len())
            .field("worldtubes", &self.worldtubes.len())
            .field("history", &self.history.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::observer::{EventKind, FnObserver};
    use std::sync::Mutex;

    fn unit_env(seed: u64) -> Environment {
        Environment::new(SimConfig::new(Bounds::unit(), 1.0).with_seed(seed)).unwrap()
    }

    #[test]
    fn test_new_environment() {
        let env = unit_env(7);
        assert_eq!(env.current_time(), 0.0);
        assert!(env.pool().is_empty());
        assert!(env.worldtubes().is_empty());
        assert!(env.history().is_empty());
    }

    #[test]
    fn test_new_rejects_bad_step() {
        let err = Environment::new(SimConfig::new(Bounds::unit(), -1.0)).unwrap_err();
        assert_eq!(err, SimError::NonPositiveStep(-1.0));
    }

    #[test]
    fn test_advance_time() {
        let mut env = Environment::new(SimConfig::new(Bounds::unit(), 0.25)).unwrap();
        env.advance_time();
        env.advance_time();
        assert!((env.current_time() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_insert_instanton_stamps_current_time() {
        let mut env = unit_env(1);
        env.advance_time();
        let id = env.insert_instanton("u", Position::new(0.5, 0.5, 0.5));
        assert_eq!(env.pool().len(), 1);
        assert_eq!(env.pool()[0].id(), id);
        assert_eq!(env.pool()[0].time(), 1.0);
    }

    #[test]
    fn test_record_notifies_observers_in_order() {
        let mut env = unit_env(1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        env.subscribe(Arc::new(FnObserver(move |r: &HistoryRecord| {
            sink.lock().unwrap().push(r.kind());
        })));
        env.record(SimEvent::PushoutCandidates { count: 1 });
        env.record(SimEvent::Cleanup { removed: 2 });
        assert_eq!(
            *seen.lock().unwrap(),
            vec![EventKind::PushoutCandidates, EventKind::Cleanup]
        );
        assert_eq!(env.history().len(), 2);
    }

    #[test]
    fn test_step_order_advances_clock_once() {
        let mut env = unit_env(3);
        let params = StepParams::default().with_spawn_rate(0.0);
        env.evolve_with(4, &params).unwrap();
        assert!((env.current_time() - 4.0).abs() < 1e-12);
        // Nothing spawned, nothing matched: only the per-call stability records.
        assert!(env
            .history()
            .iter()
            .all(|r| r.kind() == EventKind::CcpStable));
    }

    #[test]
    fn test_evolve_rejects_invalid_params() {
        let mut env = unit_env(3);
        let params = StepParams::default().with_threshold(-1.0);
        assert!(env.evolve_with(1, &params).is_err());
        assert_eq!(env.current_time(), 0.0);
    }
}
