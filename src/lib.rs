//! Instanton Field - stochastic fluctuations that settle into worldtubes
//!
//! Transient point events appear, cluster in threes, and the Z3-neutral
//! clusters persist.
//!
//! # Core Types
//!
//! - **Instanton**: transient point event with a flavor and a Z3 charge
//! - **Composite**: a glued triple; stable when its charges sum to 0 mod 3
//! - **Environment**: fluctuation pool, worldtube store, clock and history
//!
//! # One Step
//!
//! Every step runs the same fixed sequence:
//!
//! 1. **Propagate** - worldtubes stamped at the previous step move forward
//!    with small Gaussian jitter, clamped to the bounds
//! 2. **Advance** - the clock moves by `dt`
//! 3. **Spawn** - a Poisson number of new instantons lands uniformly in the box
//! 4. **Match** - a greedy density-first scan finds close triples
//! 5. **Stabilize** - neutral triples leave the pool and join the store
//! 6. **Clean up** - stabilized and stale instantons are evicted
//!
//! Reordering these stages changes outcomes.
//!
//! # Determinism
//!
//! Poisson counts, positions, flavors, noise and identifiers all come from
//! one seeded ChaCha stream, so a fixed seed reproduces the whole history.
//!
//! # Example
//!
//! ```rust
//! use instanton_field::{Bounds, Environment, EventKind, FnObserver, HistoryRecord, SimConfig, StepParams};
//! use std::sync::Arc;
//!
//! let params = StepParams::default()
//!     .with_spawn_rate(12.0)
//!     .with_threshold(0.4)
//!     .with_perturbation(0.02)
//!     .with_max_age(3.0);
//! let config = SimConfig::new(Bounds::unit(), 1.0)
//!     .with_seed(7)
//!     .with_params(params);
//! let mut env = Environment::new(config).unwrap();
//!
//! env.subscribe(Arc::new(FnObserver(|record: &HistoryRecord| {
//!     if record.kind() == EventKind::CcpStable {
//!         // a new baryon-like worldtube may have formed
//!     }
//! })));
//!
//! env.evolve(20).unwrap();
//!
//! for composite in env.worldtubes() {
//!     assert!(composite.is_stable());
//!     assert_eq!(composite.total_charge(), 0);
//! }
//! let census = env.census();
//! assert_eq!(census.stored_composites, env.worldtubes().len());
//! ```

mod cleanup;
mod config;
mod entity;
mod environment;
mod error;
mod flavor;
mod observer;
mod propagate;
mod pushout;
mod spawn;
mod stability;
mod vector;

pub use config::{Bounds, SimConfig, StepParams, MAX_SPAWN_MEAN};
pub use entity::{Composite, Instanton};
pub use environment::{Census, Environment};
pub use error::{Result, SimError};
pub use flavor::{base_charge, charge, default_weights, quark_info, Baryon, QuarkInfo};
pub use observer::{ChannelObserver, EventKind, FnObserver, HistoryRecord, SimEvent, SimObserver};
pub use pushout::find_triples;
pub use vector::Position;

pub use uuid::Uuid;
