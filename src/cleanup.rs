//! Pool maintenance

use crate::environment::{Environment, TIME_TOLERANCE};
use crate::observer::SimEvent;

impl Environment {
    /// Evict stabilized instantons, and unstabilized ones created before
    /// `current_time - max_age` when a max age is given. Returns the count removed.
    pub fn cleanup_pool(&mut self, max_age: Option<f64>) -> usize {
        let before = self.pool.len();
        let tolerance = self.config.dt * TIME_TOLERANCE;
        let cutoff = max_age.map(|age| self.current_time - age - tolerance);
        self.pool.retain(|kq| {
            if kq.is_stabilized() {
                return false;
            }
            match cutoff {
                Some(cutoff) => kq.time() >= cutoff,
                None => true,
            }
        });
        let removed = before - self.pool.len();
        if removed > 0 {
            tracing::debug!(removed, t = self.current_time, "pool cleanup");
            self.record(SimEvent::Cleanup { removed });
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Bounds, SimConfig};
    use crate::vector::Position;

    fn env() -> Environment {
        Environment::new(SimConfig::new(Bounds::unit(), 1.0)).unwrap()
    }

    #[test]
    fn test_zero_age_keeps_current() {
        let mut e = env();
        e.advance_time();
        e.insert_instanton("u", Position::new(0.5, 0.5, 0.5));
        e.insert_instanton("d", Position::new(0.4, 0.5, 0.5));
        assert_eq!(e.cleanup_pool(Some(0.0)), 0);
        assert_eq!(e.pool().len(), 2);
        assert!(e.history().is_empty());
    }

    #[test]
    fn test_zero_age_evicts_older() {
        let mut e = env();
        e.insert_instanton("u", Position::new(0.5, 0.5, 0.5));
        e.advance_time();
        let fresh = e.insert_instanton("d", Position::new(0.4, 0.5, 0.5));
        assert_eq!(e.cleanup_pool(Some(0.0)), 1);
        assert_eq!(e.pool().len(), 1);
        assert_eq!(e.pool()[0].id(), fresh);
        assert_eq!(
            e.history().last().unwrap().event,
            SimEvent::Cleanup { removed: 1 }
        );
    }

    #[test]
    fn test_exact_age_survives_clock_drift() {
        let mut e = Environment::new(SimConfig::new(Bounds::unit(), 0.1)).unwrap();
        e.advance_time();
        let born = e.insert_instanton("u", Position::new(0.5, 0.5, 0.5));
        e.advance_time();
        e.advance_time();
        // 0.1 + 0.1 + 0.1 overshoots 0.3, so the raw cutoff lands past 0.1.
        assert!(e.current_time() - 0.2 > 0.1);
        assert_eq!(e.cleanup_pool(Some(0.2)), 0);
        assert_eq!(e.pool()[0].id(), born);

        e.advance_time();
        assert_eq!(e.cleanup_pool(Some(0.2)), 1);
        assert!(e.pool().is_empty());
    }

    #[test]
    fn test_no_max_age_keeps_old() {
        let mut e = env();
        e.insert_instanton("u", Position::new(0.5, 0.5, 0.5));
        for _ in 0..10 {
            e.advance_time();
        }
        assert_eq!(e.cleanup_pool(None), 0);
        assert_eq!(e.pool().len(), 1);
    }

    #[test]
    fn test_stabilized_always_evicted() {
        let mut e = env();
        e.insert_instanton("u", Position::new(0.5, 0.5, 0.5));
        e.insert_instanton("u", Position::new(0.6, 0.5, 0.5));
        e.pool[0].stabilize(uuid::Uuid::nil());
        assert_eq!(e.cleanup_pool(None), 1);
        assert!(e.pool().iter().all(|kq| !kq.is_stabilized()));
    }
}
