//! Stability checker - promotes Z3-neutral candidates to worldtubes

use std::collections::HashSet;

use uuid::Uuid;

use crate::entity::Composite;
use crate::environment::Environment;
use crate::observer::SimEvent;

impl Environment {
    /// Promote the stable candidates.
    ///
    /// For each accepted composite every member is marked stabilized under the
    /// composite's group id, removed from the pool by id, and the composite is
    /// appended to the worldtube store. Unstable candidates leave their members
    /// untouched. A candidate sharing a member with an already accepted one (or
    /// holding an already stabilized member) is rejected as an overlap.
    ///
    /// Returns the accepted composites.
    pub fn check_stability(&mut self, candidates: Vec<Composite>) -> Vec<Composite> {
        let mut claimed: HashSet<Uuid> = HashSet::new();
        let mut accepted = Vec::new();
        let mut group_ids: Vec<Uuid> = Vec::new();
        let mut rejected_overlaps = 0;

        for mut candidate in candidates {
            if !candidate.is_stable() {
                continue;
            }
            let overlaps = candidate
                .members()
                .iter()
                .any(|kq| kq.is_stabilized() || claimed.contains(&kq.id()));
            if overlaps {
                rejected_overlaps += 1;
                tracing::warn!(
                    t = self.current_time,
                    "rejected candidate sharing a member with an accepted composite"
                );
                continue;
            }

            let group_id = candidate.ensure_group_id(&mut self.rng);
            let mut member_ids = HashSet::with_capacity(candidate.members().len());
            for kq in candidate.members_mut() {
                kq.stabilize(group_id);
                member_ids.insert(kq.id());
            }
            self.pool.retain(|kq| !member_ids.contains(&kq.id()));
            claimed.extend(member_ids);

            if !group_ids.contains(&group_id) {
                group_ids.push(group_id);
            }
            self.worldtubes.push(candidate.clone());
            accepted.push(candidate);
        }

        tracing::debug!(
            count = accepted.len(),
            rejected_overlaps,
            t = self.current_time,
            "stability check"
        );
        self.record(SimEvent::CcpStable {
            count: accepted.len(),
            group_ids,
            rejected_overlaps,
        });
        accepted
    }
}
