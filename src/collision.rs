// src/collision.rs
//! Import collision planning: no I/O, no database
//!
//! Splits decoded candidates into inserts, updates and rejects given the ids
//! already present in the store. The store layer applies the result.

use std::collections::HashSet;

use crate::enums::{CollisionStrategy, RejectReason};
use crate::record::ConnectionRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub record: ConnectionRecord,
    pub reason: RejectReason,
}

/// Which bucket a candidate landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Insert,
    Update,
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    pub insert: Vec<ConnectionRecord>,
    pub update: Vec<ConnectionRecord>,
    pub reject: Vec<Rejected>,
    /// One entry per candidate, in input order
    pub order: Vec<Placement>,
}

impl ImportPlan {
    /// Records that will be written
    pub fn write_count(&self) -> usize {
        self.insert.len() + self.update.len()
    }

    pub fn has_collisions(&self) -> bool {
        !self.update.is_empty() || self.reject.iter().any(|r| r.reason == RejectReason::Collision)
    }
}

/// Partition `candidates` by `strategy`.
///
/// A candidate collides when its id is in `existing` or appeared earlier in
/// `candidates`. Order within each bucket follows the input order.
pub fn plan_import(
    existing: &HashSet<String>,
    candidates: Vec<ConnectionRecord>,
    strategy: CollisionStrategy,
) -> ImportPlan {
    let mut seen = HashSet::new();
    let tagged: Vec<(bool, ConnectionRecord)> = candidates
        .into_iter()
        .map(|record| {
            let first_in_batch = seen.insert(record.conn_id.clone());
            let collides = existing.contains(&record.conn_id) || !first_in_batch;
            (collides, record)
        })
        .collect();

    let mut plan = ImportPlan::default();
    let any_collision = tagged.iter().any(|(collides, _)| *collides);

    for (collides, record) in tagged {
        match (strategy, collides) {
            (CollisionStrategy::Stop, _) if any_collision => {
                plan.reject.push(Rejected {
                    record,
                    reason: if collides {
                        RejectReason::Collision
                    } else {
                        RejectReason::Stopped
                    },
                });
                plan.order.push(Placement::Reject);
            }
            (CollisionStrategy::Skip, true) => {
                plan.reject.push(Rejected {
                    record,
                    reason: RejectReason::Collision,
                });
                plan.order.push(Placement::Reject);
            }
            (CollisionStrategy::Overwrite, true) => {
                plan.update.push(record);
                plan.order.push(Placement::Update);
            }
            _ => {
                plan.insert.push(record);
                plan.order.push(Placement::Insert);
            }
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(records: &[ConnectionRecord]) -> Vec<&str> {
        records.iter().map(|r| r.conn_id.as_str()).collect()
    }

    fn existing() -> HashSet<String> {
        ["b".to_string()].into_iter().collect()
    }

    fn candidates() -> Vec<ConnectionRecord> {
        ["a", "b", "c"].into_iter().map(ConnectionRecord::new).collect()
    }

    #[test]
    fn stop_rejects_everything_on_any_collision() {
        let plan = plan_import(&existing(), candidates(), CollisionStrategy::Stop);
        assert!(plan.insert.is_empty());
        assert!(plan.update.is_empty());
        let reasons: Vec<_> = plan.reject.iter().map(|r| r.reason).collect();
        assert_eq!(
            reasons,
            vec![
                RejectReason::Stopped,
                RejectReason::Collision,
                RejectReason::Stopped
            ]
        );
        assert!(plan.has_collisions());
    }

    #[test]
    fn stop_without_collisions_inserts_all() {
        let plan = plan_import(&HashSet::new(), candidates(), CollisionStrategy::Stop);
        assert_eq!(ids(&plan.insert), vec!["a", "b", "c"]);
        assert_eq!(plan.write_count(), 3);
        assert!(!plan.has_collisions());
    }

    #[test]
    fn skip_rejects_only_colliding() {
        let plan = plan_import(&existing(), candidates(), CollisionStrategy::Skip);
        assert_eq!(ids(&plan.insert), vec!["a", "c"]);
        assert_eq!(plan.reject.len(), 1);
        assert_eq!(plan.reject[0].record.conn_id, "b");
    }

    #[test]
    fn overwrite_updates_colliding() {
        let plan = plan_import(&existing(), candidates(), CollisionStrategy::Overwrite);
        assert_eq!(ids(&plan.insert), vec!["a", "c"]);
        assert_eq!(ids(&plan.update), vec!["b"]);
        assert!(plan.reject.is_empty());
    }

    #[test]
    fn order_follows_input() {
        let plan = plan_import(&existing(), candidates(), CollisionStrategy::Skip);
        assert_eq!(
            plan.order,
            vec![Placement::Insert, Placement::Reject, Placement::Insert]
        );
    }

    #[test]
    fn duplicate_ids_in_one_batch_collide_with_each_other() {
        let batch = vec![ConnectionRecord::new("x"), ConnectionRecord::new("x")];
        let plan = plan_import(&HashSet::new(), batch, CollisionStrategy::Skip);
        assert_eq!(ids(&plan.insert), vec!["x"]);
        assert_eq!(plan.reject.len(), 1);
    }
}
