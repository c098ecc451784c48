// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Decides whether a resolved statement needs propagation at all.

use std::fmt;

use itertools::Itertools;

use crate::error::PlanError;
use crate::resolve::ResolvedTarget;

/// Reports the role of the node that is planning the statement.
pub trait NodeRole: fmt::Debug {
    /// Reports whether this node is the coordinator, the only node allowed
    /// to dispatch distributed DDL.
    fn is_coordinator(&self) -> bool;
}

/// Fails unless `node` is the coordinator.
pub fn ensure_coordinator(node: &dyn NodeRole) -> Result<(), PlanError> {
    if node.is_coordinator() {
        Ok(())
    } else {
        Err(PlanError::NotCoordinator)
    }
}

/// The targets of a statement that must be propagated, each appearing once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibleTargets(Vec<ResolvedTarget>);

impl EligibleTargets {
    /// Keeps the first occurrence of every relation in `resolved`.
    ///
    /// `GRANT ... ON t, t` is legal, but the command must only be
    /// propagated once per relation.
    pub fn filter(resolved: Vec<ResolvedTarget>) -> EligibleTargets {
        EligibleTargets(resolved.into_iter().unique_by(|target| target.id).collect())
    }

    /// Reports whether any distributed object is involved.
    pub fn is_eligible(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedTarget> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RelationId;
    use crate::resolve::Tracking;
    use crate::testing::TestNode;

    fn target(id: u32, tracking: Tracking) -> ResolvedTarget {
        ResolvedTarget {
            id: RelationId(id),
            tracking,
        }
    }

    #[test]
    fn duplicates_are_dropped() {
        let targets = EligibleTargets::filter(vec![
            target(2, Tracking::DistributedTable),
            target(1, Tracking::DistributedObject),
            target(2, Tracking::DistributedTable),
        ]);
        assert!(targets.is_eligible());
        assert_eq!(targets.len(), 2);
        assert_eq!(
            targets.iter().copied().collect::<Vec<_>>(),
            vec![
                target(2, Tracking::DistributedTable),
                target(1, Tracking::DistributedObject),
            ]
        );
    }

    #[test]
    fn empty_is_not_eligible() {
        assert!(!EligibleTargets::filter(vec![]).is_eligible());
    }

    #[test]
    fn coordinator_check() {
        assert_eq!(ensure_coordinator(&TestNode { coordinator: true }), Ok(()));
        assert_eq!(
            ensure_coordinator(&TestNode { coordinator: false }),
            Err(PlanError::NotCoordinator)
        );
    }
}
