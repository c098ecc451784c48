// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Propagation jobs handed to the distributed DDL executor.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{DistributedCatalog, RelationId};
use crate::deparse::GrantCommand;
use crate::filter::EligibleTargets;

/// Plans the per-shard work for a command on a distributed table.
///
/// The tasks are opaque to planning; the executor that produced the planner
/// knows how to run them.
pub trait TaskPlanner: fmt::Debug {
    type Task;

    /// Returns the tasks that apply `command` to every shard of `id`.
    fn plan_tasks(&self, id: RelationId, command: &str) -> Vec<Self::Task>;
}

/// The work needed to apply one `GRANT`/`REVOKE` to one relation across the
/// cluster.
///
/// `command` is sent to every node that holds a copy of the metadata.
/// `tasks` are executed against the shards and must run as a single atomic
/// unit; they are empty for objects that have no shards, such as
/// sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationJob<T> {
    pub target: RelationId,
    pub command: String,
    pub tasks: Vec<T>,
}

/// Builds one job per target, in target order.
pub fn build_jobs<P: TaskPlanner>(
    catalog: &dyn DistributedCatalog,
    task_planner: &P,
    command: &GrantCommand,
    targets: &EligibleTargets,
) -> Vec<PropagationJob<P::Task>> {
    targets
        .iter()
        .map(|target| {
            let command = command.render(&catalog.full_name(target.id));
            let tasks = if target.is_distributed_table() {
                task_planner.plan_tasks(target.id, &command)
            } else {
                vec![]
            };
            debug!(
                relation = %target.id,
                tasks = tasks.len(),
                %command,
                "built propagation job"
            );
            PropagationJob {
                target: target.id,
                command,
                tasks,
            }
        })
        .collect()
}
