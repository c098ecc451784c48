// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Propagation of `GRANT` and `REVOKE` to the nodes of a cluster.
//!
//! When a statement changes privileges on distributed tables, every worker
//! node that holds shards of those tables or a copy of the metadata must
//! apply the same change. This crate plans that work on the coordinator:
//!
//! 1. [`resolve`] determines the distributed relations the statement names,
//!    expanding `ALL TABLES IN SCHEMA`.
//! 2. [`filter`] drops duplicates, short-circuits statements that involve no
//!    distributed relation and requires the coordinator role otherwise.
//! 3. [`deparse`] renders a canonical, fully qualified command per relation.
//! 4. [`job`] packages each command into a [`PropagationJob`], with per-shard
//!    tasks for distributed tables.
//!
//! Planning is read-only. Executing the jobs, including transactions across
//! the workers, is the caller's responsibility.

use tracing::debug;

pub mod ast;
pub mod catalog;
pub mod config;
pub mod deparse;
pub mod display;
pub mod error;
pub mod filter;
pub mod job;
mod keywords;
pub mod resolve;
pub mod testing;

pub use crate::ast::GrantStatement;
pub use crate::error::PlanError;
pub use crate::job::PropagationJob;

use crate::catalog::DistributedCatalog;
use crate::config::{Config, ConfigSet};
use crate::deparse::GrantCommand;
use crate::filter::{EligibleTargets, NodeRole};
use crate::job::TaskPlanner;

pub const ENABLE_DDL_PROPAGATION: Config<bool> = Config::new(
    "enable_ddl_propagation",
    true,
    "Whether GRANT and REVOKE on distributed tables are propagated to the worker nodes.",
);

/// Adds the full set of configs used by this crate to the given set.
pub fn all_configs(configs: ConfigSet) -> ConfigSet {
    configs.add(&ENABLE_DDL_PROPAGATION)
}

/// The collaborators needed to plan a statement.
#[derive(Debug)]
pub struct GrantContext<'a, P> {
    pub catalog: &'a dyn DistributedCatalog,
    pub node: &'a dyn NodeRole,
    pub task_planner: &'a P,
    /// Must contain every config registered by [`all_configs`]; planning
    /// panics on a set that is missing one.
    pub configs: &'a ConfigSet,
}

/// Plans the propagation of a `GRANT`/`REVOKE` statement.
///
/// Returns an empty list when nothing needs to be propagated: the statement
/// is not a table level grant, it names no distributed relation, or
/// propagation is disabled. Otherwise returns one job per distributed
/// relation, in the order the statement names them.
pub fn plan_grant_propagation<P: TaskPlanner>(
    gcx: &GrantContext<'_, P>,
    stmt: &GrantStatement,
) -> Result<Vec<PropagationJob<P::Task>>, PlanError> {
    if !ENABLE_DDL_PROPAGATION.get(gcx.configs) {
        debug!("ddl propagation disabled, not propagating grant");
        return Ok(vec![]);
    }

    let targets = EligibleTargets::filter(resolve::resolve_targets(gcx.catalog, stmt)?);
    if !targets.is_eligible() {
        debug!("grant does not involve distributed relations");
        return Ok(vec![]);
    }

    filter::ensure_coordinator(gcx.node)?;

    let command = GrantCommand::new(stmt)?;
    let jobs = job::build_jobs(gcx.catalog, gcx.task_planner, &command, &targets);
    debug!(job_count = jobs.len(), is_grant = stmt.is_grant, "planned grant propagation");
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::atomic::Ordering::SeqCst;

    use proptest::prelude::*;

    use super::*;
    use crate::ast::{
        AccessPrivilege, DropBehavior, GrantTarget, Ident, ObjectType, RoleSpec,
        UnresolvedItemName,
    };
    use crate::catalog::CatalogError;
    use crate::config::ConfigVal;
    use crate::testing::{ShardTask, ShardTaskPlanner, TestCatalog, TestNode};

    struct Harness {
        catalog: TestCatalog,
        node: TestNode,
        configs: ConfigSet,
    }

    impl Harness {
        fn new() -> Harness {
            Harness {
                catalog: TestCatalog::fixture(),
                node: TestNode { coordinator: true },
                configs: all_configs(ConfigSet::default()),
            }
        }

        fn plan(&self, stmt: &GrantStatement) -> Result<Vec<PropagationJob<ShardTask>>, PlanError> {
            let task_planner = ShardTaskPlanner {
                catalog: &self.catalog,
            };
            let gcx = GrantContext {
                catalog: &self.catalog,
                node: &self.node,
                task_planner: &task_planner,
                configs: &self.configs,
            };
            plan_grant_propagation(&gcx, stmt)
        }
    }

    fn grant(target: GrantTarget, privileges: Vec<AccessPrivilege>) -> GrantStatement {
        GrantStatement {
            object_type: ObjectType::Table,
            target,
            is_grant: true,
            grant_option: false,
            behavior: DropBehavior::Restrict,
            privileges,
            grantees: vec![RoleSpec::named("alice")],
        }
    }

    fn on(names: &[&str]) -> GrantTarget {
        GrantTarget::Objects(names.iter().map(|name| parse_name(name)).collect())
    }

    fn parse_name(name: &str) -> UnresolvedItemName {
        match name.split_once('.') {
            Some((schema, item)) => UnresolvedItemName::qualified(schema, item),
            None => UnresolvedItemName::unqualified(name),
        }
    }

    fn commands(jobs: &[PropagationJob<ShardTask>]) -> Vec<&str> {
        jobs.iter().map(|job| job.command.as_str()).collect()
    }

    #[test]
    fn grant_with_grant_option() {
        let h = Harness::new();
        let mut stmt = grant(on(&["orders"]), vec![AccessPrivilege::named("SELECT")]);
        stmt.grant_option = true;
        let jobs = h.plan(&stmt).unwrap();
        assert_eq!(
            commands(&jobs),
            vec!["GRANT SELECT ON public.orders TO alice WITH GRANT OPTION"]
        );
        assert_eq!(jobs[0].target, h.catalog.id("public", "orders"));
        assert_eq!(jobs[0].tasks.len(), 2);
        assert!(jobs[0].tasks.iter().all(|t| t.command == jobs[0].command));
    }

    #[test]
    fn revoke_cascade() {
        let h = Harness::new();
        let mut stmt = grant(on(&["public.orders"]), vec![]);
        stmt.is_grant = false;
        stmt.behavior = DropBehavior::Cascade;
        stmt.grantees = vec![RoleSpec::named("bob")];
        let jobs = h.plan(&stmt).unwrap();
        assert_eq!(
            commands(&jobs),
            vec!["REVOKE ALL ON public.orders FROM bob CASCADE"]
        );
    }

    #[test]
    fn sequences_get_no_tasks() {
        let h = Harness::new();
        let stmt = grant(
            on(&["orders_id_seq", "local_events", "orders"]),
            vec![AccessPrivilege::named("USAGE")],
        );
        let jobs = h.plan(&stmt).unwrap();
        assert_eq!(
            commands(&jobs),
            vec![
                "GRANT USAGE ON public.orders_id_seq TO alice",
                "GRANT USAGE ON public.orders TO alice",
            ]
        );
        assert!(jobs[0].tasks.is_empty());
        assert_eq!(jobs[1].tasks.len(), 2);
    }

    #[test]
    fn all_tables_in_schema() {
        let h = Harness::new();
        let stmt = grant(
            GrantTarget::AllInSchema(vec![Ident::new("sales")]),
            vec![AccessPrivilege::named("SELECT")],
        );
        let jobs = h.plan(&stmt).unwrap();
        assert_eq!(
            commands(&jobs),
            vec![
                "GRANT SELECT ON sales.items TO alice",
                "GRANT SELECT ON sales.\"Line Items\" TO alice",
            ]
        );
        assert_eq!(jobs[0].tasks.len(), 4);
        assert_eq!(jobs[1].tasks.len(), 1);
    }

    #[test]
    fn nothing_distributed() {
        let h = Harness::new();
        let stmt = grant(on(&["local_events", "sales.archive"]), vec![]);
        assert_eq!(h.plan(&stmt), Ok(vec![]));
    }

    #[test]
    fn unknown_relation_aborts() {
        let h = Harness::new();
        let stmt = grant(on(&["orders", "sales.missing"]), vec![]);
        assert_eq!(
            h.plan(&stmt),
            Err(PlanError::Catalog(CatalogError::UnknownItem(
                "sales.missing".into()
            )))
        );
    }

    #[test]
    fn coordinator_required_only_for_distributed_relations() {
        let mut h = Harness::new();
        h.node = TestNode { coordinator: false };
        assert_eq!(h.plan(&grant(on(&["local_events"]), vec![])), Ok(vec![]));
        assert_eq!(
            h.plan(&grant(on(&["orders"]), vec![])),
            Err(PlanError::NotCoordinator)
        );
    }

    #[test]
    fn malformed_privileges() {
        let h = Harness::new();
        let privileges = vec![AccessPrivilege::named("SELECT"), AccessPrivilege::all()];
        assert_eq!(
            h.plan(&grant(on(&["orders"]), privileges.clone())),
            Err(PlanError::MalformedPrivilegeList)
        );
        // Statements that need no propagation are never rendered.
        assert_eq!(h.plan(&grant(on(&["local_events"]), privileges)), Ok(vec![]));
    }

    #[test]
    fn duplicate_targets() {
        let h = Harness::new();
        let stmt = grant(on(&["orders", "public.orders"]), vec![]);
        assert_eq!(
            commands(&h.plan(&stmt).unwrap()),
            vec!["GRANT ALL ON public.orders TO alice"]
        );
    }

    #[test]
    fn propagation_disabled() {
        let h = Harness::new();
        ENABLE_DDL_PROPAGATION.set(&h.configs, false);
        // Not even resolved.
        assert_eq!(h.plan(&grant(on(&["missing"]), vec![])), Ok(vec![]));
        ENABLE_DDL_PROPAGATION.set(&h.configs, true);
        assert!(h.plan(&grant(on(&["missing"]), vec![])).is_err());
    }

    #[test]
    fn registered_configs() {
        let configs = all_configs(ConfigSet::default());
        let entries: Vec<_> = configs.entries().collect();
        assert_eq!(entries.len(), 1);
        let entry = entries[0];
        assert_eq!(entry.name(), "enable_ddl_propagation");
        assert_eq!(entry.name(), ENABLE_DDL_PROPAGATION.name());
        assert_eq!(entry.desc(), ENABLE_DDL_PROPAGATION.desc());
        assert_eq!(ENABLE_DDL_PROPAGATION.default(), &true);

        // Updates change the value but never the default.
        ENABLE_DDL_PROPAGATION.set(&configs, false);
        let ConfigVal::Bool(default) = entry.default();
        let ConfigVal::Bool(val) = entry.val();
        assert!(default.load(SeqCst));
        assert!(!val.load(SeqCst));
    }

    #[test]
    #[should_panic(expected = "config should be registered to set")]
    fn unregistered_configs() {
        let catalog = TestCatalog::fixture();
        let configs = ConfigSet::default();
        let gcx = GrantContext {
            catalog: &catalog,
            node: &TestNode { coordinator: true },
            task_planner: &ShardTaskPlanner { catalog: &catalog },
            configs: &configs,
        };
        let _ = plan_grant_propagation(&gcx, &grant(on(&["orders"]), vec![]));
    }

    fn arb_statement() -> impl Strategy<Value = GrantStatement> {
        let names = prop::sample::select(vec![
            "orders",
            "public.orders",
            "orders_id_seq",
            "local_events",
            "sales.items",
            "sales.Line Items",
            "sales.archive",
        ]);
        let target = prop_oneof![
            prop::collection::vec(names, 0..4)
                .prop_map(|names| GrantTarget::Objects(names.into_iter().map(parse_name).collect())),
            prop::collection::vec(prop::sample::select(vec!["public", "sales"]), 0..3)
                .prop_map(|schemas| GrantTarget::AllInSchema(
                    schemas.into_iter().map(Ident::from).collect()
                )),
        ];
        let privilege = prop::sample::select(vec!["SELECT", "INSERT", "UPDATE", "DELETE", "USAGE"])
            .prop_map(AccessPrivilege::named);
        let grantee = prop::sample::select(vec!["alice", "Bob", "public"]).prop_map(|name| {
            if name == "public" {
                RoleSpec::Public
            } else {
                RoleSpec::named(name)
            }
        });
        (
            any::<ObjectType>(),
            target,
            any::<bool>(),
            any::<bool>(),
            any::<DropBehavior>(),
            prop::collection::vec(privilege, 0..3),
            prop::collection::vec(grantee, 1..3),
        )
            .prop_map(
                |(object_type, target, is_grant, grant_option, behavior, privileges, grantees)| {
                    GrantStatement {
                        object_type,
                        target,
                        is_grant,
                        grant_option,
                        behavior,
                        privileges,
                        grantees,
                    }
                },
            )
    }

    #[test]
    fn planning_is_idempotent() {
        let h = Harness::new();
        // The proptest! macro interferes with rustfmt.
        proptest!(|(stmt in arb_statement())| {
            let first = h.plan(&stmt).unwrap();
            let second = h.plan(&stmt).unwrap();
            prop_assert_eq!(&first, &second);

            let targets: BTreeSet<_> = first.iter().map(|job| job.target).collect();
            prop_assert_eq!(targets.len(), first.len());
            prop_assert!(first.iter().all(|job| !job.command.is_empty()));
            if stmt.object_type != ObjectType::Table {
                prop_assert!(first.is_empty());
            }
        });
    }
}
