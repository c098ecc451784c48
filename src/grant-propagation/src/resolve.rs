// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Resolution of the objects a grant statement applies to.
//!
//! Both `ON a, b` and `ON ALL TABLES IN SCHEMA s` funnel into the same
//! [`ResolvedTarget`] list. Non-distributed relations are dropped here, so
//! everything downstream only ever sees objects that must be propagated.

use std::collections::BTreeSet;

use tracing::debug;

use crate::ast::{GrantStatement, GrantTarget, Ident, ObjectType, UnresolvedItemName};
use crate::catalog::{DistributedCatalog, RelationId, SchemaId};
use crate::error::PlanError;

/// How completely the distributed-object metadata tracks a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tracking {
    /// A distributed table. Its shards on the workers need the command too.
    DistributedTable,
    /// Distributed in the administrative sense only, like a sequence that
    /// exists on the workers. Only the metadata copies need the command.
    DistributedObject,
}

/// A relation that a grant statement applies to and that has to be
/// propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedTarget {
    pub id: RelationId,
    pub tracking: Tracking,
}

impl ResolvedTarget {
    pub fn is_distributed_table(&self) -> bool {
        self.tracking == Tracking::DistributedTable
    }
}

/// Determines the distributed relations that `stmt` applies to.
///
/// Only table level grants are supported; any other object type resolves to
/// nothing. Fails if the statement names a relation or schema that does not
/// exist, even if other names in the statement resolve.
pub fn resolve_targets(
    catalog: &dyn DistributedCatalog,
    stmt: &GrantStatement,
) -> Result<Vec<ResolvedTarget>, PlanError> {
    if stmt.object_type != ObjectType::Table {
        debug!(object_type = ?stmt.object_type, "grant on unsupported object type");
        return Ok(vec![]);
    }
    match &stmt.target {
        GrantTarget::Objects(names) => resolve_objects(catalog, names),
        GrantTarget::AllInSchema(schemas) => resolve_all_in_schemas(catalog, schemas),
    }
}

fn resolve_objects(
    catalog: &dyn DistributedCatalog,
    names: &[UnresolvedItemName],
) -> Result<Vec<ResolvedTarget>, PlanError> {
    let mut targets = Vec::new();
    for name in names {
        let id = catalog.resolve_item(name)?;
        let tracking = if catalog.is_distributed_table(id) {
            Tracking::DistributedTable
        } else if catalog.is_distributed_object(id) {
            // GRANT ... ON TABLE also accepts sequences.
            Tracking::DistributedObject
        } else {
            debug!(%name, %id, "skipping relation that is not distributed");
            continue;
        };
        targets.push(ResolvedTarget { id, tracking });
    }
    Ok(targets)
}

fn resolve_all_in_schemas(
    catalog: &dyn DistributedCatalog,
    schemas: &[Ident],
) -> Result<Vec<ResolvedTarget>, PlanError> {
    let schema_ids = schemas
        .iter()
        .map(|schema| catalog.resolve_schema(schema))
        .collect::<Result<BTreeSet<SchemaId>, _>>()?;
    Ok(catalog
        .distributed_table_ids()
        .into_iter()
        .filter(|id| schema_ids.contains(&catalog.schema_of(*id)))
        .map(|id| ResolvedTarget {
            id,
            tracking: Tracking::DistributedTable,
        })
        .collect())
}
