// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! In-memory collaborators for tests.
//!
//! Shared by the unit tests and the file-driven tests under `tests/`.

use std::collections::BTreeMap;

use crate::ast::{Ident, UnresolvedItemName};
use crate::catalog::{CatalogError, DistributedCatalog, FullItemName, RelationId, SchemaId};
use crate::filter::NodeRole;
use crate::job::TaskPlanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    DistributedTable,
    DistributedSequence,
    LocalTable,
}

#[derive(Debug, Clone)]
struct Relation {
    schema: SchemaId,
    name: FullItemName,
    kind: RelationKind,
    shards: Vec<u64>,
}

/// A catalog with a single-schema search path.
#[derive(Debug, Clone)]
pub struct TestCatalog {
    schemas: BTreeMap<String, SchemaId>,
    relations: BTreeMap<RelationId, Relation>,
    search_path: String,
}

impl TestCatalog {
    pub fn new(search_path: &str) -> TestCatalog {
        TestCatalog {
            schemas: BTreeMap::new(),
            relations: BTreeMap::new(),
            search_path: search_path.to_owned(),
        }
    }

    /// ```text
    /// public (2200)
    ///   orders         16384  distributed table, shards 102008-102009
    ///   orders_id_seq  16385  distributed sequence
    ///   local_events   16386  local table
    /// sales (16400)
    ///   items          16401  distributed table, shards 102010-102013
    ///   Line Items     16402  distributed table, shard 102014
    ///   archive        16403  local table
    /// ```
    pub fn fixture() -> TestCatalog {
        TestCatalog::new("public")
            .with_schema("public", 2200)
            .with_schema("sales", 16400)
            .with_relation(
                16384,
                "public",
                "orders",
                RelationKind::DistributedTable,
                vec![102008, 102009],
            )
            .with_relation(
                16385,
                "public",
                "orders_id_seq",
                RelationKind::DistributedSequence,
                vec![],
            )
            .with_relation(16386, "public", "local_events", RelationKind::LocalTable, vec![])
            .with_relation(
                16401,
                "sales",
                "items",
                RelationKind::DistributedTable,
                vec![102010, 102011, 102012, 102013],
            )
            .with_relation(
                16402,
                "sales",
                "Line Items",
                RelationKind::DistributedTable,
                vec![102014],
            )
            .with_relation(16403, "sales", "archive", RelationKind::LocalTable, vec![])
    }

    pub fn with_schema(mut self, name: &str, id: u32) -> TestCatalog {
        self.schemas.insert(name.to_owned(), SchemaId(id));
        self
    }

    pub fn with_relation(
        mut self,
        id: u32,
        schema: &str,
        item: &str,
        kind: RelationKind,
        shards: Vec<u64>,
    ) -> TestCatalog {
        let relation = Relation {
            schema: self.schemas[schema],
            name: FullItemName {
                schema: Ident::new(schema),
                item: Ident::new(item),
            },
            kind,
            shards,
        };
        self.relations.insert(RelationId(id), relation);
        self
    }

    pub fn id(&self, schema: &str, item: &str) -> RelationId {
        self.lookup(schema, item)
            .unwrap_or_else(|| panic!("no relation {schema}.{item}"))
    }

    pub fn shards(&self, id: RelationId) -> &[u64] {
        &self.relations[&id].shards
    }

    fn lookup(&self, schema: &str, item: &str) -> Option<RelationId> {
        self.relations
            .iter()
            .find(|(_, r)| r.name.schema.as_str() == schema && r.name.item.as_str() == item)
            .map(|(id, _)| *id)
    }
}

impl DistributedCatalog for TestCatalog {
    fn resolve_item(&self, name: &UnresolvedItemName) -> Result<RelationId, CatalogError> {
        let found = match name.0.as_slice() {
            [item] => self.lookup(&self.search_path, item.as_str()),
            [schema, item] => self.lookup(schema.as_str(), item.as_str()),
            _ => None,
        };
        found.ok_or_else(|| CatalogError::UnknownItem(name.to_string()))
    }

    fn resolve_schema(&self, name: &Ident) -> Result<SchemaId, CatalogError> {
        self.schemas
            .get(name.as_str())
            .copied()
            .ok_or_else(|| CatalogError::UnknownSchema(name.to_string()))
    }

    fn is_distributed_table(&self, id: RelationId) -> bool {
        self.relations[&id].kind == RelationKind::DistributedTable
    }

    fn is_distributed_object(&self, id: RelationId) -> bool {
        self.relations[&id].kind != RelationKind::LocalTable
    }

    fn distributed_table_ids(&self) -> Vec<RelationId> {
        self.relations
            .iter()
            .filter(|(_, r)| r.kind == RelationKind::DistributedTable)
            .map(|(id, _)| *id)
            .collect()
    }

    fn schema_of(&self, id: RelationId) -> SchemaId {
        self.relations[&id].schema
    }

    fn full_name(&self, id: RelationId) -> FullItemName {
        self.relations[&id].name.clone()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TestNode {
    pub coordinator: bool,
}

impl NodeRole for TestNode {
    fn is_coordinator(&self) -> bool {
        self.coordinator
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardTask {
    pub shard_id: u64,
    pub command: String,
}

/// Plans one task per shard of the catalog's distributed tables.
#[derive(Debug)]
pub struct ShardTaskPlanner<'a> {
    pub catalog: &'a TestCatalog,
}

impl TaskPlanner for ShardTaskPlanner<'_> {
    type Task = ShardTask;

    fn plan_tasks(&self, id: RelationId, command: &str) -> Vec<ShardTask> {
        self.catalog
            .shards(id)
            .iter()
            .map(|shard_id| ShardTask {
                shard_id: *shard_id,
                command: command.to_owned(),
            })
            .collect()
    }
}
