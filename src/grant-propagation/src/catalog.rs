// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Catalog abstraction for grant planning.
//!
//! The metadata service that tracks which relations are distributed lives
//! outside of this crate. Planning only needs the narrow, read-only view of
//! it described by [`DistributedCatalog`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{Ident, UnresolvedItemName};
use crate::display::{impl_display, AstDisplay, AstFormatter};

/// The identifier of a relation (table, sequence, ...) in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationId(pub u32);

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identifier of a schema in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(pub u32);

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully-qualified human readable name of a relation.
///
/// Its rendering is valid SQL on every node regardless of the session's
/// search path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FullItemName {
    pub schema: Ident,
    pub item: Ident,
}

impl AstDisplay for FullItemName {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        f.write_node(&self.schema);
        f.write_str(".");
        f.write_node(&self.item);
    }
}
impl_display!(FullItemName);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Unknown relation.
    #[error("relation \"{0}\" does not exist")]
    UnknownItem(String),
    /// Unknown schema.
    #[error("schema \"{0}\" does not exist")]
    UnknownSchema(String),
}

/// A read-only view of the catalog and of the distributed-object metadata.
///
/// Implementations are expected to answer from an in-memory cache; the
/// planner calls these methods many times per statement.
pub trait DistributedCatalog: fmt::Debug {
    /// Resolves a possibly-qualified relation name using the session's
    /// search path.
    fn resolve_item(&self, name: &UnresolvedItemName) -> Result<RelationId, CatalogError>;

    /// Resolves a schema name.
    fn resolve_schema(&self, name: &Ident) -> Result<SchemaId, CatalogError>;

    /// Reports whether `id` is a table whose data is tracked as distributed
    /// across the worker nodes.
    fn is_distributed_table(&self, id: RelationId) -> bool;

    /// Reports whether `id` is known to the distributed-object metadata in
    /// any form, e.g. a sequence that was propagated to the workers.
    fn is_distributed_object(&self, id: RelationId) -> bool;

    /// Returns every distributed table, in a stable order.
    fn distributed_table_ids(&self) -> Vec<RelationId>;

    /// Returns the schema containing `id`.
    ///
    /// Panics if `id` does not exist.
    fn schema_of(&self, id: RelationId) -> SchemaId;

    /// Returns the fully qualified name of `id`.
    ///
    /// Panics if `id` does not exist.
    fn full_name(&self, id: RelationId) -> FullItemName;
}
