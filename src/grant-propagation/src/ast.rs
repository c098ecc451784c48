// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The parsed form of a `GRANT`/`REVOKE` statement.
//!
//! These types are produced by the SQL parser and are never mutated while
//! planning. They only know how to render themselves; name resolution
//! happens in [`crate::resolve`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::display::{self, impl_display, AstDisplay, AstFormatter};
use crate::keywords;

/// An identifier, already case folded by the parser.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ident(String);

impl Ident {
    pub fn new<S: Into<String>>(s: S) -> Ident {
        Ident(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reports whether this identifier can be printed without quotes and
    /// still parse back to the same identifier.
    pub fn can_be_printed_bare(&self) -> bool {
        let mut chars = self.0.chars();
        let first_ok = chars
            .next()
            .map_or(false, |c| c.is_ascii_lowercase() || c == '_');
        first_ok
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            && !keywords::is_reserved(&self.0)
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Ident {
        Ident::new(s)
    }
}

impl AstDisplay for Ident {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        if self.can_be_printed_bare() {
            f.write_str(&self.0);
        } else {
            f.write_str("\"");
            f.write_str(self.0.replace('"', "\"\""));
            f.write_str("\"");
        }
    }
}
impl_display!(Ident);

/// A possibly schema-qualified name that has not yet been resolved against
/// the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnresolvedItemName(pub Vec<Ident>);

impl UnresolvedItemName {
    pub fn unqualified(item: &str) -> UnresolvedItemName {
        UnresolvedItemName(vec![Ident::new(item)])
    }

    pub fn qualified(schema: &str, item: &str) -> UnresolvedItemName {
        UnresolvedItemName(vec![Ident::new(schema), Ident::new(item)])
    }
}

impl AstDisplay for UnresolvedItemName {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        f.write_node(&display::separated(&self.0, "."));
    }
}
impl_display!(UnresolvedItemName);

/// The kind of object named in `GRANT ... ON <kind>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Table,
    Sequence,
    Database,
    Domain,
    ForeignDataWrapper,
    ForeignServer,
    Function,
    Procedure,
    Routine,
    Language,
    LargeObject,
    Schema,
    Tablespace,
    Type,
}

/// The objects a statement applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantTarget {
    /// `ON [TABLE] a, b.c`
    Objects(Vec<UnresolvedItemName>),
    /// `ON ALL TABLES IN SCHEMA a, b`
    AllInSchema(Vec<Ident>),
}

/// The `CASCADE`/`RESTRICT` clause of a `REVOKE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
#[serde(rename_all = "snake_case")]
pub enum DropBehavior {
    #[default]
    Restrict,
    Cascade,
}

impl AstDisplay for DropBehavior {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        match self {
            DropBehavior::Restrict => f.write_str("RESTRICT"),
            DropBehavior::Cascade => f.write_str("CASCADE"),
        }
    }
}
impl_display!(DropBehavior);

/// One entry of the privilege list.
///
/// A missing `name` is how the parser encodes `ALL [PRIVILEGES]` when it is
/// followed by a column list. The parser only produces it as the first entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessPrivilege {
    pub name: Option<String>,
    #[serde(default)]
    pub columns: Vec<Ident>,
}

impl AccessPrivilege {
    pub fn named(name: &str) -> AccessPrivilege {
        AccessPrivilege {
            name: Some(name.to_owned()),
            columns: vec![],
        }
    }

    pub fn all() -> AccessPrivilege {
        AccessPrivilege {
            name: None,
            columns: vec![],
        }
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> AccessPrivilege
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Ident::new).collect();
        self
    }
}

impl AstDisplay for AccessPrivilege {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        match &self.name {
            Some(name) => f.write_str(name),
            None => f.write_str("ALL"),
        }
        if !self.columns.is_empty() {
            f.write_str("(");
            f.write_node(&display::comma_separated(&self.columns));
            f.write_str(")");
        }
    }
}
impl_display!(AccessPrivilege);

/// A role appearing in the grantee list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSpec {
    Name(Ident),
    Public,
    CurrentUser,
    SessionUser,
    CurrentRole,
}

impl RoleSpec {
    pub fn named(name: &str) -> RoleSpec {
        RoleSpec::Name(Ident::new(name))
    }
}

impl AstDisplay for RoleSpec {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        match self {
            RoleSpec::Name(name) => f.write_node(name),
            RoleSpec::Public => f.write_str("PUBLIC"),
            RoleSpec::CurrentUser => f.write_str("CURRENT_USER"),
            RoleSpec::SessionUser => f.write_str("SESSION_USER"),
            RoleSpec::CurrentRole => f.write_str("CURRENT_ROLE"),
        }
    }
}
impl_display!(RoleSpec);

/// `GRANT`/`REVOKE` of privileges on objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantStatement {
    pub object_type: ObjectType,
    pub target: GrantTarget,
    /// `true` for `GRANT`, `false` for `REVOKE`.
    pub is_grant: bool,
    /// `WITH GRANT OPTION` on a grant, `GRANT OPTION FOR` on a revoke.
    #[serde(default)]
    pub grant_option: bool,
    /// Only meaningful when `is_grant` is false.
    #[serde(default)]
    pub behavior: DropBehavior,
    /// An empty list means `ALL PRIVILEGES`.
    #[serde(default)]
    pub privileges: Vec<AccessPrivilege>,
    pub grantees: Vec<RoleSpec>,
}
