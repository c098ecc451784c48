// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Canonical rendering of `GRANT`/`REVOKE` commands.
//!
//! The text the user typed cannot be forwarded to other nodes: names in it
//! are resolved against the local search path. Instead the command is
//! rendered again from the statement's fields, once per target, with the
//! target replaced by its fully qualified name.

use std::fmt;

use crate::ast::{AccessPrivilege, DropBehavior, GrantStatement, RoleSpec};
use crate::catalog::FullItemName;
use crate::display::{self, AstDisplay, AstFormatter};
use crate::error::PlanError;

/// Renders the privilege list of a statement.
///
/// An empty list renders as `ALL`. The parser encodes `ALL` followed by a
/// column list as an entry without a name; that entry is only valid in the
/// first position.
pub fn render_privileges(privileges: &[AccessPrivilege]) -> Result<String, PlanError> {
    if privileges.is_empty() {
        return Ok("ALL".into());
    }
    for (i, privilege) in privileges.iter().enumerate() {
        match &privilege.name {
            None if i == 0 => {}
            Some(name) if !name.is_empty() => {}
            _ => return Err(PlanError::MalformedPrivilegeList),
        }
    }
    Ok(display::comma_separated(privileges).to_ast_string())
}

/// Renders the grantee list of a statement.
pub fn render_grantees(grantees: &[RoleSpec]) -> String {
    display::comma_separated(grantees).to_ast_string()
}

/// The parts of a `GRANT`/`REVOKE` that are the same for every target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantCommand {
    is_grant: bool,
    grant_option: bool,
    behavior: DropBehavior,
    privileges: String,
    grantees: String,
}

impl GrantCommand {
    pub fn new(stmt: &GrantStatement) -> Result<GrantCommand, PlanError> {
        Ok(GrantCommand {
            is_grant: stmt.is_grant,
            grant_option: stmt.grant_option,
            behavior: stmt.behavior,
            privileges: render_privileges(&stmt.privileges)?,
            grantees: render_grantees(&stmt.grantees),
        })
    }

    /// Renders the command for a single target.
    pub fn render(&self, target: &FullItemName) -> String {
        TargetedCommand {
            command: self,
            target,
        }
        .to_ast_string()
    }
}

struct TargetedCommand<'a> {
    command: &'a GrantCommand,
    target: &'a FullItemName,
}

impl AstDisplay for TargetedCommand<'_> {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        let GrantCommand {
            is_grant,
            grant_option,
            behavior,
            privileges,
            grantees,
        } = self.command;
        if *is_grant {
            f.write_str("GRANT ");
            f.write_str(privileges);
            f.write_str(" ON ");
            f.write_node(self.target);
            f.write_str(" TO ");
            f.write_str(grantees);
            if *grant_option {
                f.write_str(" WITH GRANT OPTION");
            }
        } else {
            f.write_str("REVOKE ");
            if *grant_option {
                f.write_str("GRANT OPTION FOR ");
            }
            f.write_str(privileges);
            f.write_str(" ON ");
            f.write_node(self.target);
            f.write_str(" FROM ");
            f.write_str(grantees);
            f.write_str(" ");
            f.write_node(behavior);
        }
    }
}

/// Renders `stmt` for a single target.
pub fn render_command(stmt: &GrantStatement, target: &FullItemName) -> Result<String, PlanError> {
    Ok(GrantCommand::new(stmt)?.render(target))
}
