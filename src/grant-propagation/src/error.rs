// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::catalog::CatalogError;

/// Errors that abort planning of a `GRANT`/`REVOKE`.
///
/// Planning never mutates anything, so every error leaves the system as it
/// was and no partial job list is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The statement touches distributed objects but this node is not the
    /// coordinator.
    #[error("operation is not allowed on this node")]
    NotCoordinator,
    /// A name in the statement does not exist.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The privilege list does not have the shape the parser produces.
    #[error("cannot parse GRANT/REVOKE privileges")]
    MalformedPrivilegeList,
}

impl PlanError {
    /// Returns any applicable hints for [`PlanError`].
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotCoordinator => Some("Connect to the coordinator and run it again.".into()),
            Self::Catalog(_) | Self::MalformedPrivilegeList => None,
        }
    }

    /// Reports whether the error was caused by a name that does not resolve.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Catalog(CatalogError::UnknownItem(_) | CatalogError::UnknownSchema(_))
        )
    }
}
