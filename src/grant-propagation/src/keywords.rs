// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Keywords that cannot appear as bare identifiers.

use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Every keyword that PostgreSQL does not accept as an unquoted identifier in
/// all positions: the reserved, column-name and type/function-name keyword
/// categories.
static RESERVED_KEYWORDS: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    [
        // Reserved.
        "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both",
        "case", "cast", "check", "collate", "column", "constraint", "create",
        "current_catalog", "current_date", "current_role", "current_time", "current_timestamp",
        "current_user", "default", "deferrable", "desc", "distinct", "do", "else", "end",
        "except", "false", "fetch", "for", "foreign", "from", "grant", "group", "having", "in",
        "initially", "intersect", "into", "lateral", "leading", "limit", "localtime",
        "localtimestamp", "not", "null", "offset", "on", "only", "or", "order", "placing",
        "primary", "references", "returning", "select", "session_user", "some", "symmetric",
        "system_user", "table", "then", "to", "trailing", "true", "union", "unique", "user",
        "using", "variadic", "when", "where", "window", "with",
        // Column names.
        "between", "bigint", "bit", "boolean", "char", "character", "coalesce", "dec",
        "decimal", "exists", "extract", "float", "greatest", "grouping", "inout", "int",
        "integer", "interval", "json", "json_array", "json_arrayagg", "json_exists",
        "json_object", "json_objectagg", "json_query", "json_scalar", "json_serialize",
        "json_table", "json_value", "least", "merge_action", "national", "nchar", "none",
        "normalize", "nullif", "numeric", "out", "overlay", "position", "precision", "real",
        "row", "setof", "smallint", "substring", "time", "timestamp", "treat", "trim",
        "values", "varchar", "xmlattributes", "xmlconcat", "xmlelement", "xmlexists",
        "xmlforest", "xmlnamespaces", "xmlparse", "xmlpi", "xmlroot", "xmlserialize",
        "xmltable",
        // Type and function names.
        "authorization", "binary", "collation", "concurrently", "cross", "current_schema",
        "freeze", "full", "ilike", "inner", "is", "isnull", "join", "left", "like", "natural",
        "notnull", "outer", "overlaps", "right", "similar", "tablesample", "verbose",
    ]
    .into_iter()
    .collect()
});

/// Reports whether `word` must be quoted when used as an identifier.
///
/// `word` is compared case sensitively; identifiers containing uppercase
/// characters are quoted regardless.
pub fn is_reserved(word: &str) -> bool {
    RESERVED_KEYWORDS.contains(word)
}
