// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Rendering of SQL text from structured statement fields.
//!
//! Commands sent to other nodes are never the text the user typed. They are
//! re-rendered from the structured statement through [`AstDisplay`] so that
//! identifiers are quoted consistently and names are fully qualified.

use std::fmt;

/// Describes the context in which to print an AST node.
pub trait AstDisplay {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>);

    fn to_ast_string(&self) -> String {
        let mut buf = String::new();
        let mut f = AstFormatter::new(&mut buf);
        self.fmt(&mut f);
        buf
    }
}

impl<T: AstDisplay> AstDisplay for &T {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        T::fmt(*self, f)
    }
}

/// A buffer that AST nodes are written into.
#[derive(Debug)]
pub struct AstFormatter<W> {
    buf: W,
}

impl<W: fmt::Write> AstFormatter<W> {
    pub fn new(buf: W) -> Self {
        AstFormatter { buf }
    }

    pub fn write_node<T: AstDisplay>(&mut self, s: &T) {
        s.fmt(self);
    }

    // Writing into a `String` cannot fail, so the error is not surfaced.
    pub fn write_str<T: fmt::Display>(&mut self, s: T) {
        write!(self.buf, "{}", s).expect("unexpected error in fmt::Display implementation");
    }
}

/// Writes `slice` with `sep` between each element.
#[derive(Debug)]
pub struct DisplaySeparated<'a, T> {
    slice: &'a [T],
    sep: &'static str,
}

impl<'a, T: AstDisplay> AstDisplay for DisplaySeparated<'a, T> {
    fn fmt<W: fmt::Write>(&self, f: &mut AstFormatter<W>) {
        let mut delim = "";
        for t in self.slice {
            f.write_str(delim);
            delim = self.sep;
            f.write_node(t);
        }
    }
}

pub fn separated<'a, T>(slice: &'a [T], sep: &'static str) -> DisplaySeparated<'a, T> {
    DisplaySeparated { slice, sep }
}

pub fn comma_separated<T>(slice: &[T]) -> DisplaySeparated<'_, T> {
    separated(slice, ", ")
}

/// Implements [`std::fmt::Display`] in terms of [`AstDisplay`].
macro_rules! impl_display {
    ($name:ident) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                use $crate::display::AstDisplay;
                f.write_str(&self.to_ast_string())
            }
        }
    };
}

pub(crate) use impl_display;
